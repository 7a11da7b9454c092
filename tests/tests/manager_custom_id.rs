use listmap::{CollectionHandle, DataItem};
use listmap_repository_memory::Operation;
use tests::{models::Product, ListmapTest};

use pretty_assertions::assert_eq;

fn products() -> CollectionHandle {
    CollectionHandle::list("Product")
}

fn seed(test: &ListmapTest, code: &str, name: &str) -> i32 {
    let mut item = DataItem::new();
    item.set("Code", code);
    item.set("Title", name);
    item.set("Price", 9.5);
    test.repo.insert(&products(), &item)
}

#[test]
fn lookup_by_custom_id() {
    let test = ListmapTest::new();
    let manager = test.manager::<Product>();
    seed(&test, "A-1", "Anvil");
    seed(&test, "B-2", "Bucket");

    let product = manager.get_by_custom_id("B-2".to_string()).unwrap();
    assert_eq!(product, Product::new("B-2", "Bucket", 9.5));

    assert_eq!(manager.try_get_by_custom_id("C-3".to_string()).unwrap(), None);
    assert!(manager
        .get_by_custom_id("C-3".to_string())
        .unwrap_err()
        .is_record_not_found());
}

#[test]
fn lookup_asks_the_store_for_two_rows() {
    let test = ListmapTest::new();
    let manager = test.manager::<Product>();
    seed(&test, "A-1", "Anvil");
    test.repo.clear_operations();

    manager.get_by_custom_id("A-1".to_string()).unwrap();
    assert_eq!(
        test.repo.operations(),
        [Operation::Find {
            list: "Product".to_string(),
            row_limit: Some(2),
            position: None,
        }]
    );
}

#[test]
fn duplicate_custom_id_is_too_many_records() {
    let test = ListmapTest::new();
    let manager = test.manager::<Product>();
    seed(&test, "A-1", "Anvil");
    seed(&test, "A-1", "Axe");

    let err = manager.try_get_by_custom_id("A-1".to_string()).unwrap_err();
    assert!(err.is_too_many_records());
}

#[test]
fn constant_of_the_wrong_type_is_rejected() {
    let test = ListmapTest::new();
    let manager = test.manager::<Product>();

    let err = manager.try_get_by_custom_id(17).unwrap_err();
    assert!(err.is_property_access());
}

#[test]
fn unindexed_custom_id_is_rejected() {
    let test = ListmapTest::new();
    test.repo.index_field("Product", "Title");
    let manager = test.manager::<Product>();

    let err = manager.try_get_by_custom_id("A-1".to_string()).unwrap_err();
    assert!(err.is_invalid_operation());
    assert!(err.to_string().contains("not indexed"));
    assert!(test.repo.operations().is_empty());
}

#[test]
fn create_rejects_a_taken_custom_id() {
    let test = ListmapTest::new();
    let manager = test.manager::<Product>();

    manager.create(&mut Product::new("A-1", "Anvil", 10.0)).unwrap();

    let err = manager
        .create(&mut Product::new("A-1", "Axe", 12.0))
        .unwrap_err();
    assert!(err.is_invalid_operation());
    assert!(err.to_string().contains("already exists"));
    assert_eq!(test.repo.len(&products()), 1);
}

#[test]
fn update_may_keep_its_own_custom_id() {
    let test = ListmapTest::new();
    let products_id = seed(&test, "A-1", "Anvil");
    seed(&test, "B-2", "Bucket");
    let manager = test.manager::<Product>();

    let mut updatable = manager.get_updatable(products_id).unwrap();
    updatable.price = 11.0;
    assert!(manager.update(&mut updatable).unwrap());

    updatable.code = "B-2".to_string();
    let err = manager.update(&mut updatable).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn builtin_identifier_has_no_custom_lookup() {
    let test = ListmapTest::new();
    let manager = test.manager::<tests::models::Order>();

    let err = manager.try_get_by_custom_id(1).unwrap_err();
    assert!(err.is_invalid_operation());
}
