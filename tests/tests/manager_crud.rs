use listmap::{
    repository::UpdateMethod, CollectionHandle, DataItem, FieldValue, LookupValue, Parameters,
};
use listmap_repository_memory::Operation;
use tests::{
    models::{Order, Status},
    ListmapTest,
};

use pretty_assertions::assert_eq;

fn orders() -> CollectionHandle {
    CollectionHandle::list("Order")
}

#[test]
fn missing_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    assert_eq!(manager.try_get(42).unwrap(), None);

    let err = manager.get(42).unwrap_err();
    assert!(err.is_record_not_found());
    assert!(err.caused_by_record_not_found());
    assert!(err.to_string().contains("id=42"));
}

#[test]
fn create_assigns_the_store_id() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 3);
    order.customer_id = 5;
    order.tags = vec!["red".to_string(), "blue".to_string()];

    assert!(manager.create(&mut order).unwrap());
    assert_eq!(order.id, 1);

    let raw = test.repo.raw_item(&orders(), 1).unwrap();
    assert_eq!(raw.get("Title"), Some(&FieldValue::from("Widget")));
    assert_eq!(raw.get("Status"), Some(&FieldValue::from("Open")));
    assert_eq!(raw.get("Qty"), Some(&FieldValue::Integer(3)));
    assert_eq!(raw.get("Customer"), Some(&FieldValue::Lookup(LookupValue::from_id(5))));

    let loaded = manager.get(1).unwrap();
    assert_eq!(loaded.title, "Widget");
    assert_eq!(loaded.status, Status::Open);
    assert_eq!(loaded.customer_id, 5);
    assert_eq!(loaded.tags, order.tags);
}

#[test]
fn lookup_id_and_text_read_one_field() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut item = DataItem::new();
    item.set("Title", "Widget");
    item.set("Customer", LookupValue::new(5, "Acme"));
    let id = test.repo.insert(&orders(), &item);

    let order = manager.get(id).unwrap();
    assert_eq!(order.customer_id, 5);
    assert_eq!(order.customer, "Acme");
}

#[test]
fn empty_lookup_reads_as_zero() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut item = DataItem::new();
    item.set("Title", "Widget");
    let id = test.repo.insert(&orders(), &item);

    let order = manager.get(id).unwrap();
    assert_eq!(order.customer_id, 0);
    assert_eq!(order.customer, "");
}

#[test]
fn enum_sentinels() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut shipped = DataItem::new();
    shipped.set("Status", "Shipped");
    let shipped = test.repo.insert(&orders(), &shipped);
    let blank = test.repo.insert(&orders(), &DataItem::new());
    let mut closed = DataItem::new();
    closed.set("Status", "closed");
    let closed = test.repo.insert(&orders(), &closed);

    assert_eq!(manager.get(shipped).unwrap().status, Status::Unknown);
    assert_eq!(manager.get(blank).unwrap().status, Status::None);
    assert_eq!(manager.get(closed).unwrap().status, Status::Closed);
}

#[test]
fn writing_the_invalid_sentinel_fails_before_the_store() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 1);
    order.status = Status::Unknown;

    assert!(manager.create(&mut order).is_err());
    assert!(test.repo.is_empty(&orders()));
    assert!(!test.repo.operations().iter().any(Operation::is_write));
    assert_eq!(order.title, "Widget");
}

#[test]
fn update_writes_changes_back() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 3);
    manager.create(&mut order).unwrap();

    let mut updatable = manager.get_updatable(order.id).unwrap();
    assert_eq!(updatable.id(), Some(order.id));
    updatable.title = "Gadget".to_string();
    updatable.status = Status::Closed;
    assert!(manager.update(&mut updatable).unwrap());

    let loaded = manager.get(order.id).unwrap();
    assert_eq!(loaded.title, "Gadget");
    assert_eq!(loaded.status, Status::Closed);
    assert_eq!(loaded.qty, 3);
    assert_eq!(test.repo.version(&orders(), order.id), Some(2));
}

#[test]
fn system_update_keeps_the_version() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .update_method(UpdateMethod::SystemUpdate)
        .build()
        .unwrap();

    let mut order = Order::new("Widget", 3);
    manager.create(&mut order).unwrap();

    let mut updatable = manager.get_updatable(order.id).unwrap();
    updatable.qty = 4;
    manager.update(&mut updatable).unwrap();
    assert_eq!(test.repo.version(&orders(), order.id), Some(1));

    // A call can still ask for a regular update
    updatable.qty = 5;
    manager
        .update_with(&mut updatable, Parameters::new().update_method(UpdateMethod::Update))
        .unwrap();
    assert_eq!(test.repo.version(&orders(), order.id), Some(2));
}

#[test]
fn clearing_a_field_removes_it() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 3);
    order.tags = vec!["red".to_string()];
    manager.create(&mut order).unwrap();

    let mut updatable = manager.get_updatable(order.id).unwrap();
    updatable.tags.clear();
    updatable.status = Status::None;
    manager.update(&mut updatable).unwrap();

    let raw = test.repo.raw_item(&orders(), order.id).unwrap();
    assert_eq!(raw.get("Tags"), None);
    assert_eq!(raw.get("Status"), None);
}

#[test]
fn update_by_id_keeps_dependent_fields() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut item = DataItem::new();
    item.set("Title", "Widget");
    item.set("Modified", "2024-05-01T10:00:00Z");
    let id = test.repo.insert(&orders(), &item);

    let mut order = Order::new("Gadget", 2);
    assert!(manager.update_by_id(id, &mut order).unwrap());
    assert_eq!(order.id, id);

    let raw = test.repo.raw_item(&orders(), id).unwrap();
    assert_eq!(raw.get("Title"), Some(&FieldValue::from("Gadget")));
    assert_eq!(raw.get("Modified"), Some(&FieldValue::from("2024-05-01T10:00:00Z")));
}

#[test]
fn update_by_id_of_a_missing_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Gadget", 2);
    let err = manager.update_by_id(7, &mut order).unwrap_err();
    assert!(err.is_record_not_found());
    assert_eq!(order.title, "Gadget");
}

#[test]
fn update_of_a_deleted_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 1);
    manager.create(&mut order).unwrap();
    let mut updatable = manager.get_updatable(order.id).unwrap();
    manager.delete(order.id).unwrap();

    let err = manager.update(&mut updatable).unwrap_err();
    assert!(err.is_record_not_found());
}

#[test]
fn delete_removes_the_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 1);
    manager.create(&mut order).unwrap();

    assert!(manager.delete(order.id).unwrap());
    assert_eq!(manager.try_get(order.id).unwrap(), None);

    let err = manager.delete(order.id).unwrap_err();
    assert!(err.is_record_not_found());
}

#[test]
fn excluded_fields_are_neither_read_nor_written() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut order = Order::new("Widget", 3);
    manager
        .create_with(&mut order, Parameters::new().exclude_field("Qty"))
        .unwrap();
    let raw = test.repo.raw_item(&orders(), order.id).unwrap();
    assert_eq!(raw.get("Qty"), None);
    assert_eq!(raw.get("Title"), Some(&FieldValue::from("Widget")));

    let mut item = DataItem::new();
    item.set("Title", "Gadget");
    item.set("Qty", 9);
    let id = test.repo.insert(&orders(), &item);
    let loaded = manager
        .get_with(id, Parameters::new().exclude_field("Qty"))
        .unwrap();
    assert_eq!(loaded.qty, 0);
    assert_eq!(loaded.title, "Gadget");
}

#[test]
fn get_all_reads_every_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    for (title, qty) in [("A", 1), ("B", 2), ("C", 3)] {
        manager.create(&mut Order::new(title, qty)).unwrap();
    }

    let titles: Vec<_> = manager
        .get_all()
        .unwrap()
        .into_iter()
        .map(|order| order.title)
        .collect();
    assert_eq!(titles, ["A", "B", "C"]);
}

#[test]
fn folder_collection_scopes_writes() {
    let test = ListmapTest::new();
    let root = test.manager::<Order>();
    let folder = test
        .builder::<Order>()
        .collection(CollectionHandle::folder("Order", "2024"))
        .build()
        .unwrap();

    let mut archive = Order::default();
    assert!(root.create_folder(&mut archive, "2024").unwrap());

    folder.create(&mut Order::new("Inside", 1)).unwrap();
    root.create(&mut Order::new("Outside", 1)).unwrap();

    let inside: Vec<_> = folder.get_all().unwrap().into_iter().map(|o| o.title).collect();
    assert_eq!(inside, ["Inside"]);
}
