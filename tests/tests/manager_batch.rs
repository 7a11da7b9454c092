use listmap::{BatchResult, CollectionHandle, Error};
use listmap_repository_memory::Operation;
use tests::{models::Order, ListmapTest};

use pretty_assertions::assert_eq;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn order_list() -> CollectionHandle {
    CollectionHandle::list("Order")
}

fn batch(titles: &[&str]) -> Vec<Order> {
    titles.iter().map(|title| Order::new(title, 1)).collect()
}

#[test]
fn batch_create_persists_every_item() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let mut orders = batch(&["A", "B", "C"]);
    let result = manager.batch_create(&mut orders).unwrap();

    assert_eq!(
        result,
        BatchResult {
            processed: 3,
            skipped: vec![],
            canceled_at: None,
        }
    );
    let ids: Vec<_> = orders.iter().map(|order| order.id).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn canceled_item_is_skipped() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_create(|cx| {
            if cx.entity().is_some_and(|order| order.title == "B") {
                cx.cancel_item_update();
            }
            Ok(())
        })
        .build()
        .unwrap();

    let mut orders = batch(&["A", "B", "C"]);
    let result = manager.batch_create(&mut orders).unwrap();

    assert_eq!(result.processed, 2);
    assert_eq!(result.skipped, [1]);
    assert!(!result.is_canceled());
    assert_eq!(orders[1].id, 0);
    assert_eq!(orders[2].id, 2);
    assert_eq!(test.repo.len(&order_list()), 2);
}

#[test]
fn canceled_operation_stops_the_batch() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_create(|cx| {
            if cx.entity().is_some_and(|order| order.title == "B") {
                cx.cancel_operation();
            }
            Ok(())
        })
        .build()
        .unwrap();

    let mut orders = batch(&["A", "B", "C"]);
    let result = manager.batch_create(&mut orders).unwrap();

    assert_eq!(result.processed, 1);
    assert_eq!(result.canceled_at, Some(1));
    assert!(result.is_canceled());
    assert_eq!(test.repo.len(&order_list()), 1);

    // Items before the cancellation stay persisted
    assert_eq!(orders[0].id, 1);
    assert_eq!(orders[2].id, 0);
}

#[test]
fn single_create_reports_a_canceled_hook() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_create(|cx| {
            cx.cancel_item_update();
            Ok(())
        })
        .build()
        .unwrap();

    let mut order = Order::new("A", 1);
    assert!(!manager.create(&mut order).unwrap());
    assert_eq!(order.title, "A");
    assert!(test.repo.is_empty(&order_list()));
}

#[test]
fn hook_changes_are_persisted() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_create(|cx| {
            if let Some(order) = cx.entity_mut() {
                order.title = order.title.to_uppercase();
            }
            Ok(())
        })
        .build()
        .unwrap();

    let mut order = Order::new("widget", 1);
    manager.create(&mut order).unwrap();

    assert_eq!(order.title, "WIDGET");
    assert_eq!(manager.get(order.id).unwrap().title, "WIDGET");
}

#[test]
fn hook_error_fails_the_batch_item() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_create(|cx| match cx.entity() {
            Some(order) if order.qty < 0 => Err(Error::invalid_operation("negative quantity")),
            _ => Ok(()),
        })
        .build()
        .unwrap();

    let mut orders = batch(&["A", "B"]);
    orders[1].qty = -1;
    let err = manager.batch_create(&mut orders).unwrap_err();

    assert_eq!(err.to_string(), "batch item 1: invalid operation: negative quantity");
    assert!(err.root().is_invalid_operation());
    assert_eq!(test.repo.len(&order_list()), 1);
}

#[test]
fn hooks_run_in_registration_order() {
    let test = ListmapTest::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let first = calls.clone();
    let second = calls.clone();

    let manager = test
        .builder::<Order>()
        .on_before_create(move |_| {
            assert_eq!(first.fetch_add(1, Ordering::SeqCst) % 2, 0);
            Ok(())
        })
        .on_before_create(move |_| {
            assert_eq!(second.fetch_add(1, Ordering::SeqCst) % 2, 1);
            Ok(())
        })
        .build()
        .unwrap();

    manager.batch_create(&mut batch(&["A", "B"])).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn batch_update_and_delete() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_delete(|cx| {
            if cx.data_item()?.id == Some(2) {
                cx.cancel_item_update();
            }
            Ok(())
        })
        .build()
        .unwrap();

    manager.batch_create(&mut batch(&["A", "B", "C"])).unwrap();

    let mut updatables: Vec<_> = (1..=3).map(|id| manager.get_updatable(id).unwrap()).collect();
    for updatable in &mut updatables {
        updatable.qty = 10;
    }
    let result = manager.batch_update(&mut updatables).unwrap();
    assert_eq!(result.processed, 3);
    assert!(manager.get_all().unwrap().iter().all(|order| order.qty == 10));

    test.repo.clear_operations();
    let result = manager.batch_delete(&[1, 2, 3]).unwrap();
    assert_eq!(result.processed, 2);
    assert_eq!(result.skipped, [1]);
    assert_eq!(
        test.repo.operations(),
        [
            Operation::Delete { list: "Order".to_string(), id: 1 },
            Operation::Delete { list: "Order".to_string(), id: 3 },
        ]
    );
}

#[test]
fn update_hook_can_skip_the_write() {
    let test = ListmapTest::new();
    let manager = test
        .builder::<Order>()
        .on_before_update(|cx| {
            cx.cancel_item_update();
            Ok(())
        })
        .build()
        .unwrap();

    let mut order = Order::new("A", 1);
    manager.create(&mut order).unwrap();

    let mut updatable = manager.get_updatable(order.id).unwrap();
    updatable.title = "B".to_string();
    assert!(!manager.update(&mut updatable).unwrap());
    assert_eq!(manager.get(order.id).unwrap().title, "A");
    assert_eq!(updatable.title, "B");
}
