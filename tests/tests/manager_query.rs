use listmap::{
    adapter::EnumMapping,
    filter::{Comparison, FieldRef, TypedValue},
    property, CollectionHandle, DataItem, Entity, EntityMapBuilder, Filter, PageRequest, Parameters,
    Predicate, Property, Result,
};
use listmap_repository_memory::Operation;
use tests::{
    models::{Order, Status},
    ListmapTest,
};

use pretty_assertions::assert_eq;

/// Creates one order per `(title, qty, tags)` and returns their ids.
fn seed(test: &ListmapTest, rows: &[(&str, i32, &[&str])]) -> Vec<i32> {
    let manager = test.manager::<Order>();
    rows.iter()
        .map(|(title, qty, tags)| {
            let mut order = Order::new(title, *qty);
            order.tags = tags.iter().map(|tag| tag.to_string()).collect();
            manager.create(&mut order).unwrap();
            order.id
        })
        .collect()
}

fn titles(orders: &[Order]) -> Vec<&str> {
    orders.iter().map(|order| order.title.as_str()).collect()
}

#[test]
fn query_filters_in_the_store() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &[]), ("B", 5, &[]), ("C", 9, &[])]);
    let manager = test.manager::<Order>();

    let orders = manager.query(Order::QTY.gt(2)).unwrap();
    assert_eq!(titles(&orders), ["B", "C"]);

    let orders = manager.query(!Order::QTY.ge(5).and(Order::TITLE.ne("A"))).unwrap();
    assert_eq!(titles(&orders), ["A"]);
}

#[test]
fn negation_keeps_items_with_empty_fields() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &[]), ("B", 5, &[])]);
    let mut blank = DataItem::new();
    blank.set("Title", "C");
    test.repo.insert(&CollectionHandle::list("Order"), &blank);
    let manager = test.manager::<Order>();

    let orders = manager.query(!Order::QTY.gt(2)).unwrap();
    assert_eq!(titles(&orders), ["A", "C"]);

    // A relational comparison never matches an empty field
    let orders = manager.query(Order::QTY.le(2)).unwrap();
    assert_eq!(titles(&orders), ["A"]);
}

#[test]
fn text_methods() {
    let test = ListmapTest::new();
    seed(&test, &[("Red widget", 1, &[]), ("Blue gadget", 1, &[]), ("Widget stand", 1, &[])]);
    let manager = test.manager::<Order>();

    assert_eq!(
        titles(&manager.query(Order::TITLE.contains("widget")).unwrap()),
        ["Red widget", "Widget stand"]
    );
    assert_eq!(
        titles(&manager.query(Order::TITLE.starts_with("blue")).unwrap()),
        ["Blue gadget"]
    );
}

#[test]
fn multi_valued_equality_is_exact() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &["red"]), ("B", 1, &["red", "blue"]), ("C", 1, &["blue"])]);
    let manager = test.manager::<Order>();

    let orders = manager.query(Order::TAGS.eq(vec!["red".to_string()])).unwrap();
    assert_eq!(titles(&orders), ["A"]);

    let orders = manager.query(Order::TAGS.includes("red")).unwrap();
    assert_eq!(titles(&orders), ["A", "B"]);
}

#[test]
fn local_filter_is_never_sent_to_the_store() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &["red"]), ("B", 1, &["red", "blue"])]);
    let manager = test.manager::<Order>();

    // Fails in the store, passes when run through the manager
    let orders = manager
        .query(Order::TAGS.ne(vec!["red".to_string()]).or(Order::TITLE.eq("A")))
        .unwrap();
    assert_eq!(titles(&orders), ["A", "B"]);
}

#[test]
fn find_takes_a_native_filter() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &[]), ("B", 2, &[])]);
    let manager = test.manager::<Order>();

    let filter = Filter::from(Comparison::eq(FieldRef::new("Title"), TypedValue::text("B")));
    assert_eq!(titles(&manager.find(Some(filter.clone())).unwrap()), ["B"]);
    assert_eq!(titles(&manager.find(Some(Filter::local(filter))).unwrap()), ["B"]);
    assert_eq!(titles(&manager.find(None).unwrap()), ["A", "B"]);
}

#[test]
fn enum_sentinel_queries() {
    let test = ListmapTest::new();
    let orders = CollectionHandle::list("Order");
    for status in [Some("Open"), Some("Shipped"), None, Some("Closed")] {
        let mut item = DataItem::new();
        item.set("Title", status.unwrap_or("blank"));
        if let Some(status) = status {
            item.set("Status", status);
        }
        test.repo.insert(&orders, &item);
    }
    let manager = test.manager::<Order>();

    assert_eq!(
        titles(&manager.query(Order::STATUS.eq(Status::Unknown)).unwrap()),
        ["Shipped"]
    );
    assert_eq!(
        titles(&manager.query(Order::STATUS.eq(Status::None)).unwrap()),
        ["blank"]
    );
    assert_eq!(
        titles(&manager.query(Order::STATUS.ne(Status::Unknown)).unwrap()),
        ["Open", "blank", "Closed"]
    );
}

/// An enum mapping with an `invalid` sentinel but no `empty` one, so empty
/// fields read as the `invalid` variant too.
#[derive(Debug, Default)]
struct Ticket {
    id: i32,
    title: String,
    status: Status,
}

impl Ticket {
    const TITLE: Property<Ticket, String> = property!(Ticket, title);
    const STATUS: Property<Ticket, Status> = property!(Ticket, status);
}

impl Entity for Ticket {
    const NAME: &'static str = "Ticket";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.register_identifier(property!(Ticket, id))?;
        map.map_field(Self::TITLE, "Title")?;
        map.map_enum(Self::STATUS, "Status", EnumMapping::text().invalid(Status::Unknown))
    }
}

#[test]
fn invalid_sentinel_queries_match_what_reads_return() {
    let test = ListmapTest::new();
    let tickets = CollectionHandle::list("Ticket");
    for (title, status) in [("blank", None), ("shipped", Some("Shipped")), ("open", Some("Open"))] {
        let mut item = DataItem::new();
        item.set("Title", title);
        if let Some(status) = status {
            item.set("Status", status);
        }
        test.repo.insert(&tickets, &item);
    }
    let manager = test.manager::<Ticket>();

    let unknown: Vec<_> = manager
        .get_all()
        .unwrap()
        .into_iter()
        .filter(|ticket| ticket.status == Status::Unknown)
        .map(|ticket| ticket.title)
        .collect();
    assert_eq!(unknown, ["blank", "shipped"]);

    let queried = manager.query(Ticket::STATUS.eq(Status::Unknown)).unwrap();
    assert_eq!(queried.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["blank", "shipped"]);

    let queried = manager.query(Ticket::STATUS.ne(Status::Unknown)).unwrap();
    assert_eq!(queried.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["open"]);

    let queried = manager.query(!Ticket::STATUS.eq(Status::Unknown)).unwrap();
    assert_eq!(queried.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["open"]);
}

#[test]
fn paging_walks_every_item_once() {
    let test = ListmapTest::new();
    let rows: Vec<(String, i32)> = (1..=5).map(|n| (format!("Order {n}"), n)).collect();
    let rows: Vec<(&str, i32, &[&str])> = rows
        .iter()
        .map(|(title, qty)| (title.as_str(), *qty, &[][..]))
        .collect();
    let ids = seed(&test, &rows);
    let manager = test.manager::<Order>();

    let first = manager.page(Predicate::always(), PageRequest::first(2)).unwrap();
    assert_eq!(titles(&first), ["Order 1", "Order 2"]);
    assert_eq!(first.next, Some(PageRequest::first(2).after(ids[1])));

    let second = manager.page(Predicate::always(), first.next.unwrap()).unwrap();
    assert_eq!(titles(&second), ["Order 3", "Order 4"]);

    let third = manager.page(Predicate::always(), second.next.unwrap()).unwrap();
    assert_eq!(titles(&third), ["Order 5"]);
    assert!(!third.has_next());
}

#[test]
fn paging_refills_pages_thinned_by_a_local_filter() {
    let test = ListmapTest::new();
    seed(
        &test,
        &[
            ("A", 1, &["red"]),
            ("B", 1, &["red", "blue"]),
            ("C", 1, &["red"]),
            ("D", 1, &["red", "green"]),
            ("E", 1, &["red"]),
        ],
    );
    let manager = test.manager::<Order>();
    test.repo.clear_operations();

    let page = manager
        .page(Order::TAGS.eq(vec!["red".to_string()]), PageRequest::first(2))
        .unwrap();
    assert_eq!(titles(&page), ["A", "C"]);

    // Two chunks of two were needed to fill the page
    let finds = test
        .repo
        .operations()
        .into_iter()
        .filter(|op| matches!(op, Operation::Find { .. }))
        .count();
    assert_eq!(finds, 2);

    let rest = manager
        .page(Order::TAGS.eq(vec!["red".to_string()]), page.next.unwrap())
        .unwrap();
    assert_eq!(titles(&rest), ["E"]);
    assert_eq!(rest.next, None);
}

#[test]
fn query_with_a_page_parameter() {
    let test = ListmapTest::new();
    seed(&test, &[("A", 1, &[]), ("B", 1, &[]), ("C", 1, &[])]);
    let manager = test.manager::<Order>();

    let orders = manager
        .query_with(Predicate::always(), Parameters::new().page(PageRequest::first(2)))
        .unwrap();
    assert_eq!(titles(&orders), ["A", "B"]);
}

#[test]
fn zero_page_size_is_rejected() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let err = manager.page(Predicate::always(), PageRequest::first(0)).unwrap_err();
    assert!(err.is_invalid_operation());
}
