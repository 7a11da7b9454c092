use listmap::{
    filter::{CompareOp, Comparison, FieldRef, TypedValue},
    property, CollectionHandle, DataItem, Entity, EntityMapBuilder, FieldValue, Filter, LookupValue,
    Predicate, Property, QueryPlan, Result, ValueType,
};
use tests::ListmapTest;

use pretty_assertions::assert_eq;

/// A task referencing other items and principals through every part of
/// their composite fields.
#[derive(Debug, Default, Clone, PartialEq)]
struct Task {
    id: i32,
    title: String,
    project: Option<LookupValue>,
    labels: Vec<LookupValue>,
    related: Vec<i32>,
    owner_id: i32,
    owner: String,
    reviewer: Option<LookupValue>,
    watchers: Vec<LookupValue>,
    approvers: Vec<i32>,
}

impl Task {
    const TITLE: Property<Task, String> = property!(Task, title);
    const PROJECT: Property<Task, Option<LookupValue>> = property!(Task, project);
    const LABELS: Property<Task, Vec<LookupValue>> = property!(Task, labels);
    const RELATED: Property<Task, Vec<i32>> = property!(Task, related);
    const OWNER_ID: Property<Task, i32> = property!(Task, owner_id);
    const OWNER: Property<Task, String> = property!(Task, owner);
    const REVIEWER: Property<Task, Option<LookupValue>> = property!(Task, reviewer);
    const WATCHERS: Property<Task, Vec<LookupValue>> = property!(Task, watchers);
    const APPROVERS: Property<Task, Vec<i32>> = property!(Task, approvers);
}

impl Entity for Task {
    const NAME: &'static str = "Task";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.register_identifier(property!(Task, id))?;
        map.map_field(Self::TITLE, "Title")?;
        map.map_lookup(Self::PROJECT, "Project")?;
        map.map_lookups(Self::LABELS, "Labels")?;
        map.map_lookup_ids(Self::RELATED, "Related")?;
        map.map_user_id(Self::OWNER_ID, "Owner")?;
        map.map_user_name(Self::OWNER, "Owner")?;
        map.map_user(Self::REVIEWER, "Reviewer")?;
        map.map_users(Self::WATCHERS, "Watchers")?;
        map.map_user_ids(Self::APPROVERS, "Approvers")?;
        Ok(())
    }
}

fn plan(predicate: Predicate<Task>) -> QueryPlan {
    ListmapTest::new().manager::<Task>().translate(&predicate).unwrap()
}

fn includes(field: &str, ty: ValueType, id: i64) -> Filter {
    let value = TypedValue::new(ty, FieldValue::Integer(id));
    Comparison::new(CompareOp::Includes, FieldRef::lookup_id(field), value).into()
}

fn seed(test: &ListmapTest, title: &str, owner: i32, watchers: &[(i32, &str)]) -> i32 {
    let mut item = DataItem::new();
    item.set("Title", title);
    item.set("Owner", FieldValue::User(LookupValue::new(owner, format!("user {owner}"))));
    item.set("Reviewer", FieldValue::User(LookupValue::new(9, "Reviewer")));
    item.set(
        "Watchers",
        FieldValue::UserMulti(watchers.iter().map(|(id, name)| LookupValue::new(*id, *name)).collect()),
    );
    item.set(
        "Approvers",
        FieldValue::UserMulti(vec![LookupValue::new(owner, format!("user {owner}"))]),
    );
    item.set("Project", FieldValue::Lookup(LookupValue::new(7, "Alpha")));
    item.set(
        "Labels",
        FieldValue::LookupMulti(vec![LookupValue::new(3, "urgent"), LookupValue::new(4, "backend")]),
    );
    item.set("Related", FieldValue::LookupMulti(vec![LookupValue::new(11, "Other task")]));
    test.repo.insert(&CollectionHandle::list("Task"), &item)
}

#[test]
fn user_fields_read_every_part() {
    let test = ListmapTest::new();
    let id = seed(&test, "Deploy", 4, &[(5, "Bo"), (6, "Cy")]);

    let task = test.manager::<Task>().get(id).unwrap();
    assert_eq!(task.owner_id, 4);
    assert_eq!(task.owner, "user 4");
    assert_eq!(task.reviewer, Some(LookupValue::new(9, "Reviewer")));
    assert_eq!(task.watchers, [LookupValue::new(5, "Bo"), LookupValue::new(6, "Cy")]);
    assert_eq!(task.approvers, [4]);
    assert_eq!(task.project, Some(LookupValue::new(7, "Alpha")));
    assert_eq!(task.labels.len(), 2);
    assert_eq!(task.related, [11]);
}

#[test]
fn user_name_is_never_written() {
    let test = ListmapTest::new();
    let manager = test.manager::<Task>();

    let mut task = Task {
        title: "Review".to_string(),
        owner_id: 4,
        owner: "Somebody else".to_string(),
        approvers: vec![4, 5],
        ..Task::default()
    };
    manager.create(&mut task).unwrap();

    let raw = test.repo.raw_item(&CollectionHandle::list("Task"), task.id).unwrap();
    assert_eq!(raw.get("Owner"), Some(&FieldValue::User(LookupValue::from_id(4))));
    assert_eq!(
        raw.get("Approvers"),
        Some(&FieldValue::UserMulti(vec![LookupValue::from_id(4), LookupValue::from_id(5)]))
    );

    let map = test.registry.entity_map::<Task>().unwrap();
    let roles: Vec<_> = map
        .accessors("Owner")
        .iter()
        .map(|accessor| (accessor.property(), accessor.supports_update()))
        .collect();
    assert_eq!(roles, [("owner_id", true), ("owner", false)]);
}

#[test]
fn lookup_pair_compares_by_id() {
    let by_pair = plan(Task::PROJECT.eq(Some(LookupValue::new(7, "Alpha"))));
    let by_id = plan(Task::PROJECT.eq(Some(LookupValue::from_id(7))));

    let expected = Comparison::eq(
        FieldRef::lookup_id("Project"),
        TypedValue::new(ValueType::Lookup, FieldValue::Integer(7)),
    );
    assert_eq!(by_pair.native, Some(expected.into()));
    assert_eq!(by_pair.native, by_id.native);

    assert_eq!(
        plan(Task::REVIEWER.ne(Some(LookupValue::from_id(9)))).native,
        Some(
            Comparison::new(
                CompareOp::Neq,
                FieldRef::lookup_id("Reviewer"),
                TypedValue::new(ValueType::User, FieldValue::Integer(9))
            )
            .into()
        )
    );
    assert_eq!(
        plan(Task::PROJECT.eq(None)).native,
        Some(Comparison::is_null(FieldRef::new("Project")).into())
    );
}

#[test]
fn lookup_pair_without_id_is_rejected() {
    let manager = ListmapTest::new().manager::<Task>();

    let text_only = LookupValue {
        id: 0,
        value: Some("Alpha".to_string()),
    };
    let err = manager.translate(&Task::PROJECT.eq(Some(text_only))).unwrap_err();
    assert!(err.is_unsupported_predicate());

    let err = manager
        .translate(&Task::PROJECT.gt(Some(LookupValue::from_id(7))))
        .unwrap_err();
    assert!(err.is_unsupported_predicate());
}

#[test]
fn multi_lookup_includes_matches_by_id() {
    assert_eq!(
        plan(Task::LABELS.includes(LookupValue::new(3, "urgent"))).native,
        Some(includes("Labels", ValueType::Lookup, 3))
    );
    assert_eq!(
        plan(Task::RELATED.includes(11)).native,
        Some(includes("Related", ValueType::Lookup, 11))
    );
    assert_eq!(
        plan(Task::WATCHERS.includes(LookupValue::from_id(5))).native,
        Some(includes("Watchers", ValueType::User, 5))
    );
    assert_eq!(
        plan(Task::APPROVERS.includes(4)).native,
        Some(includes("Approvers", ValueType::User, 4))
    );
}

#[test]
fn user_queries_run_against_the_store() {
    let test = ListmapTest::new();
    seed(&test, "A", 4, &[(5, "Bo")]);
    seed(&test, "B", 5, &[(6, "Cy")]);
    let manager = test.manager::<Task>();

    let titles = |tasks: Vec<Task>| tasks.into_iter().map(|task| task.title).collect::<Vec<_>>();

    assert_eq!(titles(manager.query(Task::OWNER_ID.eq(5)).unwrap()), ["B"]);
    assert_eq!(
        titles(manager.query(Task::WATCHERS.includes(LookupValue::from_id(5))).unwrap()),
        ["A"]
    );
    assert_eq!(titles(manager.query(Task::APPROVERS.includes(4)).unwrap()), ["A"]);
    assert_eq!(titles(manager.query(Task::OWNER.eq("user 4")).unwrap()), ["A"]);
}

/// A shipment whose carrier comes from an external system.
#[derive(Debug, Default, Clone, PartialEq)]
struct Shipment {
    id: i32,
    carrier_key: Option<String>,
    carrier: Option<String>,
}

impl Entity for Shipment {
    const NAME: &'static str = "Shipment";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.register_identifier(property!(Shipment, id))?;
        map.map_external(property!(Shipment, carrier_key), property!(Shipment, carrier), "Carrier")
    }
}

#[test]
fn external_key_and_value_use_separate_fields() {
    let test = ListmapTest::new();
    let shipments = CollectionHandle::list("Shipment");

    let mut item = DataItem::new();
    item.set("Carrier_ID", "C-17");
    item.set("Carrier", "DHL");
    let full = test.repo.insert(&shipments, &item);

    let mut item = DataItem::new();
    item.set("Carrier_ID", "");
    let blank = test.repo.insert(&shipments, &item);

    let manager = test.manager::<Shipment>();
    let shipment = manager.get(full).unwrap();
    assert_eq!(shipment.carrier_key.as_deref(), Some("C-17"));
    assert_eq!(shipment.carrier.as_deref(), Some("DHL"));

    let shipment = manager.get(blank).unwrap();
    assert_eq!((shipment.carrier_key, shipment.carrier), (None, None));

    let mut shipment = Shipment {
        carrier_key: Some("C-18".to_string()),
        carrier: Some(String::new()),
        ..Shipment::default()
    };
    manager.create(&mut shipment).unwrap();

    let raw = test.repo.raw_item(&shipments, shipment.id).unwrap();
    assert_eq!(raw.get("Carrier_ID"), Some(&FieldValue::Text("C-18".to_string())));
    assert!(raw.get("Carrier").map_or(true, FieldValue::is_null));
}
