use listmap::{
    filter::{CompareOp, Comparison, FieldRef, TypedValue, ID_FIELD},
    FieldValue, Filter, Predicate, QueryPlan, ValueType,
};
use tests::{
    models::{Order, Status},
    ListmapTest,
};

use pretty_assertions::assert_eq;

fn plan(predicate: Predicate<Order>) -> QueryPlan {
    ListmapTest::new().manager::<Order>().translate(&predicate).unwrap()
}

#[test]
fn text_equality_is_one_leaf() {
    let plan = plan(Order::TITLE.eq("X"));

    assert_eq!(
        plan.native,
        Some(Comparison::eq(FieldRef::new("Title"), TypedValue::text("X")).into())
    );
    assert_eq!(plan.local, None);
    assert_eq!(plan.fields, ["Title"]);
}

#[test]
fn lookup_id_and_text_translate_by_their_own_adapter() {
    let by_id = plan(Order::CUSTOMER_ID.eq(5));
    let by_text = plan(Order::CUSTOMER.eq("Y"));

    assert_eq!(
        by_id.native,
        Some(
            Comparison::eq(
                FieldRef::lookup_id("Customer"),
                TypedValue::new(ValueType::Lookup, FieldValue::Integer(5))
            )
            .into()
        )
    );
    assert_eq!(
        by_text.native,
        Some(
            Comparison::eq(
                FieldRef::new("Customer"),
                TypedValue::new(ValueType::Lookup, "Y")
            )
            .into()
        )
    );
    assert_ne!(by_id.native, by_text.native);
}

#[test]
fn lookup_id_zero_means_empty() {
    assert_eq!(
        plan(Order::CUSTOMER_ID.eq(0)).native,
        Some(Comparison::is_null(FieldRef::new("Customer")).into())
    );
}

#[test]
fn empty_sentinel_compares_with_null() {
    assert_eq!(
        plan(Order::STATUS.eq(Status::None)).native,
        Some(Comparison::is_null(FieldRef::new("Status")).into())
    );
    assert_eq!(
        plan(Order::STATUS.eq(Status::Open)).native,
        Some(Comparison::eq(FieldRef::new("Status"), TypedValue::new(ValueType::Choice, "Open")).into())
    );
}

#[test]
fn invalid_sentinel_matches_unknown_values() {
    let native = plan(Order::STATUS.eq(Status::Unknown)).native.unwrap();
    let Filter::And(operands) = native else {
        panic!("expected an And group");
    };

    assert_eq!(operands[0], Comparison::is_not_null(FieldRef::new("Status")).into());
    assert_eq!(operands.len(), 3);
}

#[test]
fn ordering_choice_values_is_unsupported() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let err = manager.translate(&Order::STATUS.gt(Status::Open)).unwrap_err();
    assert!(err.is_unsupported_predicate());
}

#[test]
fn combinators_nest_like_the_predicate() {
    let plan = plan(Order::TITLE.eq("X").and(Order::QTY.gt(2).or(Order::QTY.is_null())));

    assert_eq!(
        plan.native,
        Some(Filter::And(vec![
            Comparison::eq(FieldRef::new("Title"), TypedValue::text("X")).into(),
            Filter::Or(vec![
                Comparison::new(CompareOp::Gt, FieldRef::new("Qty"), TypedValue::integer(2)).into(),
                Comparison::is_null(FieldRef::new("Qty")).into(),
            ]),
        ]))
    );
    assert_eq!(plan.fields, ["Title", "Qty"]);
}

#[test]
fn negated_relational_keeps_empty_fields() {
    assert_eq!(
        plan(!Order::QTY.gt(2)).native,
        Some(Filter::Or(vec![
            Comparison::new(CompareOp::Leq, FieldRef::new("Qty"), TypedValue::integer(2)).into(),
            Comparison::is_null(FieldRef::new("Qty")).into(),
        ]))
    );
}

#[test]
fn always_and_never() {
    assert_eq!(plan(Predicate::always()), QueryPlan::default());
    assert_eq!(
        plan(Predicate::never()).native,
        Some(Comparison::is_null(FieldRef::new(ID_FIELD)).into())
    );
    assert_eq!(
        plan(Predicate::all(vec![])),
        QueryPlan::default()
    );
}

#[test]
fn builtin_id_compares_as_counter() {
    assert_eq!(
        plan(Order::ID.ge(10)).native,
        Some(
            Comparison::new(
                CompareOp::Geq,
                FieldRef::new(ID_FIELD),
                TypedValue::new(ValueType::Counter, FieldValue::Integer(10))
            )
            .into()
        )
    );
}

#[test]
fn multi_valued_equality_is_checked_locally() {
    let plan = plan(Order::TAGS.eq(vec!["red".to_string()]));

    let local = Comparison::eq(
        FieldRef::new("Tags"),
        TypedValue::new(ValueType::MultiChoice, FieldValue::MultiChoice(vec!["red".to_string()])),
    );
    assert_eq!(
        plan.native,
        Some(Comparison::new(CompareOp::Includes, FieldRef::new("Tags"), TypedValue::new(ValueType::MultiChoice, "red")).into())
    );
    assert_eq!(
        plan.local,
        Some(Filter::And(vec![
            Comparison::new(CompareOp::Includes, FieldRef::new("Tags"), TypedValue::new(ValueType::MultiChoice, "red")).into(),
            local.into(),
        ]))
    );
}

#[test]
fn negated_text_method_is_unsupported() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let err = manager.translate(&!Order::TITLE.contains("x")).unwrap_err();
    assert!(err.is_unsupported_predicate());
}

#[test]
fn failed_translation_never_reaches_the_store() {
    let test = ListmapTest::new();
    let manager = test.manager::<Order>();

    let err = manager.query(!Order::TITLE.starts_with("x")).unwrap_err();
    assert!(err.is_unsupported_predicate());
    assert!(test.repo.operations().is_empty());
}
