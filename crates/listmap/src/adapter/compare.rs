use crate::{
    filter::{CompareOp, Comparison, FieldRef, TypedValue},
    predicate::BinaryOp,
    Error, FieldValue, Filter, Result, ValueType,
};

/// Translates `field <op> value` using the store's native comparison.
///
/// `ty` overrides the native type the value is compared as; by default the
/// type follows the value's variant. A null or empty value becomes an
/// `IsNull` / `IsNotNull` check. A multi-valued value is matched by
/// membership of each of its items in the store and by exact set equality
/// in memory.
pub fn compare_field(
    field: FieldRef,
    op: BinaryOp,
    ty: Option<ValueType>,
    value: FieldValue,
) -> Result<Filter> {
    if value.is_null() || (value.is_multi() && value.is_empty()) {
        return match op {
            BinaryOp::Eq => Ok(Comparison::is_null(field).into()),
            BinaryOp::Ne => Ok(Comparison::is_not_null(field).into()),
            op => Err(Error::unsupported_predicate(format!(
                "`{}` {op} null cannot be evaluated",
                field.name
            ))),
        };
    }

    let Some(ty) = ty.or_else(|| value.value_type()) else {
        return Err(Error::unsupported_predicate(format!(
            "no native type for comparing `{}`",
            field.name
        )));
    };

    if value.is_multi() {
        return compare_multi(field, op, ty, value);
    }

    let op = match op {
        BinaryOp::Eq => CompareOp::Eq,
        BinaryOp::Ne => CompareOp::Neq,
        BinaryOp::Gt => CompareOp::Gt,
        BinaryOp::Ge => CompareOp::Geq,
        BinaryOp::Lt => CompareOp::Lt,
        BinaryOp::Le => CompareOp::Leq,
    };

    Ok(Comparison::new(op, field, TypedValue::new(ty, value)).into())
}

fn compare_multi(field: FieldRef, op: BinaryOp, ty: ValueType, value: FieldValue) -> Result<Filter> {
    let exact = Comparison::new(
        if op.is_eq() { CompareOp::Eq } else { CompareOp::Neq },
        FieldRef::new(field.name.clone()),
        TypedValue::new(ty, value.clone()),
    );

    match op {
        BinaryOp::Eq => {
            let mut operands = multi_items(&value)
                .into_iter()
                .map(|(item, by_id)| {
                    let field = if by_id {
                        FieldRef::lookup_id(field.name.clone())
                    } else {
                        FieldRef::new(field.name.clone())
                    };
                    Filter::from(Comparison::new(CompareOp::Includes, field, TypedValue::new(ty, item)))
                })
                .collect::<Vec<_>>();
            operands.push(Filter::local(exact));
            Ok(Filter::And(operands))
        }
        BinaryOp::Ne => Ok(Filter::local(exact)),
        op => Err(Error::unsupported_predicate(format!(
            "`{}` {op} is not defined for multi-valued fields",
            field.name
        ))),
    }
}

/// Items of a multi-valued value, each flagged when it is matched by id.
fn multi_items(value: &FieldValue) -> Vec<(FieldValue, bool)> {
    match value {
        FieldValue::LookupMulti(items) | FieldValue::UserMulti(items) => items
            .iter()
            .map(|item| (FieldValue::Integer(item.id as i64), true))
            .collect(),
        FieldValue::MultiChoice(items) => items
            .iter()
            .map(|item| (FieldValue::Text(item.clone()), false))
            .collect(),
        _ => vec![],
    }
}

/// Translates "the multi-valued `field` holds `item`".
pub fn include_item(field: FieldRef, ty: ValueType, item: FieldValue) -> Result<Filter> {
    if item.is_null() {
        return Err(Error::unsupported_predicate(format!(
            "`{}` cannot be tested for including null",
            field.name
        )));
    }
    Ok(Comparison::new(CompareOp::Includes, field, TypedValue::new(ty, item)).into())
}
