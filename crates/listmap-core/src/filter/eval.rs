use super::{CompareOp, Comparison, FieldRef, Filter, Operand, ID_FIELD};
use crate::{DataItem, FieldValue, Result};

/// Evaluates `filter` against an item in memory, with the store's semantics.
///
/// A field missing from the item is treated as null. `Neq` and
/// `NotIncludes` match null fields, relational operators never do.
pub fn eval(filter: &Filter, item: &DataItem) -> Result<bool> {
    match filter {
        Filter::And(operands) => {
            for operand in operands {
                if !eval(operand, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Filter::Or(operands) => {
            for operand in operands {
                if eval(operand, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Filter::Local(inner) => eval(inner, item),
        Filter::Compare(cmp) => eval_comparison(cmp, item),
    }
}

fn eval_comparison(cmp: &Comparison, item: &DataItem) -> Result<bool> {
    let field = field_value(item, &cmp.field);

    let value = match &cmp.operand {
        Operand::None => {
            return match cmp.op {
                CompareOp::IsNull => Ok(field.is_empty()),
                CompareOp::IsNotNull => Ok(!field.is_empty()),
                op => Err(crate::err!("`{op}` comparison on `{}` has no value", cmp.field.name)),
            };
        }
        Operand::List(_, values) => {
            return match cmp.op {
                CompareOp::In => Ok(values.iter().any(|value| matches(&field, value))),
                op => Err(crate::err!("`{op}` comparison on `{}` takes a single value", cmp.field.name)),
            };
        }
        Operand::Value(value) => &value.value,
    };

    Ok(match cmp.op {
        CompareOp::Eq => matches(&field, value),
        CompareOp::Neq => !matches(&field, value),
        CompareOp::Gt => field.store_cmp(value).is_some_and(|o| o.is_gt()),
        CompareOp::Geq => field.store_cmp(value).is_some_and(|o| o.is_ge()),
        CompareOp::Lt => field.store_cmp(value).is_some_and(|o| o.is_lt()),
        CompareOp::Leq => field.store_cmp(value).is_some_and(|o| o.is_le()),
        CompareOp::Contains => text_pair(&field, value)
            .is_some_and(|(field, value)| field.contains(&value)),
        CompareOp::BeginsWith => text_pair(&field, value)
            .is_some_and(|(field, value)| field.starts_with(&value)),
        CompareOp::Includes => field.store_includes(value),
        CompareOp::NotIncludes => !field.store_includes(value),
        op @ (CompareOp::IsNull | CompareOp::IsNotNull | CompareOp::In) => {
            return Err(crate::err!(
                "`{op}` comparison on `{}` has an unexpected value",
                cmp.field.name
            ))
        }
    })
}

/// `Eq` against a multi-valued field with a single value matches when the
/// field holds the value.
fn matches(field: &FieldValue, value: &FieldValue) -> bool {
    if field.is_multi() && !value.is_multi() {
        field.store_includes(value)
    } else {
        field.store_eq(value)
    }
}

fn field_value(item: &DataItem, field: &FieldRef) -> FieldValue {
    let raw = match item.get(&field.name) {
        Some(value) => value.clone(),
        None if field.name == ID_FIELD => item.id.map(FieldValue::from).unwrap_or_default(),
        None => FieldValue::Null,
    };

    if !field.lookup_id {
        return raw;
    }

    match raw {
        FieldValue::Lookup(v) | FieldValue::User(v) => FieldValue::Integer(v.id as i64),
        other => other,
    }
}

fn text_pair(field: &FieldValue, value: &FieldValue) -> Option<(String, String)> {
    let field = match field {
        FieldValue::Text(v) => v.as_str(),
        FieldValue::Lookup(v) | FieldValue::User(v) => v.value.as_deref()?,
        _ => return None,
    };
    Some((field.to_lowercase(), value.as_str()?.to_lowercase()))
}
