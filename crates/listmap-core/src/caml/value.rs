use super::{Escape, Formatter, ToCaml};
use crate::{filter::TypedValue, FieldValue, ValueType};

impl ToCaml for &TypedValue {
    fn to_caml(self, f: &mut Formatter<'_>) {
        // The id flag lives on the field reference; a lookup-typed value
        // renders its id only when the value is a bare integer.
        value_element(f, self.ty, &self.value, false);
    }
}

pub(super) fn value_element(f: &mut Formatter<'_>, ty: ValueType, value: &FieldValue, lookup_id: bool) {
    let ty_name = ty.as_str();

    fmt!(f, "<Value Type='" ty_name "'");
    if matches!(value, FieldValue::DateTime(_)) {
        fmt!(f, " IncludeTimeValue='TRUE'");
    }
    fmt!(f, ">");

    match value {
        FieldValue::Null => f.fail(crate::err!("null cannot be used as a `{ty_name}` value")),
        FieldValue::Lookup(v) | FieldValue::User(v) => {
            match (&v.value, lookup_id) {
                (Some(text), false) => fmt!(f, Escape(text)),
                _ => fmt!(f, v.id.to_string().as_str()),
            }
        }
        FieldValue::LookupMulti(_) | FieldValue::UserMulti(_) | FieldValue::MultiChoice(_) => {
            f.fail(crate::err!(
                "a multi-valued constant cannot be rendered as a single `{ty_name}` value"
            ))
        }
        other => fmt!(f, Escape(&other.to_string())),
    }

    fmt!(f, "</Value>");
}
