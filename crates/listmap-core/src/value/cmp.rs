use super::FieldValue;

use std::cmp::Ordering;

impl FieldValue {
    /// Orders two values the way the record store compares them in a filter.
    ///
    /// Text compares case-insensitively, integers and numbers compare with
    /// each other, and lookups compare by their text. Returns `None` when
    /// the values are not comparable, including when either is null.
    pub fn store_cmp(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;

        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(lhs), Bool(rhs)) => Some(lhs.cmp(rhs)),
            (Integer(lhs), Integer(rhs)) => Some(lhs.cmp(rhs)),
            (Integer(lhs), Number(rhs)) => (*lhs as f64).partial_cmp(rhs),
            (Number(lhs), Integer(rhs)) => lhs.partial_cmp(&(*rhs as f64)),
            (Number(lhs), Number(rhs)) => lhs.partial_cmp(rhs),
            (Text(lhs), Text(rhs)) => Some(cmp_text(lhs, rhs)),
            (DateTime(lhs), DateTime(rhs)) => Some(lhs.cmp(rhs)),
            (Guid(lhs), Guid(rhs)) => Some(lhs.cmp(rhs)),
            (Lookup(lhs), Text(rhs)) | (User(lhs), Text(rhs)) => {
                Some(cmp_text(lhs.value.as_deref().unwrap_or(""), rhs))
            }
            (Lookup(lhs), Lookup(rhs)) | (User(lhs), User(rhs)) => Some(lhs.id.cmp(&rhs.id)),
            _ => None,
        }
    }

    /// Equality as the record store evaluates `Eq`.
    ///
    /// Multi-valued values are equal when they hold the same set of items.
    pub fn store_eq(&self, other: &FieldValue) -> bool {
        use FieldValue::*;

        match (self, other) {
            (LookupMulti(lhs), LookupMulti(rhs)) | (UserMulti(lhs), UserMulti(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs.iter().all(|l| rhs.iter().any(|r| r.id == l.id))
            }
            (MultiChoice(lhs), MultiChoice(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs
                        .iter()
                        .all(|l| rhs.iter().any(|r| cmp_text(l, r).is_eq()))
            }
            (Bool(lhs), Integer(rhs)) | (Integer(rhs), Bool(lhs)) => (*rhs != 0) == *lhs,
            _ => self.store_cmp(other).is_some_and(Ordering::is_eq),
        }
    }

    /// Returns `true` when this multi-valued (or single lookup) value holds
    /// `item`.
    pub fn store_includes(&self, item: &FieldValue) -> bool {
        use FieldValue::*;

        match (self, item) {
            (MultiChoice(values), Text(item)) => {
                values.iter().any(|v| cmp_text(v, item).is_eq())
            }
            (MultiChoice(values), MultiChoice(items)) => items
                .iter()
                .all(|item| values.iter().any(|v| cmp_text(v, item).is_eq())),
            (value, item) => match value.lookups() {
                Some(lookups) => lookups.iter().any(|lookup| match item {
                    Integer(id) => lookup.id as i64 == *id,
                    Lookup(other) | User(other) => lookup.id == other.id,
                    Text(text) => lookup
                        .value
                        .as_deref()
                        .is_some_and(|v| cmp_text(v, text).is_eq()),
                    _ => false,
                }),
                None => false,
            },
        }
    }
}

fn cmp_text(lhs: &str, rhs: &str) -> Ordering {
    lhs.chars()
        .flat_map(char::to_lowercase)
        .cmp(rhs.chars().flat_map(char::to_lowercase))
}
