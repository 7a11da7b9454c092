use serde::{Deserialize, Serialize};

/// Composite value of a lookup or user field: the id of the referenced item
/// and, when known, its display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupValue {
    pub id: i32,
    pub value: Option<String>,
}

impl LookupValue {
    pub fn new(id: i32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: Some(value.into()),
        }
    }

    pub fn from_id(id: i32) -> Self {
        Self { id, value: None }
    }

    /// Fills in the missing text from `other` when both refer to the same id.
    /// A pair with id `0` only carries text and takes the other's id.
    pub(super) fn merge(self, other: LookupValue) -> LookupValue {
        match (self.id, other.id) {
            (0, id) | (id, 0) => LookupValue {
                id,
                value: self.value.or(other.value),
            },
            (lhs, rhs) if lhs == rhs => LookupValue {
                id: lhs,
                value: other.value.or(self.value),
            },
            _ => other,
        }
    }
}

impl core::fmt::Display for LookupValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{};#{}", self.id, self.value.as_deref().unwrap_or(""))
    }
}
