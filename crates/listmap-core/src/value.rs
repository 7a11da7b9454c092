mod cmp;
mod convert;

mod lookup;
pub use lookup::LookupValue;

mod ty;
pub use ty::ValueType;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Native representation of a single field value held by the record store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    /// Field has no value
    #[default]
    Null,

    /// Yes/no value
    Bool(bool),

    /// Whole number, also used for counters such as the built-in id
    Integer(i64),

    /// Floating point number or currency
    Number(f64),

    /// Single or multi-line text and single choice values
    Text(String),

    /// Date and time, always stored in UTC
    DateTime(DateTime<Utc>),

    /// Globally unique identifier
    Guid(Uuid),

    /// Reference to an item in another list
    Lookup(LookupValue),

    /// References to several items in another list
    LookupMulti(Vec<LookupValue>),

    /// Reference to a principal
    User(LookupValue),

    /// References to several principals
    UserMulti(Vec<LookupValue>),

    /// Several choice values
    MultiChoice(Vec<String>),
}

impl FieldValue {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for null and for empty multi-valued values.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(v) => v.is_empty(),
            Self::LookupMulti(v) | Self::UserMulti(v) => v.is_empty(),
            Self::MultiChoice(v) => v.is_empty(),
            _ => false,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Self::LookupMulti(_) | Self::UserMulti(_) | Self::MultiChoice(_)
        )
    }

    /// The native type this value is compared as in a filter. `Null` has no
    /// native type.
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Number(_) => ValueType::Number,
            Self::Text(_) => ValueType::Text,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Guid(_) => ValueType::Guid,
            Self::Lookup(_) | Self::LookupMulti(_) => ValueType::Lookup,
            Self::User(_) | Self::UserMulti(_) => ValueType::User,
            Self::MultiChoice(_) => ValueType::MultiChoice,
        })
    }

    /// Human readable variant name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Number(_) => "Number",
            Self::Text(_) => "Text",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::Lookup(_) => "Lookup",
            Self::LookupMulti(_) => "LookupMulti",
            Self::User(_) => "User",
            Self::UserMulti(_) => "UserMulti",
            Self::MultiChoice(_) => "MultiChoice",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the composite pair of a single lookup or user value.
    pub fn as_lookup(&self) -> Option<&LookupValue> {
        match self {
            Self::Lookup(v) | Self::User(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the composite pairs of any lookup or user value, single or
    /// multiple.
    pub fn lookups(&self) -> Option<&[LookupValue]> {
        match self {
            Self::Lookup(v) | Self::User(v) => Some(core::slice::from_ref(v)),
            Self::LookupMulti(v) | Self::UserMulti(v) => Some(v),
            _ => None,
        }
    }

    /// Combines two partial values written to the same field.
    ///
    /// Lookup and user pairs fill in each other's missing text, so an id
    /// written by one property and a text written by another end up in one
    /// composite value. For every other combination `other` wins.
    pub fn merge(self, other: FieldValue) -> FieldValue {
        match (self, other) {
            (lhs, Self::Null) => lhs,
            (Self::Lookup(lhs), Self::Lookup(rhs)) => Self::Lookup(lhs.merge(rhs)),
            (Self::User(lhs), Self::User(rhs)) => Self::User(lhs.merge(rhs)),
            (_, rhs) => rhs,
        }
    }
}

impl core::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", if *v { 1 } else { 0 }),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%SZ")),
            Self::Guid(v) => write!(f, "{v}"),
            Self::Lookup(v) | Self::User(v) => write!(f, "{v}"),
            Self::LookupMulti(v) | Self::UserMulti(v) => {
                let mut s = "";
                for item in v {
                    write!(f, "{s}{item}")?;
                    s = ";#";
                }
                Ok(())
            }
            Self::MultiChoice(v) => write!(f, ";#{};#", v.join(";#")),
        }
    }
}
