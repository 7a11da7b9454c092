use super::{FieldValue, LookupValue};
use crate::{Error, Result};

use chrono::{DateTime, Utc};
use uuid::Uuid;

impl From<bool> for FieldValue {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<f64> for FieldValue {
    fn from(src: f64) -> Self {
        Self::Number(src)
    }
}

impl From<String> for FieldValue {
    fn from(src: String) -> Self {
        Self::Text(src)
    }
}

impl From<&str> for FieldValue {
    fn from(src: &str) -> Self {
        Self::Text(src.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(src: Uuid) -> Self {
        Self::Guid(src)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(src: DateTime<Utc>) -> Self {
        Self::DateTime(src)
    }
}

impl From<LookupValue> for FieldValue {
    fn from(src: LookupValue) -> Self {
        Self::Lookup(src)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(src: Vec<String>) -> Self {
        Self::MultiChoice(src)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    FieldValue: From<T>,
{
    fn from(src: Option<T>) -> Self {
        match src {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

macro_rules! impl_integer {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(src: $ty) -> Self {
                    Self::Integer(src as i64)
                }
            }

            impl TryFrom<FieldValue> for $ty {
                type Error = Error;

                fn try_from(value: FieldValue) -> Result<Self> {
                    let n = match value {
                        FieldValue::Integer(v) => v,
                        FieldValue::Number(v) if v.fract() == 0.0 => v as i64,
                        FieldValue::Text(ref v) => match v.trim().parse::<i64>() {
                            Ok(v) => v,
                            Err(_) => return Err(Error::type_conversion(value, stringify!($ty))),
                        },
                        // A lookup converts to the id it points at
                        FieldValue::Lookup(ref v) | FieldValue::User(ref v) => v.id as i64,
                        _ => return Err(Error::type_conversion(value, stringify!($ty))),
                    };
                    <$ty>::try_from(n)
                        .map_err(|_| Error::type_conversion(FieldValue::Integer(n), stringify!($ty)))
                }
            }
        )*
    };
}

impl_integer!(i32, i64, u32);

impl TryFrom<FieldValue> for bool {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bool(v) => Ok(v),
            FieldValue::Integer(v) => Ok(v != 0),
            FieldValue::Text(ref v) => match v.as_str() {
                "1" | "true" | "TRUE" | "True" => Ok(true),
                "0" | "false" | "FALSE" | "False" => Ok(false),
                _ => Err(Error::type_conversion(value, "bool")),
            },
            _ => Err(Error::type_conversion(value, "bool")),
        }
    }
}

impl TryFrom<FieldValue> for f64 {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Number(v) => Ok(v),
            FieldValue::Integer(v) => Ok(v as f64),
            FieldValue::Text(ref v) => v
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::type_conversion(value, "f64")),
            _ => Err(Error::type_conversion(value, "f64")),
        }
    }
}

impl TryFrom<FieldValue> for String {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Text(v) => Ok(v),
            FieldValue::Null
            | FieldValue::LookupMulti(_)
            | FieldValue::UserMulti(_)
            | FieldValue::MultiChoice(_) => Err(Error::type_conversion(value, "String")),
            FieldValue::Lookup(LookupValue { value: Some(v), .. })
            | FieldValue::User(LookupValue { value: Some(v), .. }) => Ok(v),
            FieldValue::Lookup(_) | FieldValue::User(_) => {
                Err(Error::type_conversion(value, "String"))
            }
            other => Ok(other.to_string()),
        }
    }
}

impl TryFrom<FieldValue> for Uuid {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Guid(v) => Ok(v),
            FieldValue::Text(ref v) => Ok(Uuid::parse_str(v.trim_matches(|c: char| c == '{' || c == '}'))?),
            _ => Err(Error::type_conversion(value, "Uuid")),
        }
    }
}

impl TryFrom<FieldValue> for DateTime<Utc> {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::DateTime(v) => Ok(v),
            FieldValue::Text(ref v) => match DateTime::parse_from_rfc3339(v) {
                Ok(v) => Ok(v.with_timezone(&Utc)),
                Err(_) => Err(Error::type_conversion(value, "DateTime")),
            },
            _ => Err(Error::type_conversion(value, "DateTime")),
        }
    }
}

impl TryFrom<FieldValue> for LookupValue {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Lookup(v) | FieldValue::User(v) => Ok(v),
            FieldValue::LookupMulti(mut v) | FieldValue::UserMulti(mut v) if v.len() == 1 => {
                Ok(v.remove(0))
            }
            _ => Err(Error::type_conversion(value, "LookupValue")),
        }
    }
}

impl TryFrom<FieldValue> for Vec<LookupValue> {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(vec![]),
            FieldValue::Lookup(v) | FieldValue::User(v) => Ok(vec![v]),
            FieldValue::LookupMulti(v) | FieldValue::UserMulti(v) => Ok(v),
            _ => Err(Error::type_conversion(value, "Vec<LookupValue>")),
        }
    }
}

impl TryFrom<FieldValue> for Vec<String> {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(vec![]),
            FieldValue::MultiChoice(v) => Ok(v),
            FieldValue::Text(v) => Ok(v
                .split(";#")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            _ => Err(Error::type_conversion(value, "Vec<String>")),
        }
    }
}
