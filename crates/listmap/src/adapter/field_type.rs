use crate::{FieldValue, Result, ValueType};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A property type with a native representation of its own, mapped by
/// [`DefaultAdapter`](super::DefaultAdapter).
///
/// Non-optional scalars read a null field as their default value. Text and
/// multi-choice values write an empty value as null, since the store does
/// not distinguish the two.
pub trait FieldType: Sized + Send + Sync + 'static {
    const VALUE_TYPE: ValueType;

    fn from_field(value: FieldValue) -> Result<Self>;

    fn to_field(&self) -> FieldValue;
}

macro_rules! impl_field_type {
    ( $( $ty:ty => $value_type:ident ),* $(,)? ) => {
        $(
            impl FieldType for $ty {
                const VALUE_TYPE: ValueType = ValueType::$value_type;

                fn from_field(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::Null => Ok(<$ty>::default()),
                        value => <$ty>::try_from(value),
                    }
                }

                fn to_field(&self) -> FieldValue {
                    FieldValue::from(self.clone())
                }
            }
        )*
    };
}

impl_field_type! {
    bool => Boolean,
    i32 => Integer,
    i64 => Integer,
    u32 => Integer,
    f64 => Number,
    Uuid => Guid,
    DateTime<Utc> => DateTime,
}

impl FieldType for String {
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn from_field(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(String::new()),
            value => String::try_from(value),
        }
    }

    fn to_field(&self) -> FieldValue {
        if self.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Text(self.clone())
        }
    }
}

impl FieldType for Vec<String> {
    const VALUE_TYPE: ValueType = ValueType::MultiChoice;

    fn from_field(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(vec![]),
            value => Vec::<String>::try_from(value),
        }
    }

    fn to_field(&self) -> FieldValue {
        if self.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::MultiChoice(self.clone())
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn from_field(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            value => T::from_field(value).map(Some),
        }
    }

    fn to_field(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field(),
            None => FieldValue::Null,
        }
    }
}
