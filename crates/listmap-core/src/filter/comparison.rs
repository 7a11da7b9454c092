use super::CompareOp;
use crate::{FieldName, FieldValue, Result, ValueType};

/// A field referenced by a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub name: FieldName,

    /// Compare the id part of a lookup or user field instead of its text.
    pub lookup_id: bool,
}

impl FieldRef {
    pub fn new(name: impl Into<FieldName>) -> Self {
        Self {
            name: name.into(),
            lookup_id: false,
        }
    }

    pub fn lookup_id(name: impl Into<FieldName>) -> Self {
        Self {
            name: name.into(),
            lookup_id: true,
        }
    }
}

/// A constant together with the native type it is compared as.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: ValueType,
    pub value: FieldValue,
}

impl TypedValue {
    pub fn new(ty: ValueType, value: impl Into<FieldValue>) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }

    /// Types `value` by its own variant. Null has no type and is rejected;
    /// null comparisons are expressed with `IsNull` / `IsNotNull`.
    pub fn of(value: FieldValue) -> Result<Self> {
        match value.value_type() {
            Some(ty) => Ok(Self { ty, value }),
            None => Err(crate::err!(
                "a null constant cannot be compared; use IsNull or IsNotNull"
            )),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ValueType::Text, FieldValue::Text(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ValueType::Integer, FieldValue::Integer(value))
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `IsNull` and `IsNotNull` take no value
    None,
    Value(TypedValue),
    /// The values of an `In` comparison, all of type `ty`
    List(ValueType, Vec<FieldValue>),
}

/// A leaf of a native filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: CompareOp,
    pub field: FieldRef,
    pub operand: Operand,
}

impl Comparison {
    pub fn new(op: CompareOp, field: FieldRef, value: TypedValue) -> Self {
        debug_assert!(!op.is_unary() && op != CompareOp::In);
        Self {
            op,
            field,
            operand: Operand::Value(value),
        }
    }

    pub fn eq(field: FieldRef, value: TypedValue) -> Self {
        Self::new(CompareOp::Eq, field, value)
    }

    pub fn neq(field: FieldRef, value: TypedValue) -> Self {
        Self::new(CompareOp::Neq, field, value)
    }

    pub fn is_null(field: FieldRef) -> Self {
        Self {
            op: CompareOp::IsNull,
            field,
            operand: Operand::None,
        }
    }

    pub fn is_not_null(field: FieldRef) -> Self {
        Self {
            op: CompareOp::IsNotNull,
            field,
            operand: Operand::None,
        }
    }

    pub fn in_list(field: FieldRef, ty: ValueType, values: Vec<FieldValue>) -> Self {
        Self {
            op: CompareOp::In,
            field,
            operand: Operand::List(ty, values),
        }
    }

    pub fn value(&self) -> Option<&TypedValue> {
        match &self.operand {
            Operand::Value(value) => Some(value),
            _ => None,
        }
    }
}
