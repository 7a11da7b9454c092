use super::{
    compare::{compare_field, include_item},
    default::text_method,
    Adapter, AdapterArgs, ComparisonArgs, EvalComparison, EvalMethodCall, MethodCallArgs,
};
use crate::{
    filter::{CompareOp, FieldRef},
    predicate::Method,
    Error, FieldRole, FieldValue, Filter, LookupValue, Result, ValueType,
};

/// Which family of composite fields an adapter reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupKind {
    /// A reference to an item of another list
    Lookup,

    /// A reference to a principal
    User,
}

impl LookupKind {
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Lookup => ValueType::Lookup,
            Self::User => ValueType::User,
        }
    }

    fn single(self, value: LookupValue) -> FieldValue {
        match self {
            Self::Lookup => FieldValue::Lookup(value),
            Self::User => FieldValue::User(value),
        }
    }

    fn multi(self, values: Vec<LookupValue>) -> FieldValue {
        match self {
            Self::Lookup => FieldValue::LookupMulti(values),
            Self::User => FieldValue::UserMulti(values),
        }
    }
}

fn read_pairs(value: FieldValue) -> Result<Vec<LookupValue>> {
    match value {
        FieldValue::Null => Ok(vec![]),
        FieldValue::Integer(id) => Ok(vec![LookupValue::from_id(lookup_id(id)?)]),
        value => Vec::<LookupValue>::try_from(value),
    }
}

fn lookup_id(id: i64) -> Result<i32> {
    i32::try_from(id).map_err(|_| Error::type_conversion(FieldValue::Integer(id), "lookup id"))
}

fn read_pair(value: FieldValue) -> Result<Option<LookupValue>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Integer(id) => Ok(Some(LookupValue::from_id(lookup_id(id)?))),
        value => LookupValue::try_from(value).map(Some),
    }
}

fn id_comparison(kind: LookupKind, field: &str, op: crate::predicate::BinaryOp, id: i32) -> Result<Filter> {
    compare_field(
        FieldRef::lookup_id(field),
        op,
        Some(kind.value_type()),
        FieldValue::Integer(id as i64),
    )
}

fn reject_relational(args: &ComparisonArgs<'_, impl std::fmt::Debug>) -> Result<()> {
    if args.op.is_relational() {
        return Err(Error::unsupported_predicate(format!(
            "`{}::{} {} {:?}` is not defined for a reference",
            args.args.entity, args.args.property, args.op, args.value
        )));
    }
    Ok(())
}

/// Exposes the id part of a lookup or user field. Id `0` stands for an
/// empty field.
#[derive(Debug)]
pub struct LookupIdAdapter {
    kind: LookupKind,
}

impl LookupIdAdapter {
    pub fn new(kind: LookupKind) -> Self {
        Self { kind }
    }
}

impl Adapter<i32> for LookupIdAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<i32> {
        Ok(read_pair(value)?.map(|pair| pair.id).unwrap_or(0))
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &i32) -> Result<FieldValue> {
        Ok(match *value {
            0 => FieldValue::Null,
            id => self.kind.single(LookupValue::from_id(id)),
        })
    }

    fn role(&self) -> FieldRole {
        FieldRole::LookupId
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<i32>> {
        Some(self)
    }
}

impl EvalComparison<i32> for LookupIdAdapter {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, i32>) -> Result<Filter> {
        if *args.value == 0 {
            return compare_field(FieldRef::new(args.args.field), args.op, None, FieldValue::Null);
        }
        id_comparison(self.kind, args.args.field, args.op, *args.value)
    }
}

/// Exposes the display text of a lookup or user field. The text is
/// resolved by the store, so it is never written.
#[derive(Debug)]
pub struct LookupTextAdapter {
    kind: LookupKind,
}

impl LookupTextAdapter {
    pub fn new(kind: LookupKind) -> Self {
        Self { kind }
    }
}

impl Adapter<String> for LookupTextAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<String> {
        match value {
            FieldValue::Text(text) => Ok(text),
            value => Ok(read_pair(value)?
                .and_then(|pair| pair.value)
                .unwrap_or_default()),
        }
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &String) -> Result<FieldValue> {
        Ok(if value.is_empty() {
            FieldValue::Null
        } else {
            self.kind.single(LookupValue {
                id: 0,
                value: Some(value.clone()),
            })
        })
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn role(&self) -> FieldRole {
        FieldRole::LookupValue
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<String>> {
        Some(self)
    }

    fn method_call(&self) -> Option<&dyn EvalMethodCall> {
        Some(self)
    }
}

impl EvalComparison<String> for LookupTextAdapter {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, String>) -> Result<Filter> {
        let value = match args.value.as_str() {
            "" => FieldValue::Null,
            text => FieldValue::Text(text.to_string()),
        };
        compare_field(FieldRef::new(args.args.field), args.op, Some(self.kind.value_type()), value)
    }
}

impl EvalMethodCall for LookupTextAdapter {
    fn eval_method_call(&self, args: &MethodCallArgs<'_>) -> Result<Filter> {
        let field = FieldRef::new(args.args.field);
        match args.method {
            Method::Contains => Ok(text_method(CompareOp::Contains, field, args.argument::<String>()?)),
            Method::StartsWith => Ok(text_method(CompareOp::BeginsWith, field, args.argument::<String>()?)),
            method => Err(Error::unsupported_predicate(format!(
                "`{}::{}.{method}()` is not supported for a reference text",
                args.args.entity, args.args.property
            ))),
        }
    }
}

/// Exposes a lookup or user field as its composite id and text pair.
/// Comparisons match by id.
#[derive(Debug)]
pub struct LookupPairAdapter {
    kind: LookupKind,
}

impl LookupPairAdapter {
    pub fn new(kind: LookupKind) -> Self {
        Self { kind }
    }
}

impl Adapter<Option<LookupValue>> for LookupPairAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<Option<LookupValue>> {
        read_pair(value)
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &Option<LookupValue>) -> Result<FieldValue> {
        Ok(match value {
            Some(pair) if pair.id != 0 || pair.value.is_some() => self.kind.single(pair.clone()),
            _ => FieldValue::Null,
        })
    }

    fn role(&self) -> FieldRole {
        FieldRole::LookupPair
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<Option<LookupValue>>> {
        Some(self)
    }
}

impl EvalComparison<Option<LookupValue>> for LookupPairAdapter {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, Option<LookupValue>>) -> Result<Filter> {
        reject_relational(args)?;
        match args.value {
            Some(pair) if pair.id != 0 => id_comparison(self.kind, args.args.field, args.op, pair.id),
            Some(pair) if pair.value.is_some() => Err(Error::unsupported_predicate(format!(
                "`{}::{}` is compared by id, but {pair:?} has none",
                args.args.entity, args.args.property
            ))),
            _ => compare_field(FieldRef::new(args.args.field), args.op, None, FieldValue::Null),
        }
    }
}

/// Exposes a multi-valued lookup or user field as its pairs.
#[derive(Debug)]
pub struct LookupMultiAdapter {
    kind: LookupKind,
}

impl LookupMultiAdapter {
    pub fn new(kind: LookupKind) -> Self {
        Self { kind }
    }
}

impl Adapter<Vec<LookupValue>> for LookupMultiAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<Vec<LookupValue>> {
        read_pairs(value)
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &Vec<LookupValue>) -> Result<FieldValue> {
        Ok(if value.is_empty() {
            FieldValue::Null
        } else {
            self.kind.multi(value.clone())
        })
    }

    fn role(&self) -> FieldRole {
        FieldRole::LookupPair
    }

    fn method_call(&self) -> Option<&dyn EvalMethodCall> {
        Some(self)
    }
}

impl EvalMethodCall for LookupMultiAdapter {
    fn eval_method_call(&self, args: &MethodCallArgs<'_>) -> Result<Filter> {
        let pair = match args.method {
            Method::Includes => args.argument::<LookupValue>()?,
            method => return Err(unsupported_multi_method(args, method)),
        };
        include_item(
            FieldRef::lookup_id(args.args.field),
            self.kind.value_type(),
            FieldValue::Integer(pair.id as i64),
        )
    }
}

/// Exposes the ids of a multi-valued lookup or user field.
#[derive(Debug)]
pub struct LookupMultiIdAdapter {
    kind: LookupKind,
}

impl LookupMultiIdAdapter {
    pub fn new(kind: LookupKind) -> Self {
        Self { kind }
    }
}

impl Adapter<Vec<i32>> for LookupMultiIdAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<Vec<i32>> {
        Ok(read_pairs(value)?.into_iter().map(|pair| pair.id).collect())
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &Vec<i32>) -> Result<FieldValue> {
        Ok(if value.is_empty() {
            FieldValue::Null
        } else {
            self.kind
                .multi(value.iter().copied().map(LookupValue::from_id).collect())
        })
    }

    fn role(&self) -> FieldRole {
        FieldRole::LookupId
    }

    fn method_call(&self) -> Option<&dyn EvalMethodCall> {
        Some(self)
    }
}

impl EvalMethodCall for LookupMultiIdAdapter {
    fn eval_method_call(&self, args: &MethodCallArgs<'_>) -> Result<Filter> {
        let id = match args.method {
            Method::Includes => *args.argument::<i32>()?,
            method => return Err(unsupported_multi_method(args, method)),
        };
        include_item(
            FieldRef::lookup_id(args.args.field),
            self.kind.value_type(),
            FieldValue::Integer(id as i64),
        )
    }
}

fn unsupported_multi_method(args: &MethodCallArgs<'_>, method: Method) -> Error {
    Error::unsupported_predicate(format!(
        "`{}::{}.{method}()` is not supported for a multi-valued reference",
        args.args.entity, args.args.property
    ))
}
