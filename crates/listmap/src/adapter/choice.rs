use super::{
    compare::compare_field, Adapter, AdapterArgs, ComparisonArgs, EvalComparison,
};
use crate::{
    err,
    filter::{Comparison, FieldRef, TypedValue, ID_FIELD},
    predicate::BinaryOp,
    Error, FieldRole, FieldValue, Filter, LookupValue, Result, ValueType,
};

use std::fmt::Debug;

/// A Rust enum mapped to native choice values.
///
/// `CHOICES` lists every variant with its display text.
pub trait Choice: Copy + Eq + Debug + Send + Sync + 'static {
    const CHOICES: &'static [(Self, &'static str)];
}

/// How an enum is represented in the store.
#[derive(Debug, Clone)]
pub enum EnumStrategy<E> {
    /// The choice text is the variant's display text.
    Text,

    /// The choice text comes from a table.
    Table(Vec<(E, String)>),

    /// A lookup field whose display text is the variant's display text.
    /// The store resolves the text, so the property is read-only.
    LookupValue,

    /// A lookup field whose id is taken from a table.
    LookupId(Vec<(E, i32)>),
}

/// Strategy plus sentinels of an enum mapping.
#[derive(Debug, Clone)]
pub struct EnumMapping<E> {
    strategy: EnumStrategy<E>,

    /// Variant standing for an empty field
    empty: Option<E>,

    /// Variant standing for a native value with no matching variant
    invalid: Option<E>,
}

impl<E: Choice> EnumMapping<E> {
    pub fn text() -> Self {
        Self::new(EnumStrategy::Text)
    }

    pub fn table(entries: impl IntoIterator<Item = (E, impl Into<String>)>) -> Self {
        Self::new(EnumStrategy::Table(
            entries
                .into_iter()
                .map(|(variant, text)| (variant, text.into()))
                .collect(),
        ))
    }

    pub fn lookup_value() -> Self {
        Self::new(EnumStrategy::LookupValue)
    }

    pub fn lookup_id(entries: impl IntoIterator<Item = (E, i32)>) -> Self {
        Self::new(EnumStrategy::LookupId(entries.into_iter().collect()))
    }

    pub fn new(strategy: EnumStrategy<E>) -> Self {
        Self {
            strategy,
            empty: None,
            invalid: None,
        }
    }

    pub fn empty(mut self, variant: E) -> Self {
        self.empty = Some(variant);
        self
    }

    pub fn invalid(mut self, variant: E) -> Self {
        self.invalid = Some(variant);
        self
    }

    pub fn strategy(&self) -> &EnumStrategy<E> {
        &self.strategy
    }
}

/// Native key of one variant.
#[derive(Debug, Clone, PartialEq)]
enum Key {
    Text(String),
    Id(i32),
}

/// Maps an enum property under one [`EnumStrategy`].
///
/// Reading a value with no matching variant yields the `invalid` sentinel
/// when one is configured; reading an empty field yields the `empty`
/// sentinel. Without the sentinel either case is a conversion error.
#[derive(Debug)]
pub struct EnumAdapter<E> {
    mapping: EnumMapping<E>,

    /// Every mapped variant except the sentinels, with its native key
    known: Vec<(E, Key)>,
}

impl<E: Choice> EnumAdapter<E> {
    pub fn new(mapping: EnumMapping<E>) -> Self {
        let entries: Vec<(E, Key)> = match &mapping.strategy {
            EnumStrategy::Text | EnumStrategy::LookupValue => E::CHOICES
                .iter()
                .map(|(variant, text)| (*variant, Key::Text(text.to_string())))
                .collect(),
            EnumStrategy::Table(entries) => entries
                .iter()
                .map(|(variant, text)| (*variant, Key::Text(text.clone())))
                .collect(),
            EnumStrategy::LookupId(entries) => entries
                .iter()
                .map(|(variant, id)| (*variant, Key::Id(*id)))
                .collect(),
        };

        let known = entries
            .into_iter()
            .filter(|(variant, _)| Some(*variant) != mapping.empty && Some(*variant) != mapping.invalid)
            .collect();

        Self { mapping, known }
    }

    fn by_id(&self) -> bool {
        matches!(self.mapping.strategy, EnumStrategy::LookupId(_))
    }

    fn key_of(&self, variant: E) -> Option<&Key> {
        self.known
            .iter()
            .find(|(v, _)| *v == variant)
            .map(|(_, key)| key)
    }

    fn variant_of(&self, key: &Key) -> Option<E> {
        let exact = self.known.iter().find(|(_, k)| k == key);
        let loose = || {
            self.known.iter().find(|(_, k)| match (k, key) {
                (Key::Text(lhs), Key::Text(rhs)) => lhs.eq_ignore_ascii_case(rhs),
                _ => false,
            })
        };
        exact.or_else(loose).map(|(variant, _)| *variant)
    }

    fn read_key(&self, value: FieldValue) -> Result<Option<Key>> {
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(match (&self.mapping.strategy, value) {
            (EnumStrategy::Text | EnumStrategy::Table(_), FieldValue::Text(text)) => Key::Text(text),
            (EnumStrategy::LookupValue, FieldValue::Lookup(pair) | FieldValue::User(pair)) => {
                match pair.value {
                    Some(text) => Key::Text(text),
                    None => return Ok(None),
                }
            }
            (EnumStrategy::LookupValue, FieldValue::Text(text)) => Key::Text(text),
            (EnumStrategy::LookupId(_), FieldValue::Lookup(pair) | FieldValue::User(pair)) => {
                Key::Id(pair.id)
            }
            (EnumStrategy::LookupId(_), FieldValue::Integer(id)) => match i32::try_from(id) {
                Ok(id) => Key::Id(id),
                Err(_) => return Err(Error::type_conversion(FieldValue::Integer(id), "lookup id")),
            },
            (_, value) => return Err(Error::type_conversion(value, "enum")),
        }))
    }

    /// The native type and value of `key`.
    fn native(&self, key: &Key) -> (ValueType, FieldValue) {
        match (&self.mapping.strategy, key) {
            (EnumStrategy::LookupValue, Key::Text(text)) => (ValueType::Lookup, FieldValue::Text(text.clone())),
            (_, Key::Text(text)) => (ValueType::Choice, FieldValue::Text(text.clone())),
            (_, Key::Id(id)) => (ValueType::Lookup, FieldValue::Integer(*id as i64)),
        }
    }

    fn field_ref(&self, field: &str) -> FieldRef {
        if self.by_id() {
            FieldRef::lookup_id(field)
        } else {
            FieldRef::new(field)
        }
    }

    /// Matches fields reading as the `invalid` sentinel: values no variant
    /// maps to, plus empty fields when no `empty` sentinel is configured.
    fn unmatched(&self, field: &str, op: BinaryOp) -> Filter {
        let field_ref = self.field_ref(field);
        let natives = self.known.iter().map(|(_, key)| self.native(key)).collect::<Vec<_>>();
        let null_is_invalid = self.mapping.empty.is_none();

        if op.is_eq() {
            let mut operands = vec![Filter::from(Comparison::is_not_null(FieldRef::new(field)))];
            operands.extend(natives.into_iter().map(|(ty, value)| {
                Filter::from(Comparison::neq(field_ref.clone(), TypedValue::new(ty, value)))
            }));
            let unknown = Filter::and_from_vec(operands)
                .unwrap_or_else(|| Comparison::is_not_null(FieldRef::new(field)).into());

            if null_is_invalid {
                Filter::or(Comparison::is_null(FieldRef::new(field)), unknown)
            } else {
                unknown
            }
        } else {
            let known = natives.first().map(|(ty, _)| *ty).map(|ty| {
                let values = natives.into_iter().map(|(_, value)| value).collect();
                Filter::from(Comparison::in_list(field_ref, ty, values))
            });

            match (known, null_is_invalid) {
                (Some(known), true) => known,
                (Some(known), false) => Filter::or(Comparison::is_null(FieldRef::new(field)), known),
                // Every item reads as the sentinel
                (None, true) => Comparison::is_null(FieldRef::new(ID_FIELD)).into(),
                (None, false) => Comparison::is_null(FieldRef::new(field)).into(),
            }
        }
    }
}

impl<E: Choice> Adapter<E> for EnumAdapter<E> {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<E> {
        let Some(key) = self.read_key(value.clone())? else {
            return self
                .mapping
                .empty
                .or(self.mapping.invalid)
                .ok_or_else(|| Error::type_conversion(value, std::any::type_name::<E>()));
        };

        self.variant_of(&key)
            .or(self.mapping.invalid)
            .ok_or_else(|| Error::type_conversion(value, std::any::type_name::<E>()))
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &E) -> Result<FieldValue> {
        if Some(*value) == self.mapping.empty {
            return Ok(FieldValue::Null);
        }
        if Some(*value) == self.mapping.invalid {
            return Err(err!("`{value:?}` marks an unmatched value and cannot be written"));
        }

        let key = self
            .key_of(*value)
            .ok_or_else(|| err!("`{value:?}` has no native value"))?;

        Ok(match key {
            Key::Text(text) => FieldValue::Text(text.clone()),
            Key::Id(id) => FieldValue::Lookup(LookupValue::from_id(*id)),
        })
    }

    fn supports_update(&self) -> bool {
        !matches!(self.mapping.strategy, EnumStrategy::LookupValue)
    }

    fn role(&self) -> FieldRole {
        match self.mapping.strategy {
            EnumStrategy::LookupId(_) => FieldRole::LookupId,
            EnumStrategy::LookupValue => FieldRole::LookupValue,
            _ => FieldRole::Value,
        }
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<E>> {
        Some(self)
    }
}

impl<E: Choice> EvalComparison<E> for EnumAdapter<E> {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, E>) -> Result<Filter> {
        let field = args.args.field;
        let value = *args.value;

        if args.op.is_relational() {
            return Err(Error::unsupported_predicate(format!(
                "`{}::{} {} {value:?}` has no order for choice values",
                args.args.entity, args.args.property, args.op
            )));
        }

        if Some(value) == self.mapping.empty {
            return compare_field(FieldRef::new(field), args.op, None, FieldValue::Null);
        }

        if Some(value) == self.mapping.invalid {
            return Ok(self.unmatched(field, args.op));
        }

        let Some(key) = self.key_of(value) else {
            return Err(Error::unsupported_predicate(format!(
                "`{}::{}` has no native value for `{value:?}`",
                args.args.entity, args.args.property
            )));
        };

        let (ty, native) = self.native(key);
        compare_field(self.field_ref(field), args.op, Some(ty), native)
    }
}
