use super::{Adapter, AdapterArgs, ComparisonArgs, EvalComparison};
use crate::{accessor::Scope, DataItem, Entity, EntityMap, Error, FieldValue, Filter, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// Stores a value object in one text field, as JSON of the fields its own
/// entity map produces.
pub struct ValueObjectAdapter<V> {
    map: Arc<EntityMap<V>>,
}

/// Stores a list of value objects in one text field, as a JSON array.
pub struct ValueObjectListAdapter<V> {
    map: Arc<EntityMap<V>>,
}

impl<V: Entity> ValueObjectAdapter<V> {
    pub fn new(map: Arc<EntityMap<V>>) -> Self {
        Self { map }
    }
}

impl<V: Entity> ValueObjectListAdapter<V> {
    pub fn new(map: Arc<EntityMap<V>>) -> Self {
        Self { map }
    }
}

type Fields = IndexMap<String, FieldValue>;

fn read<V: Entity>(map: &EntityMap<V>, args: &AdapterArgs<'_>, fields: Fields) -> Result<V> {
    let item = DataItem {
        fields,
        ..DataItem::default()
    };
    map.read_entity(Scope::from(args), &item, map.required_fields_for_read())
}

fn write<V: Entity>(map: &EntityMap<V>, args: &AdapterArgs<'_>, value: &V) -> Result<Fields> {
    Ok(map.write_embedded(Scope::from(args), value)?.fields)
}

fn json(value: FieldValue) -> Result<Option<String>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(text) if text.trim().is_empty() => Ok(None),
        FieldValue::Text(text) => Ok(Some(text)),
        value => Err(Error::type_conversion(value, "value object")),
    }
}

fn not_comparable(entity: &str, property: &str) -> Error {
    Error::unsupported_predicate(format!(
        "`{entity}::{property}` holds a value object and cannot be compared"
    ))
}

impl<V: Entity> Adapter<Option<V>> for ValueObjectAdapter<V> {
    fn to_property(&self, args: &AdapterArgs<'_>, value: FieldValue) -> Result<Option<V>> {
        let Some(json) = json(value)? else {
            return Ok(None);
        };
        let fields: Fields = serde_json::from_str(&json)?;
        read(&self.map, args, fields).map(Some)
    }

    fn to_field(&self, args: &AdapterArgs<'_>, value: &Option<V>) -> Result<FieldValue> {
        let Some(value) = value else {
            return Ok(FieldValue::Null);
        };
        let fields = write(&self.map, args, value)?;
        Ok(FieldValue::Text(serde_json::to_string(&fields)?))
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<Option<V>>> {
        Some(self)
    }
}

impl<V: Entity> EvalComparison<Option<V>> for ValueObjectAdapter<V> {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, Option<V>>) -> Result<Filter> {
        Err(not_comparable(args.args.entity, args.args.property))
    }
}

impl<V: Entity> Adapter<Vec<V>> for ValueObjectListAdapter<V> {
    fn to_property(&self, args: &AdapterArgs<'_>, value: FieldValue) -> Result<Vec<V>> {
        let Some(json) = json(value)? else {
            return Ok(vec![]);
        };
        let items: Vec<Fields> = serde_json::from_str(&json)?;
        items
            .into_iter()
            .map(|fields| read(&self.map, args, fields))
            .collect()
    }

    fn to_field(&self, args: &AdapterArgs<'_>, value: &Vec<V>) -> Result<FieldValue> {
        if value.is_empty() {
            return Ok(FieldValue::Null);
        }
        let items = value
            .iter()
            .map(|value| write(&self.map, args, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldValue::Text(serde_json::to_string(&items)?))
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<Vec<V>>> {
        Some(self)
    }
}

impl<V: Entity> EvalComparison<Vec<V>> for ValueObjectListAdapter<V> {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, Vec<V>>) -> Result<Filter> {
        Err(not_comparable(args.args.entity, args.args.property))
    }
}
