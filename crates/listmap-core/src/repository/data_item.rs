use super::{Attachment, FileData};
use crate::{FieldName, FieldValue};

use indexmap::IndexMap;

/// One store record as an ordered bag of field values, detached from any
/// live store handle.
#[derive(Debug, Clone, Default)]
pub struct DataItem {
    /// Built-in id assigned by the store. `None` until the item is created.
    pub id: Option<i32>,

    /// Field values in the order the fields were requested.
    pub fields: IndexMap<FieldName, FieldValue>,

    /// `None` when attachments were not requested.
    pub attachments: Option<Vec<Attachment>>,

    /// `None` when the primary file was not requested.
    pub file: Option<FileData>,
}

impl DataItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an item holding `fields`, all set to null.
    pub fn for_fields<'a>(fields: impl IntoIterator<Item = &'a FieldName>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|name| (name.clone(), FieldValue::Null))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Takes the value out of `name`, leaving null in place.
    pub fn take(&mut self, name: &str) -> FieldValue {
        self.fields
            .get_mut(name)
            .map(core::mem::take)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Keeps only the fields for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.fields.retain(|name, _| f(name));
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }
}
