mod builder;
pub use builder::{EntityMapBuilder, IdentifierOptions};

mod registry;
pub use registry::Registry;

use crate::{
    accessor::Scope,
    repository::{FetchMode, FileOptions},
    DataItem, Entity, FieldName, FileInclusion, Parameters, PropertyAccessor, Result,
};

use indexmap::{IndexMap, IndexSet};
use std::{collections::HashMap, fmt, sync::OnceLock};

/// Binds the properties of entity `T` to native fields.
///
/// A map is built once per registry by [`Entity::map`] and never changes
/// afterwards. One field may feed several properties, such as the id and
/// the text of a lookup; each property maps to exactly one field.
pub struct EntityMap<T> {
    fields: IndexMap<FieldName, Vec<PropertyAccessor<T>>>,
    identifier: Option<Identifier<T>>,
    dependent_fields: IndexMap<FieldName, bool>,
    not_updatable_fields: IndexSet<FieldName>,
    attachments: Option<FileAccessor<T>>,
    file: Option<FileAccessor<T>>,
    file_inclusion: FileInclusion,
    properties: HashMap<&'static str, Location>,
    read_fields: OnceLock<Vec<FieldName>>,
    write_fields: OnceLock<Vec<FieldName>>,
}

pub(crate) struct Identifier<T> {
    pub(crate) accessor: PropertyAccessor<T>,
    pub(crate) builtin: bool,
    pub(crate) options: IdentifierOptions,
}

pub(crate) struct FileAccessor<T> {
    pub(crate) accessor: PropertyAccessor<T>,
    pub(crate) fetch: FetchMode,
}

#[derive(Debug, Copy, Clone)]
enum Location {
    Field(usize, usize),
    Identifier,
    Attachments,
    File,
}

impl<T: Entity> EntityMap<T> {
    pub(crate) fn build(registry: &Registry) -> Result<Self> {
        let mut builder = EntityMapBuilder::new(registry);
        T::map(&mut builder)?;
        builder.finish()
    }

    /// The mapped fields with the accessors reading each of them.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &[PropertyAccessor<T>])> {
        self.fields
            .iter()
            .map(|(field, accessors)| (field, accessors.as_slice()))
    }

    pub fn accessors(&self, field: &str) -> &[PropertyAccessor<T>] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The accessor of the property named `property`.
    pub fn accessor(&self, property: &str) -> Option<&PropertyAccessor<T>> {
        Some(match *self.properties.get(property)? {
            Location::Field(field, index) => &self.fields.get_index(field)?.1[index],
            Location::Identifier => &self.identifier.as_ref()?.accessor,
            Location::Attachments => &self.attachments.as_ref()?.accessor,
            Location::File => &self.file.as_ref()?.accessor,
        })
    }

    pub fn identifier(&self) -> Option<&PropertyAccessor<T>> {
        self.identifier.as_ref().map(|id| &id.accessor)
    }

    /// Name of the field identifying an item.
    pub fn identifier_field(&self) -> Option<&str> {
        self.identifier.as_ref().map(|id| id.accessor.field())
    }

    /// Returns `true` when items are identified by the store-assigned id.
    pub fn identifier_is_builtin(&self) -> bool {
        self.identifier.as_ref().is_some_and(|id| id.builtin)
    }

    pub fn identifier_options(&self) -> Option<IdentifierOptions> {
        self.identifier.as_ref().map(|id| id.options)
    }

    /// Fields required for every operation, with whether each is written.
    pub fn dependent_fields(&self) -> impl Iterator<Item = (&FieldName, bool)> {
        self.dependent_fields
            .iter()
            .map(|(field, updatable)| (field, *updatable))
    }

    pub fn not_updatable_fields(&self) -> impl Iterator<Item = &FieldName> {
        self.not_updatable_fields.iter()
    }

    pub fn file_inclusion(&self) -> FileInclusion {
        self.file_inclusion
    }

    /// Every mapped field plus the dependent fields. The built-in id is
    /// always returned by the store and is not listed.
    pub fn required_fields_for_read(&self) -> &[FieldName] {
        self.read_fields.get_or_init(|| {
            let mut fields = IndexSet::new();
            if let Some(id) = &self.identifier {
                if !id.builtin {
                    fields.insert(id.accessor.field().to_string());
                }
            }
            fields.extend(self.fields.keys().cloned());
            fields.extend(self.dependent_fields.keys().cloned());
            fields.into_iter().collect()
        })
    }

    /// Fields with at least one updatable accessor and the updatable
    /// dependent fields, minus the fields registered as not updatable.
    pub fn required_fields_for_write(&self) -> &[FieldName] {
        self.write_fields.get_or_init(|| {
            let mut fields = IndexSet::new();
            if let Some(id) = &self.identifier {
                if !id.builtin && id.accessor.supports_update() {
                    fields.insert(id.accessor.field().to_string());
                }
            }
            for (field, accessors) in &self.fields {
                if accessors.iter().any(PropertyAccessor::supports_update) {
                    fields.insert(field.clone());
                }
            }
            for (field, updatable) in &self.dependent_fields {
                if *updatable {
                    fields.insert(field.clone());
                }
            }
            fields.retain(|field| !self.not_updatable_fields.contains(field));
            fields.into_iter().collect()
        })
    }

    /// What a read with `parameters` loads besides fields.
    pub fn file_options(&self, parameters: &Parameters) -> FileOptions {
        let fetch = |file: &Option<FileAccessor<T>>, requested| match file {
            Some(file) if self.file_inclusion.includes(requested) => file.fetch,
            _ => FetchMode::Skip,
        };
        FileOptions {
            attachments: fetch(&self.attachments, parameters.include_attachments),
            file: fetch(&self.file, parameters.include_file),
        }
    }

    /// Whether a property reads or writes `field`.
    pub(crate) fn is_property_field(&self, field: &str) -> bool {
        self.fields.contains_key(field) || self.identifier_field() == Some(field)
    }

    pub(crate) fn read_entity(&self, scope: Scope<'_>, item: &DataItem, fields: &[FieldName]) -> Result<T> {
        let mut entity = T::default();

        if let Some(id) = &self.identifier {
            if id.builtin || fields.iter().any(|field| field == id.accessor.field()) {
                id.accessor.read(scope, item, &mut entity)?;
            }
        }

        for field in fields {
            for accessor in self.accessors(field) {
                accessor.read(scope, item, &mut entity)?;
            }
        }

        for file in [&self.attachments, &self.file].into_iter().flatten() {
            file.accessor.read(scope, item, &mut entity)?;
        }

        Ok(entity)
    }

    pub(crate) fn write_item(
        &self,
        scope: Scope<'_>,
        entity: &T,
        fields: &[FieldName],
        item: &mut DataItem,
    ) -> Result<()> {
        if let Some(id) = &self.identifier {
            if id.builtin || fields.iter().any(|field| field == id.accessor.field()) {
                id.accessor.write(scope, entity, item)?;
            }
        }

        for field in fields {
            for accessor in self.accessors(field) {
                if accessor.supports_update() {
                    accessor.write(scope, entity, item)?;
                }
            }
        }

        item.attachments = None;
        item.file = None;

        let parameters = scope.parameters;
        if let Some(file) = &self.attachments {
            if file.accessor.supports_update() && self.file_inclusion.includes(parameters.include_attachments) {
                file.accessor.write(scope, entity, item)?;
            }
        }
        if let Some(file) = &self.file {
            if file.accessor.supports_update() && self.file_inclusion.includes(parameters.include_file) {
                file.accessor.write(scope, entity, item)?;
            }
        }

        Ok(())
    }

    /// Writes every read field of `entity` that has a conversion, whether or
    /// not the store updates it. Value objects are stored this way.
    pub(crate) fn write_embedded(&self, scope: Scope<'_>, entity: &T) -> Result<DataItem> {
        let mut item = DataItem::new();

        if let Some(id) = self.identifier.as_ref().filter(|id| !id.builtin) {
            id.accessor.write(scope, entity, &mut item)?;
        }

        for field in self.required_fields_for_read() {
            for accessor in self.accessors(field) {
                if accessor.has_conversion() {
                    accessor.write(scope, entity, &mut item)?;
                }
            }
        }

        Ok(item)
    }

    /// Copies the store-assigned id of `item` into `entity`.
    pub(crate) fn assign_id(&self, scope: Scope<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        match &self.identifier {
            Some(id) if id.builtin => id.accessor.read(scope, item, entity),
            _ => Ok(()),
        }
    }

    pub(crate) fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

impl<T> fmt::Debug for EntityMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMap")
            .field("fields", &self.fields)
            .field("identifier", &self.identifier.as_ref().map(|id| &id.accessor))
            .field("dependent_fields", &self.dependent_fields)
            .field("not_updatable_fields", &self.not_updatable_fields)
            .field("file_inclusion", &self.file_inclusion)
            .finish()
    }
}
