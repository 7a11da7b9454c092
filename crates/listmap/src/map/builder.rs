use super::{EntityMap, FileAccessor, Identifier, Location, Registry};
use crate::{
    accessor::{AttachmentsBinding, Binding, Bound, FileBinding, IdBinding},
    adapter::{
        Adapter, Choice, ContentShape, DefaultAdapter, EnumAdapter, EnumMapping, ExternalAdapter,
        FieldType, LookupIdAdapter, LookupKind, LookupMultiAdapter, LookupMultiIdAdapter,
        LookupPairAdapter, LookupTextAdapter, ValueObjectAdapter, ValueObjectListAdapter,
    },
    filter::ID_FIELD,
    Entity, Error, FieldName, FieldRole, FileInclusion, LookupValue, Property, PropertyAccessor,
    Result,
};

use indexmap::{IndexMap, IndexSet};
use std::{collections::HashMap, sync::OnceLock};

/// Name of the dependent field flagging whether an item has attachments.
pub(crate) const ATTACHMENTS_FIELD: &str = "Attachments";

/// Name of the dependent field holding the file name of a document.
pub(crate) const FILE_FIELD: &str = "FileLeafRef";

/// Options of a custom identifier.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IdentifierOptions {
    /// Do not require the store to index the identifier field
    pub skip_index_check: bool,

    /// Do not check for an existing item with the same identifier on create
    pub skip_uniqueness_check: bool,
}

impl IdentifierOptions {
    pub fn skip_index_check(mut self) -> Self {
        self.skip_index_check = true;
        self
    }

    pub fn skip_uniqueness_check(mut self) -> Self {
        self.skip_uniqueness_check = true;
        self
    }
}

/// Collects the mapping of entity `T` inside [`Entity::map`].
pub struct EntityMapBuilder<'a, T> {
    registry: &'a Registry,
    fields: IndexMap<FieldName, Vec<PropertyAccessor<T>>>,
    identifier: Option<Identifier<T>>,
    dependent_fields: IndexMap<FieldName, bool>,
    not_updatable_fields: IndexSet<FieldName>,
    attachments: Option<FileAccessor<T>>,
    file: Option<FileAccessor<T>>,
    file_inclusion: FileInclusion,
}

impl<'a, T: Entity> EntityMapBuilder<'a, T> {
    pub(crate) fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            fields: IndexMap::new(),
            identifier: None,
            dependent_fields: IndexMap::new(),
            not_updatable_fields: IndexSet::new(),
            attachments: None,
            file: None,
            file_inclusion: FileInclusion::default(),
        }
    }

    /// The registry the map is built in.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Identifies items by the store-assigned integer id.
    pub fn register_identifier(&mut self, property: Property<T, i32>) -> Result<()> {
        self.check_identifier(ID_FIELD)?;
        self.check_property(property.name())?;

        let accessor = accessor(
            property.name(),
            ID_FIELD,
            FieldRole::Identifier,
            false,
            Box::new(IdBinding { property }),
        );
        self.identifier = Some(Identifier {
            accessor,
            builtin: true,
            options: IdentifierOptions::default(),
        });
        Ok(())
    }

    /// Identifies items by a unique user field.
    pub fn register_custom_identifier<P: FieldType>(
        &mut self,
        property: Property<T, P>,
        field: impl Into<FieldName>,
        options: IdentifierOptions,
    ) -> Result<()> {
        let field = field.into();
        self.check_identifier(&field)?;
        self.check_property(property.name())?;

        let accessor = accessor(
            property.name(),
            field,
            FieldRole::Identifier,
            true,
            Box::new(Bound {
                property,
                adapter: DefaultAdapter::<P>::new(),
            }),
        );
        self.identifier = Some(Identifier {
            accessor,
            builtin: false,
            options,
        });
        Ok(())
    }

    /// Maps a property whose type converts itself.
    pub fn map_field<P: FieldType>(&mut self, property: Property<T, P>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, DefaultAdapter::<P>::new())
    }

    /// Maps a property through `adapter`.
    pub fn map_with<P, A>(&mut self, property: Property<T, P>, field: impl Into<FieldName>, adapter: A) -> Result<()>
    where
        P: 'static,
        A: Adapter<P>,
    {
        let field = field.into();
        self.check_field(&field)?;
        self.check_property(property.name())?;

        let role = adapter.role();
        let supports_update = adapter.supports_update();
        let accessor = accessor(
            property.name(),
            field.clone(),
            role,
            supports_update,
            Box::new(Bound { property, adapter }),
        );
        self.fields.entry(field).or_default().push(accessor);
        Ok(())
    }

    pub fn map_lookup_id(&mut self, property: Property<T, i32>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupIdAdapter::new(LookupKind::Lookup))
    }

    /// Maps the display text of a lookup. The text is read-only.
    pub fn map_lookup_value(&mut self, property: Property<T, String>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupTextAdapter::new(LookupKind::Lookup))
    }

    pub fn map_lookup(&mut self, property: Property<T, Option<LookupValue>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupPairAdapter::new(LookupKind::Lookup))
    }

    pub fn map_lookups(&mut self, property: Property<T, Vec<LookupValue>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupMultiAdapter::new(LookupKind::Lookup))
    }

    pub fn map_lookup_ids(&mut self, property: Property<T, Vec<i32>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupMultiIdAdapter::new(LookupKind::Lookup))
    }

    pub fn map_user_id(&mut self, property: Property<T, i32>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupIdAdapter::new(LookupKind::User))
    }

    /// Maps the display name of a principal. The name is read-only.
    pub fn map_user_name(&mut self, property: Property<T, String>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupTextAdapter::new(LookupKind::User))
    }

    pub fn map_user(&mut self, property: Property<T, Option<LookupValue>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupPairAdapter::new(LookupKind::User))
    }

    pub fn map_users(&mut self, property: Property<T, Vec<LookupValue>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupMultiAdapter::new(LookupKind::User))
    }

    pub fn map_user_ids(&mut self, property: Property<T, Vec<i32>>, field: impl Into<FieldName>) -> Result<()> {
        self.map_with(property, field, LookupMultiIdAdapter::new(LookupKind::User))
    }

    pub fn map_enum<E: Choice>(
        &mut self,
        property: Property<T, E>,
        field: impl Into<FieldName>,
        mapping: EnumMapping<E>,
    ) -> Result<()> {
        self.map_with(property, field, EnumAdapter::new(mapping))
    }

    /// Maps an external-data field: `id` reads `<field>_ID`, `value` reads
    /// `<field>`.
    pub fn map_external(
        &mut self,
        id: Property<T, Option<String>>,
        value: Property<T, Option<String>>,
        field: &str,
    ) -> Result<()> {
        self.map_with(id, ExternalAdapter::id_field(field), ExternalAdapter::id())?;
        self.map_with(value, field, ExternalAdapter::value())
    }

    /// Maps a value object stored in one field, converted by its own entity
    /// map.
    pub fn map_value_object<V: Entity>(&mut self, property: Property<T, Option<V>>, field: impl Into<FieldName>) -> Result<()> {
        let map = self.registry.entity_map::<V>()?;
        self.map_with(property, field, ValueObjectAdapter::new(map))
    }

    pub fn map_value_objects<V: Entity>(&mut self, property: Property<T, Vec<V>>, field: impl Into<FieldName>) -> Result<()> {
        let map = self.registry.entity_map::<V>()?;
        self.map_with(property, field, ValueObjectListAdapter::new(map))
    }

    /// Maps the attachments of an item. The shape `S` decides what is
    /// loaded.
    pub fn map_attachments<S: ContentShape>(&mut self, property: Property<T, Vec<S>>) -> Result<()> {
        if self.attachments.is_some() {
            return Err(self.error("attachments are mapped twice"));
        }
        self.check_property(property.name())?;
        self.register_dependent_field(ATTACHMENTS_FIELD, false);

        self.attachments = Some(FileAccessor {
            accessor: accessor(
                property.name(),
                ATTACHMENTS_FIELD,
                FieldRole::Attachments,
                S::UPDATABLE,
                Box::new(AttachmentsBinding { property }),
            ),
            fetch: S::FETCH,
        });
        Ok(())
    }

    /// Maps the primary file of a document item.
    pub fn map_file<S: ContentShape>(&mut self, property: Property<T, Option<S>>) -> Result<()> {
        if self.file.is_some() {
            return Err(self.error("the file is mapped twice"));
        }
        self.check_property(property.name())?;
        self.register_dependent_field(FILE_FIELD, false);

        self.file = Some(FileAccessor {
            accessor: accessor(
                property.name(),
                FILE_FIELD,
                FieldRole::File,
                S::UPDATABLE,
                Box::new(FileBinding { property }),
            ),
            fetch: S::FETCH,
        });
        Ok(())
    }

    /// Requires `field` for every operation even though no property maps it.
    pub fn register_dependent_field(&mut self, field: impl Into<FieldName>, supports_update: bool) {
        self.dependent_fields.insert(field.into(), supports_update);
    }

    /// Never writes `field`, whatever its accessors support.
    pub fn register_not_updatable_field(&mut self, field: impl Into<FieldName>) {
        self.not_updatable_fields.insert(field.into());
    }

    /// Never writes `property`. The property must already be mapped.
    pub fn register_not_updatable_property<P>(&mut self, property: Property<T, P>) -> Result<()> {
        let name = property.name();
        let accessor = self
            .fields
            .values_mut()
            .flatten()
            .find(|accessor| accessor.property() == name);

        match accessor {
            Some(accessor) => {
                accessor.set_supports_update(false);
                Ok(())
            }
            None => Err(self.error(format!("property `{name}` is not mapped to a field"))),
        }
    }

    pub fn file_inclusion(&mut self, inclusion: FileInclusion) -> &mut Self {
        self.file_inclusion = inclusion;
        self
    }

    pub(crate) fn finish(self) -> Result<EntityMap<T>> {
        if self.file.is_some() && self.file_inclusion == FileInclusion::Never {
            return Err(self.error("a mapped file cannot be excluded with `FileInclusion::Never`"));
        }

        let mut properties = HashMap::new();
        for (field_index, (_, accessors)) in self.fields.iter().enumerate() {
            for (index, accessor) in accessors.iter().enumerate() {
                properties.insert(accessor.property(), Location::Field(field_index, index));
            }
        }
        if let Some(id) = &self.identifier {
            properties.insert(id.accessor.property(), Location::Identifier);
        }
        if let Some(file) = &self.attachments {
            properties.insert(file.accessor.property(), Location::Attachments);
        }
        if let Some(file) = &self.file {
            properties.insert(file.accessor.property(), Location::File);
        }

        Ok(EntityMap {
            fields: self.fields,
            identifier: self.identifier,
            dependent_fields: self.dependent_fields,
            not_updatable_fields: self.not_updatable_fields,
            attachments: self.attachments,
            file: self.file,
            file_inclusion: self.file_inclusion,
            properties,
            read_fields: OnceLock::new(),
            write_fields: OnceLock::new(),
        })
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::mapping_configuration(T::NAME, message)
    }

    fn check_identifier(&self, field: &str) -> Result<()> {
        if let Some(id) = &self.identifier {
            return Err(self.error(format!(
                "identifier is registered twice (`{}` and `{field}`)",
                id.accessor.field()
            )));
        }
        if self.fields.contains_key(field) {
            return Err(self.error(format!(
                "field `{field}` is already mapped and cannot be the identifier"
            )));
        }
        Ok(())
    }

    fn check_field(&self, field: &str) -> Result<()> {
        match &self.identifier {
            Some(id) if id.accessor.field() == field => Err(self.error(format!(
                "field `{field}` is the identifier and cannot be mapped again"
            ))),
            _ if self.identifier.is_none() && field == ID_FIELD => Err(self.error(format!(
                "field `{ID_FIELD}` is the built-in id; register it as the identifier"
            ))),
            _ => Ok(()),
        }
    }

    fn check_property(&self, name: &'static str) -> Result<()> {
        let taken = self
            .fields
            .values()
            .flatten()
            .chain(self.identifier.as_ref().map(|id| &id.accessor))
            .chain(self.attachments.as_ref().map(|file| &file.accessor))
            .chain(self.file.as_ref().map(|file| &file.accessor))
            .any(|accessor| accessor.property() == name);

        if taken {
            return Err(self.error(format!("property `{name}` is mapped twice")));
        }
        Ok(())
    }
}

fn accessor<T: Entity>(
    property: &'static str,
    field: impl Into<FieldName>,
    role: FieldRole,
    supports_update: bool,
    binding: Box<dyn Binding<T>>,
) -> PropertyAccessor<T> {
    PropertyAccessor::new(property, T::NAME, field.into(), role, supports_update, binding)
}
