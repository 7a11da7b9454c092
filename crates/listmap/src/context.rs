use crate::{
    accessor::Scope, manager::PageRequest, repository::{FileOptions, UpdateMethod},
    CollectionHandle, DataItem, Entity, EntityMap, Error, FieldName, FieldValue, Result,
};

use std::{cell::OnceCell, sync::Arc};

/// When attachments and the primary file of an entity are loaded.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum FileInclusion {
    /// Unless a call opts out
    #[default]
    Always,

    /// Only when a call opts in
    OnDemand,

    Never,
}

impl FileInclusion {
    pub(crate) fn includes(self, requested: Option<bool>) -> bool {
        match self {
            Self::Always => requested.unwrap_or(true),
            Self::OnDemand => requested.unwrap_or(false),
            Self::Never => false,
        }
    }
}

/// Options of a single manager call.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    /// Fields neither read nor written by this call
    pub exclude_fields: Vec<FieldName>,

    /// Overrides whether attachments are loaded and saved
    pub include_attachments: Option<bool>,

    /// Overrides whether the primary file is loaded and saved
    pub include_file: Option<bool>,

    /// Overrides the manager's update method
    pub update_method: Option<UpdateMethod>,

    /// Restricts a query to one page
    pub page: Option<PageRequest>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_field(mut self, field: impl Into<FieldName>) -> Self {
        self.exclude_fields.push(field.into());
        self
    }

    pub fn exclude_fields(mut self, fields: impl IntoIterator<Item = impl Into<FieldName>>) -> Self {
        self.exclude_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn include_attachments(mut self, include: bool) -> Self {
        self.include_attachments = Some(include);
        self
    }

    pub fn include_file(mut self, include: bool) -> Self {
        self.include_file = Some(include);
        self
    }

    pub fn update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = Some(method);
        self
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    fn retain(&self, fields: &[FieldName]) -> Vec<FieldName> {
        fields
            .iter()
            .filter(|field| !self.exclude_fields.contains(field))
            .cloned()
            .collect()
    }
}

/// State of one manager call.
///
/// A context binds the entity map, the target collection and the call's
/// parameters, and carries the entity and data item through the call. The
/// read and write field lists are computed once per context, after the
/// call's exclusions are applied.
///
/// Hooks receive the context and may set [`cancel_item_update`] to skip the
/// current item or [`cancel_operation`] to stop the whole call.
///
/// [`cancel_item_update`]: OperationContext::cancel_item_update
/// [`cancel_operation`]: OperationContext::cancel_operation
pub struct OperationContext<T> {
    map: Arc<EntityMap<T>>,
    collection: CollectionHandle,
    parameters: Parameters,
    entity: Option<T>,
    data_item: Option<DataItem>,
    read_fields: OnceCell<Vec<FieldName>>,
    write_fields: OnceCell<Vec<FieldName>>,
    operation_canceled: bool,
    item_update_canceled: bool,
}

impl<T: Entity> OperationContext<T> {
    pub fn new(map: Arc<EntityMap<T>>, collection: CollectionHandle, parameters: Parameters) -> Self {
        Self {
            map,
            collection,
            parameters,
            entity: None,
            data_item: None,
            read_fields: OnceCell::new(),
            write_fields: OnceCell::new(),
            operation_canceled: false,
            item_update_canceled: false,
        }
    }

    pub fn map(&self) -> &EntityMap<T> {
        &self.map
    }

    pub fn collection(&self) -> &CollectionHandle {
        &self.collection
    }

    pub(crate) fn set_collection(&mut self, collection: CollectionHandle) {
        self.collection = collection;
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn entity(&self) -> Option<&T> {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> Option<&mut T> {
        self.entity.as_mut()
    }

    pub fn set_entity(&mut self, entity: T) {
        self.entity = Some(entity);
    }

    pub fn take_entity(&mut self) -> Option<T> {
        self.entity.take()
    }

    /// The current data item. Fails until one is set.
    pub fn data_item(&self) -> Result<&DataItem> {
        self.data_item.as_ref().ok_or_else(missing_data_item)
    }

    pub fn data_item_mut(&mut self) -> Result<&mut DataItem> {
        self.data_item.as_mut().ok_or_else(missing_data_item)
    }

    pub fn set_data_item(&mut self, item: DataItem) {
        self.data_item = Some(item);
    }

    pub fn take_data_item(&mut self) -> Option<DataItem> {
        self.data_item.take()
    }

    /// Fields to load when reading an entity.
    pub fn required_fields_for_read(&self) -> &[FieldName] {
        self.read_fields
            .get_or_init(|| self.parameters.retain(self.map.required_fields_for_read()))
    }

    /// Fields to send when writing an entity.
    pub fn required_fields_for_write(&self) -> &[FieldName] {
        self.write_fields
            .get_or_init(|| self.parameters.retain(self.map.required_fields_for_write()))
    }

    /// What the repository loads besides fields.
    pub fn file_options(&self) -> FileOptions {
        self.map.file_options(&self.parameters)
    }

    /// Creates the entity from the current data item.
    pub fn populate_entity(&mut self) -> Result<()> {
        let item = self.data_item.as_ref().ok_or_else(missing_data_item)?;
        let fields = self
            .read_fields
            .get_or_init(|| self.parameters.retain(self.map.required_fields_for_read()));
        let scope = Scope {
            parameters: &self.parameters,
            collection: Some(&self.collection),
        };

        let entity = self.map.read_entity(scope, item, fields)?;
        self.entity = Some(entity);
        Ok(())
    }

    /// Reinitializes the write fields of the current data item and fills
    /// them from the entity.
    ///
    /// Fields mapped to a property start out null. A dependent field without
    /// a property keeps the value it was read with.
    pub fn populate_data_item(&mut self) -> Result<()> {
        let entity = self
            .entity
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("no entity to write"))?;
        let fields = self
            .write_fields
            .get_or_init(|| self.parameters.retain(self.map.required_fields_for_write()));
        let item = self.data_item.as_mut().ok_or_else(missing_data_item)?;

        item.retain(|name| fields.iter().any(|field| field == name));
        for field in fields {
            if self.map.is_property_field(field) || !item.contains(field) {
                item.set(field.clone(), FieldValue::Null);
            }
        }

        let scope = Scope {
            parameters: &self.parameters,
            collection: Some(&self.collection),
        };
        self.map.write_item(scope, entity, fields, item)
    }

    /// Stops the current call. Items already persisted stay persisted.
    pub fn cancel_operation(&mut self) {
        self.operation_canceled = true;
    }

    /// Skips persisting the current item.
    pub fn cancel_item_update(&mut self) {
        self.item_update_canceled = true;
    }

    pub fn is_operation_canceled(&self) -> bool {
        self.operation_canceled
    }

    pub fn is_item_update_canceled(&self) -> bool {
        self.item_update_canceled
    }

    /// Prepares the context for the next item of a batch.
    pub(crate) fn next_item(&mut self) {
        self.entity = None;
        self.data_item = None;
        self.item_update_canceled = false;
    }
}

fn missing_data_item() -> Error {
    Error::invalid_operation("the data item is accessed before it is set")
}
