use super::{Hook, Manager, Outcome};
use crate::{
    adapter::compare_field,
    filter::{FieldRef, ID_FIELD},
    predicate::BinaryOp,
    repository::FileOptions,
    DataItem, Entity, Error, OperationContext, Parameters, Query, Result, Updatable,
};

use std::mem;
use tracing::{debug, debug_span};

/// What a create call makes in the store.
#[derive(Debug, Copy, Clone)]
pub(super) enum Target<'a> {
    Item,
    Folder(&'a str),
    File,
}

impl<T: Entity> Manager<T> {
    /// Creates `entity` as a new item and assigns the store's id back into
    /// it. Returns `false` when a hook canceled the creation.
    pub fn create(&self, entity: &mut T) -> Result<bool> {
        self.create_with(entity, Parameters::default())
    }

    pub fn create_with(&self, entity: &mut T, parameters: Parameters) -> Result<bool> {
        let span = debug_span!("create", entity = T::NAME, collection = %self.collection);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        Ok(self.create_item(&mut cx, entity, Target::Item)?.persisted())
    }

    /// Creates `entity` as a folder named `name`.
    pub fn create_folder(&self, entity: &mut T, name: &str) -> Result<bool> {
        let span = debug_span!("create_folder", entity = T::NAME, collection = %self.collection, name);
        let _enter = span.enter();

        let mut cx = self.context(Parameters::default());
        Ok(self.create_item(&mut cx, entity, Target::Folder(name))?.persisted())
    }

    /// Creates `entity` as a document from its mapped file.
    pub fn create_file(&self, entity: &mut T) -> Result<bool> {
        if !self.map.has_file() {
            return Err(Error::invalid_operation(format!(
                "`{}` does not map a file",
                T::NAME
            )));
        }

        let span = debug_span!("create_file", entity = T::NAME, collection = %self.collection);
        let _enter = span.enter();

        let mut cx = self.context(Parameters::default().include_file(true));
        Ok(self.create_item(&mut cx, entity, Target::File)?.persisted())
    }

    /// Writes an entity back into the item it was fetched from. Returns
    /// `false` when a hook canceled the update.
    pub fn update(&self, updatable: &mut Updatable<T>) -> Result<bool> {
        self.update_with(updatable, Parameters::default())
    }

    pub fn update_with(&self, updatable: &mut Updatable<T>, parameters: Parameters) -> Result<bool> {
        let span = debug_span!("update", entity = T::NAME, collection = %updatable.collection(), id = ?updatable.id());
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        Ok(self.update_item(&mut cx, updatable)?.persisted())
    }

    /// Writes `entity` into the existing item with built-in id `id`.
    ///
    /// Dependent fields the entity does not map keep their stored values.
    pub fn update_by_id(&self, id: i32, entity: &mut T) -> Result<bool> {
        self.update_by_id_with(id, entity, Parameters::default())
    }

    pub fn update_by_id_with(&self, id: i32, entity: &mut T, parameters: Parameters) -> Result<bool> {
        let span = debug_span!("update_by_id", entity = T::NAME, collection = %self.collection, id);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        let item = self
            .repository
            .get_data_item(&self.collection, id, cx.required_fields_for_write(), FileOptions::NONE)?
            .ok_or_else(|| self.not_found(format_args!("id={id}")))?;

        let mut updatable = Updatable::new(mem::take(entity), item, self.collection.clone());
        let assigned = {
            let (entity, item, _) = updatable.parts();
            self.map.assign_id(self.scope(&cx), item, entity)
        };
        let outcome = assigned.and_then(|()| self.update_item(&mut cx, &mut updatable));
        *entity = updatable.into_inner();
        Ok(outcome?.persisted())
    }

    /// Deletes the item with built-in id `id`. Deleting a missing item is a
    /// not-found error. Returns `false` when a hook canceled the deletion.
    pub fn delete(&self, id: i32) -> Result<bool> {
        self.delete_with(id, Parameters::default())
    }

    pub fn delete_with(&self, id: i32, parameters: Parameters) -> Result<bool> {
        let span = debug_span!("delete", entity = T::NAME, collection = %self.collection, id);
        let _enter = span.enter();

        let mut cx = self.context(parameters);
        Ok(self.delete_item(&mut cx, id)?.persisted())
    }

    pub(super) fn create_item(
        &self,
        cx: &mut OperationContext<T>,
        entity: &mut T,
        target: Target<'_>,
    ) -> Result<Outcome> {
        cx.next_item();
        cx.set_entity(mem::take(entity));
        cx.set_data_item(DataItem::new());

        let outcome = self.create_in_context(cx, target);
        if let Some(created) = cx.take_entity() {
            *entity = created;
        }
        outcome
    }

    fn create_in_context(&self, cx: &mut OperationContext<T>, target: Target<'_>) -> Result<Outcome> {
        if let Some(outcome) = self.run_hooks(&self.hooks.before_create, cx)? {
            return Ok(outcome);
        }

        cx.populate_data_item()?;
        self.check_unique(cx)?;

        let collection = cx.collection().clone();
        let files = cx.file_options();
        let item = cx.data_item_mut()?;

        match target {
            Target::Item => self.repository.create_item(&collection, item)?,
            Target::Folder(name) => self.repository.create_folder(&collection, name, item)?,
            Target::File => {
                if item.file.is_none() {
                    return Err(Error::invalid_operation(format!(
                        "`{}` has no file content to create a document from",
                        T::NAME
                    )));
                }
                self.repository.create_file(&collection, item)?
            }
        }

        if item.attachments.as_ref().is_some_and(|a| !a.is_empty()) {
            self.repository.save_attachments(&collection, item, files)?;
        }
        debug!(id = ?item.id, ?target, "item created");

        let mut entity = cx
            .take_entity()
            .ok_or_else(|| Error::invalid_operation("no entity to create"))?;
        let assigned = self.map.assign_id(self.scope(cx), cx.data_item()?, &mut entity);
        cx.set_entity(entity);
        assigned?;

        Ok(Outcome::Persisted)
    }

    pub(super) fn update_item(
        &self,
        cx: &mut OperationContext<T>,
        updatable: &mut Updatable<T>,
    ) -> Result<Outcome> {
        let (entity, item, collection) = updatable.parts();
        cx.next_item();
        cx.set_collection(collection.clone());
        cx.set_entity(mem::take(entity));
        cx.set_data_item(mem::take(item));

        let outcome = self.update_in_context(cx);
        if let Some(updated) = cx.take_entity() {
            *entity = updated;
        }
        if let Some(updated) = cx.take_data_item() {
            *item = updated;
        }
        outcome
    }

    fn update_in_context(&self, cx: &mut OperationContext<T>) -> Result<Outcome> {
        if cx.data_item()?.id.is_none() {
            return Err(Error::invalid_operation(format!(
                "cannot update a `{}` that was never created",
                T::NAME
            )));
        }

        if let Some(outcome) = self.run_hooks(&self.hooks.before_update, cx)? {
            return Ok(outcome);
        }

        cx.populate_data_item()?;
        self.check_unique(cx)?;

        let method = self.update_method(cx.parameters());
        let files = cx.file_options();
        let item = cx.data_item()?;

        self.repository.update_item(cx.collection(), item, method, files)?;
        if item.attachments.is_some() {
            self.repository.save_attachments(cx.collection(), item, files)?;
        }
        if item.file.is_some() {
            self.repository.save_file(cx.collection(), item, files)?;
        }
        debug!(id = ?item.id, ?method, "item updated");

        Ok(Outcome::Persisted)
    }

    pub(super) fn delete_item(&self, cx: &mut OperationContext<T>, id: i32) -> Result<Outcome> {
        cx.next_item();
        cx.set_data_item(DataItem::new().with_id(id));

        if let Some(outcome) = self.run_hooks(&self.hooks.before_delete, cx)? {
            return Ok(outcome);
        }

        self.repository.delete_item(cx.collection(), id)?;
        debug!(id, "item deleted");
        Ok(Outcome::Persisted)
    }

    /// Runs `hooks` in order, stopping at the first one that cancels.
    fn run_hooks(&self, hooks: &[Hook<T>], cx: &mut OperationContext<T>) -> Result<Option<Outcome>> {
        for hook in hooks {
            hook(cx)?;

            if cx.is_operation_canceled() {
                debug!("operation canceled by hook");
                return Ok(Some(Outcome::Canceled));
            }
            if cx.is_item_update_canceled() {
                debug!("item skipped by hook");
                return Ok(Some(Outcome::Skipped));
            }
        }
        Ok(None)
    }

    /// Rejects a write whose custom identifier is already held by another
    /// item.
    fn check_unique(&self, cx: &OperationContext<T>) -> Result<()> {
        let Ok((accessor, options)) = self.custom_identifier() else {
            return Ok(());
        };
        if options.skip_uniqueness_check {
            return Ok(());
        }

        let item = cx.data_item()?;
        let Some(value) = item.get(accessor.field()).filter(|value| !value.is_empty()) else {
            return Ok(());
        };
        self.check_indexed(accessor, options)?;

        let filter = compare_field(FieldRef::new(accessor.field()), BinaryOp::Eq, None, value.clone())?;
        let query = Query::new().filter(filter).view_fields([ID_FIELD]).row_limit(2);
        let taken = self
            .fetch(cx, &query)?
            .iter()
            .any(|other| item.id.is_none() || other.id != item.id);

        if taken {
            return Err(Error::invalid_operation(format!(
                "custom identifier `{}` = {value} already exists in {}",
                accessor.field(),
                cx.collection()
            )));
        }
        Ok(())
    }
}
