mod collection;
pub use collection::CollectionHandle;

mod data_item;
pub use data_item::DataItem;

mod file;
pub use file::{Attachment, Content, FetchMode, FileData, FileOptions};

mod update_method;
pub use update_method::UpdateMethod;

use crate::{FieldName, Query, Result};

use std::fmt::Debug;

/// Lazily produced data items. The sequence can only be restarted if the
/// repository's cursor supports it.
pub type DataItems<'a> = Box<dyn Iterator<Item = Result<DataItem>> + 'a>;

/// The record store as seen by the mapping engine.
///
/// Every call blocks until the store answers. Data items returned by a
/// repository are detached from any live store handle.
pub trait Repository: Debug + Send + Sync + 'static {
    /// Loads a single item by its built-in id. Returns `Ok(None)` when the
    /// item does not exist.
    fn get_data_item(
        &self,
        collection: &CollectionHandle,
        id: i32,
        fields: &[FieldName],
        files: FileOptions,
    ) -> Result<Option<DataItem>>;

    /// Loads every item of the collection.
    fn get_data_items<'a>(
        &'a self,
        collection: &CollectionHandle,
        fields: &[FieldName],
        files: FileOptions,
    ) -> Result<DataItems<'a>>;

    /// Loads the items matching a native query. The query's `view_fields`
    /// are the fields to load.
    fn find_data_items<'a>(
        &'a self,
        collection: &CollectionHandle,
        query: &Query,
        files: FileOptions,
    ) -> Result<DataItems<'a>>;

    /// Creates a list item and assigns the new id into `item`.
    fn create_item(&self, collection: &CollectionHandle, item: &mut DataItem) -> Result<()>;

    /// Creates a folder named `name` and assigns the new id into `item`.
    fn create_folder(
        &self,
        collection: &CollectionHandle,
        name: &str,
        item: &mut DataItem,
    ) -> Result<()>;

    /// Creates a document from `item.file` and assigns the new id into `item`.
    fn create_file(&self, collection: &CollectionHandle, item: &mut DataItem) -> Result<()>;

    fn update_item(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        method: UpdateMethod,
        files: FileOptions,
    ) -> Result<()>;

    /// Deletes an item. Deleting a missing item is a not-found error.
    fn delete_item(&self, collection: &CollectionHandle, id: i32) -> Result<()>;

    /// Replaces the attachments of the item with `item.attachments`.
    fn save_attachments(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        files: FileOptions,
    ) -> Result<()>;

    /// Replaces the primary file content of the item with `item.file`.
    fn save_file(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        files: FileOptions,
    ) -> Result<()>;

    /// Whether `field` is indexed in the collection. Custom identifiers are
    /// only looked up through indexed fields.
    fn is_indexed(&self, collection: &CollectionHandle, field: &str) -> Result<bool> {
        let _ = (collection, field);
        Ok(true)
    }
}
