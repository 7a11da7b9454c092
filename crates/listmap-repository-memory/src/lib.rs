mod log;
pub use log::Operation;

mod store;
use store::{Kind, ListKey, Store, FILE_LEAF_REF};

use listmap_core::{
    repository::{Content, DataItems, FileOptions, UpdateMethod},
    CollectionHandle, DataItem, Error, FieldName, Query, Repository, Result,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A record store held in process memory.
///
/// Lists are created on first write. Every item gets the next id of its
/// list, starting at 1. Filters are evaluated with the store's comparison
/// semantics; a filter holding a `Local` subtree is rejected the way a
/// remote store would reject it.
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
    log: Arc<Mutex<Vec<Operation>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` of `list` as indexed. A list without declared
    /// indexes reports every field as indexed.
    pub fn index_field(&self, list: &str, field: impl Into<FieldName>) -> &Self {
        lock(&self.store)
            .list_mut(ListKey::of(&CollectionHandle::list(list)))
            .indexed
            .insert(field.into());
        self
    }

    /// Stores `item` as a new item without going through an entity map and
    /// returns its id.
    pub fn insert(&self, collection: &CollectionHandle, item: &DataItem) -> i32 {
        lock(&self.store)
            .list_mut(ListKey::of(collection))
            .insert(Kind::Item, collection.folder_path(), item)
    }

    /// Every stored field of the item with id `id`.
    pub fn raw_item(&self, collection: &CollectionHandle, id: i32) -> Option<DataItem> {
        let store = lock(&self.store);
        let stored = store.list(&ListKey::of(collection))?.items.get(&id)?;
        Some(stored.full(id))
    }

    /// Names and content of the attachments of an item.
    pub fn raw_attachments(&self, collection: &CollectionHandle, id: i32) -> Vec<(String, Vec<u8>)> {
        let store = lock(&self.store);
        store
            .list(&ListKey::of(collection))
            .and_then(|list| list.items.get(&id))
            .map(|item| item.attachments.clone())
            .unwrap_or_default()
    }

    /// Version counter of an item; regular updates bump it.
    pub fn version(&self, collection: &CollectionHandle, id: i32) -> Option<u32> {
        let store = lock(&self.store);
        Some(store.list(&ListKey::of(collection))?.items.get(&id)?.version)
    }

    /// Number of items of the list `collection` points at.
    pub fn len(&self, collection: &CollectionHandle) -> usize {
        let store = lock(&self.store);
        store
            .list(&ListKey::of(collection))
            .map_or(0, |list| list.visible(collection).count())
    }

    pub fn is_empty(&self, collection: &CollectionHandle) -> bool {
        self.len(collection) == 0
    }

    /// Calls made so far, oldest first.
    pub fn operations(&self) -> Vec<Operation> {
        lock(&self.log).clone()
    }

    pub fn clear_operations(&self) {
        lock(&self.log).clear();
    }

    fn record(&self, operation: Operation) {
        debug!(?operation, "memory repository call");
        lock(&self.log).push(operation);
    }

    fn read(
        &self,
        store: &Store,
        collection: &CollectionHandle,
        id: i32,
        fields: &[FieldName],
        files: FileOptions,
    ) -> Option<DataItem> {
        let key = ListKey::of(collection);
        let stored = store.list(&key)?.items.get(&id)?;

        let mut item = stored.project(id, fields);
        item.attachments = store::attachments(&stored.attachments, files.attachments, |name| {
            let repository = self.clone();
            let key = key.clone();
            let name = name.to_string();
            Content::deferred(move || repository.load_attachment(&key, id, &name))
        });
        item.file = store::file(stored.file.as_ref(), files.file, || {
            let repository = self.clone();
            let key = key.clone();
            Content::deferred(move || repository.load_file(&key, id))
        });
        Some(item)
    }

    fn load_attachment(&self, key: &ListKey, id: i32, name: &str) -> Result<Vec<u8>> {
        let store = lock(&self.store);
        store
            .list(key)
            .and_then(|list| list.items.get(&id))
            .and_then(|item| item.attachments.iter().find(|(n, _)| n == name))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::record_not_found(format!("attachment `{name}` of item {id}")))
    }

    fn load_file(&self, key: &ListKey, id: i32) -> Result<Vec<u8>> {
        let store = lock(&self.store);
        store
            .list(key)
            .and_then(|list| list.items.get(&id))
            .and_then(|item| item.file.as_ref())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::record_not_found(format!("file of item {id}")))
    }

    fn create(&self, collection: &CollectionHandle, kind: Kind, item: &mut DataItem) -> i32 {
        let mut store = lock(&self.store);
        let list = store.list_mut(ListKey::of(collection));
        let id = list.insert(kind, collection.folder_path(), item);
        item.id = Some(id);
        id
    }
}

impl Repository for MemoryRepository {
    fn get_data_item(
        &self,
        collection: &CollectionHandle,
        id: i32,
        fields: &[FieldName],
        files: FileOptions,
    ) -> Result<Option<DataItem>> {
        self.record(Operation::Get {
            list: collection.list_name().to_string(),
            id,
        });
        let store = lock(&self.store);
        Ok(self.read(&store, collection, id, fields, files))
    }

    fn get_data_items<'a>(
        &'a self,
        collection: &CollectionHandle,
        fields: &[FieldName],
        files: FileOptions,
    ) -> Result<DataItems<'a>> {
        self.record(Operation::GetAll {
            list: collection.list_name().to_string(),
        });

        let store = lock(&self.store);
        let ids = match store.list(&ListKey::of(collection)) {
            Some(list) => list.visible(collection).map(|(id, _)| id).collect(),
            None => vec![],
        };
        let items = ids
            .into_iter()
            .filter_map(|id| self.read(&store, collection, id, fields, files))
            .map(Ok)
            .collect::<Vec<_>>();
        Ok(Box::new(items.into_iter()))
    }

    fn find_data_items<'a>(
        &'a self,
        collection: &CollectionHandle,
        query: &Query,
        files: FileOptions,
    ) -> Result<DataItems<'a>> {
        self.record(Operation::Find {
            list: collection.list_name().to_string(),
            row_limit: query.row_limit,
            position: query.position,
        });

        if query.filter.as_ref().is_some_and(|filter| filter.has_local()) {
            return Err(Error::unsupported_predicate(
                "the store cannot evaluate a filter marked for local evaluation",
            ));
        }

        let store = lock(&self.store);
        let Some(list) = store.list(&ListKey::of(collection)) else {
            return Ok(Box::new(std::iter::empty()));
        };

        let mut matched = vec![];
        for (id, item) in list.visible(collection) {
            if query.position.is_some_and(|after| id <= after) {
                continue;
            }
            if item.matches(id, query.filter.as_ref())? {
                matched.push((id, item));
            }
        }
        matched.sort_by(|(lhs_id, lhs), (rhs_id, rhs)| lhs.compare(*lhs_id, rhs, *rhs_id, &query.order_by));
        if let Some(limit) = query.row_limit {
            matched.truncate(limit);
        }

        let items = matched
            .into_iter()
            .filter_map(|(id, _)| self.read(&store, collection, id, &query.view_fields, files))
            .map(Ok)
            .collect::<Vec<_>>();
        Ok(Box::new(items.into_iter()))
    }

    fn create_item(&self, collection: &CollectionHandle, item: &mut DataItem) -> Result<()> {
        let id = self.create(collection, Kind::Item, item);
        self.record(Operation::Create {
            list: collection.list_name().to_string(),
            id,
        });
        Ok(())
    }

    fn create_folder(
        &self,
        collection: &CollectionHandle,
        name: &str,
        item: &mut DataItem,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_operation("a folder needs a name"));
        }
        item.set(FILE_LEAF_REF, name);
        let id = self.create(collection, Kind::Folder, item);
        self.record(Operation::CreateFolder {
            list: collection.list_name().to_string(),
            id,
            name: name.to_string(),
        });
        Ok(())
    }

    fn create_file(&self, collection: &CollectionHandle, item: &mut DataItem) -> Result<()> {
        let Some(file) = item.file.clone() else {
            return Err(Error::invalid_operation("a document needs file content"));
        };
        let bytes = file.content.load()?.unwrap_or_default();

        item.set(FILE_LEAF_REF, file.name.clone());
        let id = self.create(collection, Kind::Document, item);
        if let Some(stored) = lock(&self.store)
            .list_mut(ListKey::of(collection))
            .items
            .get_mut(&id)
        {
            stored.file = Some((file.name.clone(), bytes));
        }

        self.record(Operation::CreateFile {
            list: collection.list_name().to_string(),
            id,
            name: file.name,
        });
        Ok(())
    }

    fn update_item(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        method: UpdateMethod,
        _files: FileOptions,
    ) -> Result<()> {
        let id = item_id(item)?;
        {
            let mut store = lock(&self.store);
            let stored = store
                .list_mut(ListKey::of(collection))
                .items
                .get_mut(&id)
                .ok_or_else(|| Error::record_not_found(format!("{collection} id={id}")))?;
            stored.apply(item);
            if method == UpdateMethod::Update {
                stored.version += 1;
            }
        }
        self.record(Operation::Update {
            list: collection.list_name().to_string(),
            id,
            method,
        });
        Ok(())
    }

    fn delete_item(&self, collection: &CollectionHandle, id: i32) -> Result<()> {
        let removed = lock(&self.store)
            .list_mut(ListKey::of(collection))
            .items
            .remove(&id);
        if removed.is_none() {
            return Err(Error::record_not_found(format!("{collection} id={id}")));
        }
        self.record(Operation::Delete {
            list: collection.list_name().to_string(),
            id,
        });
        Ok(())
    }

    fn save_attachments(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        _files: FileOptions,
    ) -> Result<()> {
        let id = item_id(item)?;
        let Some(attachments) = &item.attachments else {
            return Ok(());
        };

        // Deferred content reads through this repository, so it is loaded
        // before the store is locked
        let loaded = attachments
            .iter()
            .map(|attachment| Ok((attachment.name.clone(), attachment.content.load()?)))
            .collect::<Result<Vec<_>>>()?;

        {
            let mut store = lock(&self.store);
            let stored = store
                .list_mut(ListKey::of(collection))
                .items
                .get_mut(&id)
                .ok_or_else(|| Error::record_not_found(format!("{collection} id={id}")))?;

            let saved = loaded
                .into_iter()
                .map(|(name, bytes)| {
                    // Content that was never loaded keeps the stored bytes
                    let bytes = bytes.unwrap_or_else(|| {
                        stored
                            .attachments
                            .iter()
                            .find(|(stored, _)| *stored == name)
                            .map(|(_, bytes)| bytes.clone())
                            .unwrap_or_default()
                    });
                    (name, bytes)
                })
                .collect();
            stored.attachments = saved;
        }

        self.record(Operation::SaveAttachments {
            list: collection.list_name().to_string(),
            id,
        });
        Ok(())
    }

    fn save_file(
        &self,
        collection: &CollectionHandle,
        item: &DataItem,
        _files: FileOptions,
    ) -> Result<()> {
        let id = item_id(item)?;
        let Some(file) = &item.file else {
            return Ok(());
        };

        let loaded = file.content.load()?;

        {
            let mut store = lock(&self.store);
            let stored = store
                .list_mut(ListKey::of(collection))
                .items
                .get_mut(&id)
                .ok_or_else(|| Error::record_not_found(format!("{collection} id={id}")))?;

            let bytes = match loaded {
                Some(bytes) => bytes,
                None => stored.file.take().map(|(_, bytes)| bytes).unwrap_or_default(),
            };
            stored.fields.insert(FILE_LEAF_REF.to_string(), file.name.clone().into());
            stored.file = Some((file.name.clone(), bytes));
        }

        self.record(Operation::SaveFile {
            list: collection.list_name().to_string(),
            id,
        });
        Ok(())
    }

    fn is_indexed(&self, collection: &CollectionHandle, field: &str) -> Result<bool> {
        let store = lock(&self.store);
        Ok(store
            .list(&ListKey::of(collection))
            .map_or(true, |list| list.is_indexed(field)))
    }
}

fn item_id(item: &DataItem) -> Result<i32> {
    item.id
        .ok_or_else(|| Error::invalid_operation("the item has no id; create it first"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
