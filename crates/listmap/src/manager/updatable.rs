use crate::{CollectionHandle, DataItem};

use std::ops::{Deref, DerefMut};

/// A fetched entity together with the data item and collection it was read
/// from.
///
/// Updating through an `Updatable` writes back into the same item, so
/// fields the entity does not map keep their stored values.
#[derive(Debug, Clone)]
pub struct Updatable<T> {
    entity: T,
    item: DataItem,
    collection: CollectionHandle,
}

impl<T> Updatable<T> {
    pub(crate) fn new(entity: T, item: DataItem, collection: CollectionHandle) -> Self {
        Self {
            entity,
            item,
            collection,
        }
    }

    /// Built-in id of the underlying item.
    pub fn id(&self) -> Option<i32> {
        self.item.id
    }

    pub fn data_item(&self) -> &DataItem {
        &self.item
    }

    pub fn collection(&self) -> &CollectionHandle {
        &self.collection
    }

    pub fn into_inner(self) -> T {
        self.entity
    }

    pub(crate) fn parts(&mut self) -> (&mut T, &mut DataItem, &CollectionHandle) {
        (&mut self.entity, &mut self.item, &self.collection)
    }
}

impl<T> Deref for Updatable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

impl<T> DerefMut for Updatable<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.entity
    }
}
