use listmap_core::{
    filter::{eval, OrderBy, ID_FIELD},
    repository::{Attachment, Content, FetchMode, FileData},
    CollectionHandle, DataItem, FieldName, FieldValue, Filter, Result,
};

use indexmap::IndexMap;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, HashSet},
};

/// Name of the field holding the file name of a document or folder.
pub(crate) const FILE_LEAF_REF: &str = "FileLeafRef";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ListKey {
    web: Option<String>,
    list: String,
}

impl ListKey {
    pub(crate) fn of(collection: &CollectionHandle) -> Self {
        match collection {
            CollectionHandle::Web { url, list } => Self {
                web: Some(url.clone()),
                list: list.clone(),
            },
            other => Self {
                web: None,
                list: other.list_name().to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) lists: HashMap<ListKey, List>,
}

#[derive(Debug, Default)]
pub(crate) struct List {
    pub(crate) items: BTreeMap<i32, StoredItem>,
    pub(crate) next_id: i32,
    pub(crate) indexed: HashSet<FieldName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Item,
    Folder,
    Document,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredItem {
    pub(crate) kind: Kind,
    pub(crate) folder: Option<String>,
    pub(crate) fields: IndexMap<FieldName, FieldValue>,
    pub(crate) attachments: Vec<(String, Vec<u8>)>,
    pub(crate) file: Option<(String, Vec<u8>)>,
    pub(crate) version: u32,
}

impl Store {
    pub(crate) fn list(&self, key: &ListKey) -> Option<&List> {
        self.lists.get(key)
    }

    pub(crate) fn list_mut(&mut self, key: ListKey) -> &mut List {
        self.lists.entry(key).or_default()
    }
}

impl List {
    pub(crate) fn insert(&mut self, kind: Kind, folder: Option<&str>, item: &DataItem) -> i32 {
        self.next_id += 1;
        let id = self.next_id;

        let mut stored = StoredItem {
            kind,
            folder: folder.map(str::to_string),
            fields: IndexMap::new(),
            attachments: vec![],
            file: None,
            version: 1,
        };
        stored.apply(item);
        self.items.insert(id, stored);
        id
    }

    /// Items visible through `collection`, in id order.
    pub(crate) fn visible<'a>(
        &'a self,
        collection: &'a CollectionHandle,
    ) -> impl Iterator<Item = (i32, &'a StoredItem)> + 'a {
        self.items
            .iter()
            .filter(move |(_, item)| match collection.folder_path() {
                Some(path) => item.folder.as_deref() == Some(path),
                None => true,
            })
            .map(|(id, item)| (*id, item))
    }

    pub(crate) fn is_indexed(&self, field: &str) -> bool {
        self.indexed.is_empty() || self.indexed.contains(field)
    }
}

impl StoredItem {
    /// Writes the fields of `item`. Null removes a field.
    pub(crate) fn apply(&mut self, item: &DataItem) {
        for (name, value) in &item.fields {
            if name == ID_FIELD {
                continue;
            }
            if value.is_null() {
                self.fields.shift_remove(name);
            } else {
                self.fields.insert(name.clone(), value.clone());
            }
        }
    }

    /// The whole item, for filter evaluation.
    pub(crate) fn full(&self, id: i32) -> DataItem {
        DataItem {
            id: Some(id),
            fields: self.fields.clone(),
            attachments: None,
            file: None,
        }
    }

    /// The item projected onto `fields`. Requested fields the item does not
    /// hold are null.
    pub(crate) fn project(&self, id: i32, fields: &[FieldName]) -> DataItem {
        let mut item = DataItem::for_fields(fields).with_id(id);
        for field in fields {
            if field == ID_FIELD {
                item.set(field.clone(), id);
            } else if let Some(value) = self.fields.get(field) {
                item.set(field.clone(), value.clone());
            }
        }
        item
    }

    pub(crate) fn matches(&self, id: i32, filter: Option<&Filter>) -> Result<bool> {
        match filter {
            Some(filter) => eval(filter, &self.full(id)),
            None => Ok(true),
        }
    }

    pub(crate) fn compare(&self, lhs_id: i32, other: &StoredItem, rhs_id: i32, order_by: &[OrderBy]) -> Ordering {
        for order in order_by {
            let ordering = if order.field == ID_FIELD {
                lhs_id.cmp(&rhs_id)
            } else {
                let lhs = self.fields.get(&order.field).cloned().unwrap_or_default();
                let rhs = other.fields.get(&order.field).cloned().unwrap_or_default();
                match (lhs.is_null(), rhs.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => lhs.store_cmp(&rhs).unwrap_or(Ordering::Equal),
                }
            };
            let ordering = if order.ascending { ordering } else { ordering.reverse() };
            if ordering.is_ne() {
                return ordering;
            }
        }
        lhs_id.cmp(&rhs_id)
    }
}

/// Builds the attachments of a returned item. `load` creates the deferred
/// reader of one attachment.
pub(crate) fn attachments(
    stored: &[(String, Vec<u8>)],
    mode: FetchMode,
    load: impl Fn(&str) -> Content,
) -> Option<Vec<Attachment>> {
    if mode.is_skip() {
        return None;
    }
    Some(
        stored
            .iter()
            .map(|(name, bytes)| Attachment {
                name: name.clone(),
                content: content(bytes, mode, || load(name)),
            })
            .collect(),
    )
}

pub(crate) fn file(
    stored: Option<&(String, Vec<u8>)>,
    mode: FetchMode,
    load: impl FnOnce() -> Content,
) -> Option<FileData> {
    if mode.is_skip() {
        return None;
    }
    let (name, bytes) = stored?;
    Some(FileData {
        name: name.clone(),
        content: content(bytes, mode, load),
    })
}

fn content(bytes: &[u8], mode: FetchMode, load: impl FnOnce() -> Content) -> Content {
    match mode {
        FetchMode::Skip | FetchMode::Names => Content::None,
        FetchMode::Content => Content::Bytes(bytes.to_vec()),
        FetchMode::Deferred => load(),
    }
}
