use std::fmt;

/// Identifies the collection an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionHandle {
    /// A list, addressed by its title
    List { name: String },

    /// The items of one folder of a list
    Folder { list: String, path: String },

    /// A list of another site
    Web { url: String, list: String },
}

impl CollectionHandle {
    pub fn list(name: impl Into<String>) -> Self {
        Self::List { name: name.into() }
    }

    pub fn folder(list: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Folder {
            list: list.into(),
            path: path.into(),
        }
    }

    pub fn web(url: impl Into<String>, list: impl Into<String>) -> Self {
        Self::Web {
            url: url.into(),
            list: list.into(),
        }
    }

    /// Title of the list holding the items.
    pub fn list_name(&self) -> &str {
        match self {
            Self::List { name } => name,
            Self::Folder { list, .. } | Self::Web { list, .. } => list,
        }
    }

    /// Folder path inside the list, if the handle is scoped to one.
    pub fn folder_path(&self) -> Option<&str> {
        match self {
            Self::Folder { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List { name } => write!(f, "list={name}"),
            Self::Folder { list, path } => write!(f, "list={list} folder={path}"),
            Self::Web { url, list } => write!(f, "web={url} list={list}"),
        }
    }
}
