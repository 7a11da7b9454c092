use crate::Result;

use std::{fmt, sync::Arc};

/// What to load for attachments or the primary file of an item.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Do not load anything
    #[default]
    Skip,

    /// Load names only
    Names,

    /// Load names and content
    Content,

    /// Load names; content is fetched when first read
    Deferred,
}

impl FetchMode {
    pub fn is_skip(self) -> bool {
        matches!(self, Self::Skip)
    }
}

/// File loading options of a repository call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FileOptions {
    pub attachments: FetchMode,
    pub file: FetchMode,
}

impl FileOptions {
    pub const NONE: FileOptions = FileOptions {
        attachments: FetchMode::Skip,
        file: FetchMode::Skip,
    };
}

/// Binary content of an attachment or file.
#[derive(Clone, Default)]
pub enum Content {
    /// Content was not requested
    #[default]
    None,

    Bytes(Vec<u8>),

    /// Content is read from the store when `load` is called
    Deferred(Arc<dyn Fn() -> Result<Vec<u8>> + Send + Sync>),
}

impl Content {
    pub fn deferred(f: impl Fn() -> Result<Vec<u8>> + Send + Sync + 'static) -> Self {
        Self::Deferred(Arc::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the bytes, reading them from the store if deferred.
    pub fn load(&self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::None => Ok(None),
            Self::Bytes(bytes) => Ok(Some(bytes.clone())),
            Self::Deferred(f) => f().map(Some),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub content: Content,
}

impl Attachment {
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Content::None,
        }
    }

    pub fn with_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: Content::Bytes(bytes),
        }
    }
}

/// The primary file of a document library item.
#[derive(Debug, Clone)]
pub struct FileData {
    pub name: String,
    pub content: Content,
}
