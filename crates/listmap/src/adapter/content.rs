use crate::{
    repository::{Content, FetchMode},
    Error, Result,
};

use std::io::{self, Read};

/// Shape of a mapped attachment or primary file.
///
/// The shape is fixed per entity type and decides what the store loads:
/// names only, the content up front, or the content on first use. Implement
/// the trait for a custom shape.
pub trait ContentShape: Sized + Send + Sync + 'static {
    const FETCH: FetchMode;

    /// Whether the content is saved back on create and update.
    const UPDATABLE: bool;

    fn from_content(name: String, content: Content) -> Result<Self>;

    fn to_content(&self) -> Result<(String, Content)>;
}

/// Name only.
impl ContentShape for String {
    const FETCH: FetchMode = FetchMode::Names;
    const UPDATABLE: bool = false;

    fn from_content(name: String, _content: Content) -> Result<Self> {
        Ok(name)
    }

    fn to_content(&self) -> Result<(String, Content)> {
        Ok((self.clone(), Content::None))
    }
}

/// Name and content, loaded with the item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryContent {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl BinaryContent {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl ContentShape for BinaryContent {
    const FETCH: FetchMode = FetchMode::Content;
    const UPDATABLE: bool = true;

    fn from_content(name: String, content: Content) -> Result<Self> {
        let bytes = content.load()?.unwrap_or_default();
        Ok(Self { name, bytes })
    }

    fn to_content(&self) -> Result<(String, Content)> {
        Ok((self.name.clone(), Content::Bytes(self.bytes.clone())))
    }
}

/// Name and content, read from the store the first time it is loaded.
#[derive(Debug, Clone)]
pub struct LazyContent {
    pub name: String,
    content: Content,
}

impl LazyContent {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: Content::Bytes(bytes.into()),
        }
    }

    pub fn from_fn(
        name: impl Into<String>,
        f: impl Fn() -> Result<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            content: Content::deferred(f),
        }
    }

    pub fn load(&self) -> Result<Vec<u8>> {
        Ok(self.content.load()?.unwrap_or_default())
    }
}

impl ContentShape for LazyContent {
    const FETCH: FetchMode = FetchMode::Deferred;
    const UPDATABLE: bool = true;

    fn from_content(name: String, content: Content) -> Result<Self> {
        Ok(Self { name, content })
    }

    fn to_content(&self) -> Result<(String, Content)> {
        Ok((self.name.clone(), self.content.clone()))
    }
}

/// Name and content, exposed as a reader opened on demand. Read-only.
#[derive(Debug, Clone)]
pub struct StreamContent {
    pub name: String,
    content: Content,
}

impl StreamContent {
    pub fn open(&self) -> Result<Box<dyn Read + Send>> {
        match self.content.load()? {
            Some(bytes) => Ok(Box::new(io::Cursor::new(bytes))),
            None => Err(Error::invalid_operation(format!(
                "content of `{}` was not loaded",
                self.name
            ))),
        }
    }
}

impl ContentShape for StreamContent {
    const FETCH: FetchMode = FetchMode::Deferred;
    const UPDATABLE: bool = false;

    fn from_content(name: String, content: Content) -> Result<Self> {
        Ok(Self { name, content })
    }

    fn to_content(&self) -> Result<(String, Content)> {
        Ok((self.name.clone(), self.content.clone()))
    }
}
