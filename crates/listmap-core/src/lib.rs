mod error;
pub use error::{Error, IntoError};

pub mod caml;

pub mod filter;
pub use filter::{Filter, Query};

pub mod repository;
pub use repository::{CollectionHandle, DataItem, Repository};

pub mod value;
pub use value::{FieldValue, LookupValue, ValueType};

/// Name of a field as known to the record store.
pub type FieldName = String;

/// A Result type alias that uses listmap's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
