mod accessor;
pub use accessor::{AccessorId, FieldRole, PropertyAccessor};

pub mod adapter;
pub use adapter::Adapter;

mod context;
pub use context::{FileInclusion, OperationContext, Parameters};

mod entity;
pub use entity::Entity;

pub mod map;
pub use map::{EntityMap, EntityMapBuilder, Registry};

pub mod manager;
pub use manager::{BatchResult, Hook, Manager, Page, PageRequest, Updatable};

pub mod predicate;
pub use predicate::Predicate;

mod property;
pub use property::Property;

pub mod translate;
pub use translate::{translate, QueryPlan};

pub use listmap_core::{
    bail, caml, err, filter, repository, value, CollectionHandle, DataItem, Error, FieldName,
    FieldValue, Filter, LookupValue, Query, Repository, Result, ValueType,
};
