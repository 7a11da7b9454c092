mod binding;
pub(crate) use binding::{AttachmentsBinding, Binding, Bound, FileBinding, IdBinding};

use crate::{
    adapter::AdapterArgs,
    predicate::{BinaryOp, Constant, Method},
    CollectionHandle, DataItem, Error, FieldName, Filter, Parameters, Result,
};

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Stable identity of a registered accessor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessorId(u64);

impl AccessorId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The part of a native field an accessor reads and writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// The whole field
    Value,

    /// Identifier of the entity
    Identifier,

    /// Id part of a lookup or user field
    LookupId,

    /// Display text of a lookup or user field
    LookupValue,

    /// Id and text of a lookup or user field
    LookupPair,

    /// Key of an external-data field
    ExternalId,

    /// Display value of an external-data field
    ExternalValue,

    Attachments,

    File,
}

/// Call state an accessor hands to its adapter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) parameters: &'a Parameters,
    pub(crate) collection: Option<&'a CollectionHandle>,
}

impl<'a> From<&AdapterArgs<'a>> for Scope<'a> {
    fn from(args: &AdapterArgs<'a>) -> Self {
        Self {
            parameters: args.parameters,
            collection: args.collection,
        }
    }
}

/// Reads and writes one mapped property of `T`.
///
/// The access path is monomorphized when the property is registered, so a
/// read or write costs one dynamic call.
pub struct PropertyAccessor<T> {
    id: AccessorId,
    property: &'static str,
    declaring_type: &'static str,
    field: FieldName,
    role: FieldRole,
    supports_update: bool,
    binding: Box<dyn Binding<T>>,
}

impl<T: 'static> PropertyAccessor<T> {
    pub(crate) fn new(
        property: &'static str,
        declaring_type: &'static str,
        field: FieldName,
        role: FieldRole,
        supports_update: bool,
        binding: Box<dyn Binding<T>>,
    ) -> Self {
        Self {
            id: AccessorId::next(),
            property,
            declaring_type,
            field,
            role,
            supports_update,
            binding,
        }
    }

    pub fn id(&self) -> AccessorId {
        self.id
    }

    pub fn property(&self) -> &'static str {
        self.property
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn supports_update(&self) -> bool {
        self.supports_update
    }

    pub(crate) fn has_conversion(&self) -> bool {
        self.binding.has_conversion()
    }

    pub(crate) fn set_supports_update(&mut self, supports_update: bool) {
        self.supports_update = supports_update;
    }

    fn args<'a>(&'a self, scope: Scope<'a>) -> AdapterArgs<'a> {
        AdapterArgs {
            entity: self.declaring_type,
            property: self.property,
            field: &self.field,
            parameters: scope.parameters,
            collection: scope.collection,
        }
    }

    fn conversion(&self) -> Error {
        Error::conversion(self.declaring_type, self.property, self.field.clone())
    }

    /// Sets the property of `entity` from `item`.
    pub(crate) fn read(&self, scope: Scope<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        self.binding
            .read(&self.args(scope), item, entity)
            .map_err(|err| err.context(self.conversion()))
    }

    /// Writes the property of `entity` into `item`, merging with what other
    /// accessors of the same field already wrote.
    pub(crate) fn write(&self, scope: Scope<'_>, entity: &T, item: &mut DataItem) -> Result<()> {
        self.binding
            .write(&self.args(scope), entity, item)
            .map_err(|err| err.context(self.conversion()))
    }

    pub(crate) fn compare(&self, scope: Scope<'_>, op: BinaryOp, constant: &Constant) -> Result<Filter> {
        self.binding.compare(&self.args(scope), op, constant)
    }

    pub(crate) fn is_null(&self, negated: bool) -> Result<Filter> {
        self.binding.is_null(&self.field, negated)
    }

    pub(crate) fn method_call(
        &self,
        scope: Scope<'_>,
        method: Method,
        argument: &Constant,
    ) -> Result<Filter> {
        self.binding.method_call(&self.args(scope), method, argument)
    }
}

impl<T> fmt::Debug for PropertyAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("id", &self.id)
            .field("property", &format_args!("{}::{}", self.declaring_type, self.property))
            .field("field", &self.field)
            .field("role", &self.role)
            .field("supports_update", &self.supports_update)
            .finish()
    }
}
