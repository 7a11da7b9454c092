mod args;
pub use args::{AdapterArgs, ComparisonArgs, MethodCallArgs};

mod compare;
pub use compare::{compare_field, include_item};

mod content;
pub use content::{BinaryContent, ContentShape, LazyContent, StreamContent};

mod default;
pub use default::DefaultAdapter;

mod choice;
pub use choice::{Choice, EnumAdapter, EnumMapping, EnumStrategy};

mod external;
pub use external::ExternalAdapter;

mod field_type;
pub use field_type::FieldType;

mod generic;
pub use generic::GenericAdapter;

mod lookup;
pub use lookup::{
    LookupIdAdapter, LookupKind, LookupMultiAdapter, LookupMultiIdAdapter, LookupPairAdapter,
    LookupTextAdapter,
};

mod value_object;
pub use value_object::{ValueObjectAdapter, ValueObjectListAdapter};

use crate::{FieldRole, FieldValue, Filter, Result};

/// Converts between the native value of a field and the typed value of one
/// property.
///
/// Every registered accessor owns its adapter. An adapter may provide
/// translation hooks through [`comparison`](Adapter::comparison) and
/// [`method_call`](Adapter::method_call); without them the translator
/// compares the converted native value directly and rejects method calls.
pub trait Adapter<P>: Send + Sync + 'static {
    fn to_property(&self, args: &AdapterArgs<'_>, value: FieldValue) -> Result<P>;

    fn to_field(&self, args: &AdapterArgs<'_>, value: &P) -> Result<FieldValue>;

    /// Whether the property is written back to the store.
    fn supports_update(&self) -> bool {
        true
    }

    /// Whether [`to_field`](Adapter::to_field) converts values at all.
    /// Properties the store never updates still serialize inside value
    /// objects when it does.
    fn has_conversion(&self) -> bool {
        true
    }

    /// The part of the field this adapter exposes.
    fn role(&self) -> FieldRole {
        FieldRole::Value
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<P>> {
        None
    }

    fn method_call(&self) -> Option<&dyn EvalMethodCall> {
        None
    }
}

/// Translates `property <op> constant` for properties whose native
/// comparison differs from comparing the converted value.
pub trait EvalComparison<P>: Send + Sync {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, P>) -> Result<Filter>;
}

/// Translates a method call such as `contains` on a property.
pub trait EvalMethodCall: Send + Sync {
    fn eval_method_call(&self, args: &MethodCallArgs<'_>) -> Result<Filter>;
}
