use super::{compare::compare_field, Adapter, AdapterArgs, ComparisonArgs, EvalComparison};
use crate::{filter::FieldRef, Error, FieldValue, Filter, Result};

use std::fmt;

type ToProperty<P> = Box<dyn Fn(FieldValue) -> Result<P> + Send + Sync>;
type ToField<P> = Box<dyn Fn(&P) -> Result<FieldValue> + Send + Sync>;

/// An adapter built from closures.
///
/// The property is written back only when a `to_field` closure is given.
///
/// ```
/// # use listmap::{adapter::GenericAdapter, Adapter, FieldValue};
/// let read_only = GenericAdapter::new(|value: FieldValue| Ok(value.to_string().len()));
/// assert!(!read_only.supports_update());
///
/// let adapter = read_only.to_field(|len: &usize| Ok(FieldValue::Integer(*len as i64)));
/// assert!(adapter.supports_update());
/// ```
pub struct GenericAdapter<P> {
    to_property: ToProperty<P>,
    to_field: Option<ToField<P>>,
    local: bool,
}

impl<P: 'static> GenericAdapter<P> {
    pub fn new(to_property: impl Fn(FieldValue) -> Result<P> + Send + Sync + 'static) -> Self {
        Self {
            to_property: Box::new(to_property),
            to_field: None,
            local: false,
        }
    }

    pub fn to_field(
        mut self,
        to_field: impl Fn(&P) -> Result<FieldValue> + Send + Sync + 'static,
    ) -> Self {
        self.to_field = Some(Box::new(to_field));
        self
    }

    /// Comparisons on the property are evaluated in memory, after the
    /// store returns its items.
    pub fn evaluate_locally(mut self) -> Self {
        self.local = true;
        self
    }

    fn convert(&self, args: &AdapterArgs<'_>, value: &P) -> Result<FieldValue> {
        match &self.to_field {
            Some(to_field) => to_field(value),
            None => Err(Error::invalid_operation(format!(
                "`{}::{}` has no conversion to a field value",
                args.entity, args.property
            ))),
        }
    }
}

impl<P: 'static> Adapter<P> for GenericAdapter<P> {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<P> {
        (self.to_property)(value)
    }

    fn to_field(&self, args: &AdapterArgs<'_>, value: &P) -> Result<FieldValue> {
        self.convert(args, value)
    }

    fn supports_update(&self) -> bool {
        self.to_field.is_some()
    }

    fn has_conversion(&self) -> bool {
        self.to_field.is_some()
    }

    fn comparison(&self) -> Option<&dyn EvalComparison<P>> {
        if self.local {
            Some(self)
        } else {
            None
        }
    }
}

impl<P: 'static> EvalComparison<P> for GenericAdapter<P> {
    fn eval_comparison(&self, args: &ComparisonArgs<'_, P>) -> Result<Filter> {
        let value = self.convert(&args.args, args.value).map_err(|err| {
            err.context(Error::unsupported_predicate(format!(
                "`{}::{}` cannot be compared",
                args.args.entity, args.args.property
            )))
        })?;
        let filter = compare_field(FieldRef::new(args.args.field), args.op, None, value)?;
        Ok(Filter::local(filter))
    }
}

impl<P> fmt::Debug for GenericAdapter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericAdapter")
            .field("to_field", &self.to_field.is_some())
            .field("local", &self.local)
            .finish()
    }
}
