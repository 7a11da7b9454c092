use super::{
    compare::include_item, Adapter, AdapterArgs, EvalMethodCall, FieldType, MethodCallArgs,
};
use crate::{
    filter::{CompareOp, Comparison, FieldRef, TypedValue},
    predicate::Method,
    Error, FieldValue, Filter, Result, ValueType,
};

use std::marker::PhantomData;

/// Passes the value through, converting with the property type's
/// [`FieldType`] implementation.
pub struct DefaultAdapter<P> {
    _p: PhantomData<fn() -> P>,
}

impl<P> DefaultAdapter<P> {
    pub fn new() -> Self {
        Self { _p: PhantomData }
    }
}

impl<P> Default for DefaultAdapter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FieldType> Adapter<P> for DefaultAdapter<P> {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<P> {
        P::from_field(value)
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &P) -> Result<FieldValue> {
        Ok(value.to_field())
    }

    fn method_call(&self) -> Option<&dyn EvalMethodCall> {
        Some(self)
    }
}

impl<P: FieldType> EvalMethodCall for DefaultAdapter<P> {
    fn eval_method_call(&self, args: &MethodCallArgs<'_>) -> Result<Filter> {
        let field = FieldRef::new(args.args.field);

        match (args.method, P::VALUE_TYPE) {
            (Method::Contains, ValueType::Text) => {
                let pattern = args.argument::<String>()?;
                Ok(text_method(CompareOp::Contains, field, pattern))
            }
            (Method::StartsWith, ValueType::Text) => {
                let prefix = args.argument::<String>()?;
                Ok(text_method(CompareOp::BeginsWith, field, prefix))
            }
            (Method::Includes, ValueType::MultiChoice) => {
                let item = args.argument::<String>()?;
                include_item(field, ValueType::MultiChoice, FieldValue::Text(item.clone()))
            }
            (method, ty) => Err(Error::unsupported_predicate(format!(
                "`{}::{}.{method}()` is not supported for a {ty} field",
                args.args.entity, args.args.property
            ))),
        }
    }
}

pub(super) fn text_method(op: CompareOp, field: FieldRef, text: &str) -> Filter {
    Comparison::new(op, field, TypedValue::text(text)).into()
}
