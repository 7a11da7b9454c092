use crate::{
    predicate::{BinaryOp, Constant, Method},
    CollectionHandle, Parameters,
};

/// Per-call arguments handed to an adapter.
#[derive(Debug, Clone, Copy)]
pub struct AdapterArgs<'a> {
    /// Name of the entity type declaring the property
    pub entity: &'static str,

    pub property: &'static str,

    /// Native field the property is mapped to
    pub field: &'a str,

    pub parameters: &'a Parameters,

    /// Target collection. `None` while translating a predicate.
    pub collection: Option<&'a CollectionHandle>,
}

#[derive(Debug)]
pub struct ComparisonArgs<'a, P> {
    pub args: AdapterArgs<'a>,
    pub op: BinaryOp,
    pub value: &'a P,
}

#[derive(Debug)]
pub struct MethodCallArgs<'a> {
    pub args: AdapterArgs<'a>,
    pub method: Method,
    pub argument: &'a Constant,
}

impl MethodCallArgs<'_> {
    /// Returns the argument as `A`, failing when the call was built with a
    /// different argument type.
    pub fn argument<A: 'static>(&self) -> crate::Result<&A> {
        self.argument.downcast_ref().ok_or_else(|| {
            crate::Error::unsupported_predicate(format!(
                "`{}::{}.{}({:?})` has an argument of an unexpected type",
                self.args.entity,
                self.args.property,
                self.method,
                self.argument,
            ))
        })
    }
}
