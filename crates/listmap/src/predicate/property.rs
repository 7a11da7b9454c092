use super::{BinaryOp, Constant, Expr, ExprCompare, ExprIsNull, ExprMethod, Method, Predicate};
use crate::Property;

use std::fmt::Debug;

impl<T, P> Property<T, P>
where
    P: Debug + Send + Sync + 'static,
{
    fn compare(self, op: BinaryOp, value: P) -> Predicate<T> {
        Predicate::from_expr(Expr::Compare(ExprCompare {
            property: self.name(),
            op,
            constant: Constant::new(value),
        }))
    }

    pub fn eq(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Eq, value.into())
    }

    pub fn ne(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Ne, value.into())
    }

    pub fn gt(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Gt, value.into())
    }

    pub fn ge(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Ge, value.into())
    }

    pub fn lt(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Lt, value.into())
    }

    pub fn le(self, value: impl Into<P>) -> Predicate<T> {
        self.compare(BinaryOp::Le, value.into())
    }

    /// Matches items whose field holds no value.
    pub fn is_null(self) -> Predicate<T> {
        Predicate::from_expr(Expr::IsNull(ExprIsNull {
            property: self.name(),
            negated: false,
        }))
    }

    pub fn is_not_null(self) -> Predicate<T> {
        Predicate::from_expr(Expr::IsNull(ExprIsNull {
            property: self.name(),
            negated: true,
        }))
    }

    fn method(self, method: Method, argument: Constant) -> Predicate<T> {
        Predicate::from_expr(Expr::Method(ExprMethod {
            property: self.name(),
            method,
            argument,
        }))
    }
}

impl<T> Property<T, String> {
    pub fn contains(self, pattern: impl Into<String>) -> Predicate<T> {
        self.method(Method::Contains, Constant::new(pattern.into()))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Predicate<T> {
        self.method(Method::StartsWith, Constant::new(prefix.into()))
    }
}

impl<T> Property<T, Option<String>> {
    pub fn contains(self, pattern: impl Into<String>) -> Predicate<T> {
        self.method(Method::Contains, Constant::new(pattern.into()))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Predicate<T> {
        self.method(Method::StartsWith, Constant::new(prefix.into()))
    }
}

impl<T, E> Property<T, Vec<E>>
where
    E: Debug + Send + Sync + 'static,
{
    /// Matches items whose multi-valued field holds `item`.
    pub fn includes(self, item: impl Into<E>) -> Predicate<T> {
        self.method(Method::Includes, Constant::new(item.into()))
    }
}
