mod constant;
pub use constant::Constant;

mod expr;
pub use expr::{BinaryOp, Expr, ExprCompare, ExprIsNull, ExprMethod, Method};

mod property;

use std::{fmt, marker::PhantomData, ops};

/// A boolean expression over the properties of entity `T`.
///
/// Predicates are built from [`Property`](crate::Property) comparisons and
/// combined with [`and`](Self::and), [`or`](Self::or) and `!`. They are
/// translated into a native filter by the manager before any item is read.
pub struct Predicate<T> {
    pub(crate) expr: Expr,
    _p: PhantomData<fn(&T)>,
}

impl<T> Predicate<T> {
    pub(crate) fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _p: PhantomData,
        }
    }

    /// A predicate matching every item.
    pub fn always() -> Self {
        Self::from_expr(Expr::Value(true))
    }

    /// A predicate matching no item.
    pub fn never() -> Self {
        Self::from_expr(Expr::Value(false))
    }

    pub fn and(self, rhs: Predicate<T>) -> Self {
        Self::from_expr(Expr::and(self.expr, rhs.expr))
    }

    pub fn or(self, rhs: Predicate<T>) -> Self {
        Self::from_expr(Expr::or(self.expr, rhs.expr))
    }

    /// All of `predicates` must match. An empty set matches every item.
    pub fn all(predicates: impl IntoIterator<Item = Predicate<T>>) -> Self {
        predicates
            .into_iter()
            .reduce(Predicate::and)
            .unwrap_or_else(Self::always)
    }

    /// One of `predicates` must match. An empty set matches no item.
    pub fn any(predicates: impl IntoIterator<Item = Predicate<T>>) -> Self {
        predicates
            .into_iter()
            .reduce(Predicate::or)
            .unwrap_or_else(Self::never)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl<T> ops::Not for Predicate<T> {
    type Output = Predicate<T>;

    fn not(self) -> Self::Output {
        Self::from_expr(Expr::Not(Box::new(self.expr)))
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}
