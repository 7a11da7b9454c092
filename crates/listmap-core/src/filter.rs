mod comparison;
pub use comparison::{Comparison, FieldRef, Operand, TypedValue};

mod eval;
pub use eval::eval;

mod op;
pub use op::CompareOp;

mod query;
pub use query::{OrderBy, Query, ID_FIELD};

use crate::FieldName;

/// A native filter: leaf comparisons against store fields combined with
/// `And`/`Or` groups.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// All operands must match
    And(Vec<Filter>),

    /// At least one operand must match
    Or(Vec<Filter>),

    /// A single comparison against a field
    Compare(Comparison),

    /// A filter the record store cannot evaluate. It is applied in memory to
    /// the items the store returns.
    Local(Box<Filter>),
}

impl Filter {
    pub fn and(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        let lhs = lhs.into();
        let rhs = rhs.into();

        match (lhs, rhs) {
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::And(lhs)
            }
            (lhs, Self::And(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::And(rhs)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }

    pub fn or(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        let lhs = lhs.into();
        let rhs = rhs.into();

        match (lhs, rhs) {
            (Self::Or(mut lhs), Self::Or(rhs)) => {
                lhs.extend(rhs);
                Self::Or(lhs)
            }
            (Self::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::Or(lhs)
            }
            (lhs, Self::Or(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::Or(rhs)
            }
            (lhs, rhs) => Self::Or(vec![lhs, rhs]),
        }
    }

    /// Joins `operands` with `And`. Returns `None` for an empty list.
    pub fn and_from_vec(operands: Vec<Filter>) -> Option<Self> {
        let mut operands = operands.into_iter();
        let first = operands.next()?;
        Some(operands.fold(first, Filter::and))
    }

    /// Joins `operands` with `Or`. Returns `None` for an empty list.
    pub fn or_from_vec(operands: Vec<Filter>) -> Option<Self> {
        let mut operands = operands.into_iter();
        let first = operands.next()?;
        Some(operands.fold(first, Filter::or))
    }

    pub fn local(filter: impl Into<Self>) -> Self {
        match filter.into() {
            local @ Self::Local(_) => local,
            filter => Self::Local(Box::new(filter)),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Returns `true` if any node of this filter must be evaluated in memory.
    pub fn has_local(&self) -> bool {
        match self {
            Self::And(operands) | Self::Or(operands) => operands.iter().any(Filter::has_local),
            Self::Compare(_) => false,
            Self::Local(_) => true,
        }
    }

    /// Returns a copy with every `Local` marker removed, for in-memory
    /// evaluation of the whole filter.
    pub fn without_local_markers(&self) -> Filter {
        match self {
            Self::And(operands) => {
                Self::And(operands.iter().map(Filter::without_local_markers).collect())
            }
            Self::Or(operands) => {
                Self::Or(operands.iter().map(Filter::without_local_markers).collect())
            }
            Self::Compare(cmp) => Self::Compare(cmp.clone()),
            Self::Local(inner) => inner.without_local_markers(),
        }
    }

    /// Names of every field this filter compares against, without duplicates,
    /// in first-use order.
    pub fn field_names(&self) -> Vec<FieldName> {
        let mut names = vec![];
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names(&self, names: &mut Vec<FieldName>) {
        match self {
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_field_names(names);
                }
            }
            Self::Compare(cmp) => {
                if !names.contains(&cmp.field.name) {
                    names.push(cmp.field.name.clone());
                }
            }
            Self::Local(inner) => inner.collect_field_names(names),
        }
    }
}

impl From<Comparison> for Filter {
    fn from(value: Comparison) -> Self {
        Self::Compare(value)
    }
}
