use std::fmt;

/// Comparison operator of a native filter leaf.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Geq,
    Lt,
    Leq,
    IsNull,
    IsNotNull,
    Contains,
    BeginsWith,
    /// The multi-valued field holds the value
    Includes,
    /// The multi-valued field does not hold the value
    NotIncludes,
    /// The field equals one of a list of values
    In,
}

impl CompareOp {
    /// Operators that take no value.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// The operator matching exactly the items this one rejects, if the
    /// store has one.
    ///
    /// Relational operators negate under the store's null semantics: a null
    /// field fails both `Gt` and `Leq`, so `Not(Gt)` only becomes `Leq` for
    /// non-null fields. The translator accounts for that.
    pub fn negate(self) -> Option<Self> {
        use CompareOp::*;

        Some(match self {
            Eq => Neq,
            Neq => Eq,
            Gt => Leq,
            Geq => Lt,
            Lt => Geq,
            Leq => Gt,
            IsNull => IsNotNull,
            IsNotNull => IsNull,
            Includes => NotIncludes,
            NotIncludes => Includes,
            Contains | BeginsWith | In => return None,
        })
    }

    pub fn is_relational(self) -> bool {
        matches!(self, Self::Gt | Self::Geq | Self::Lt | Self::Leq)
    }

    /// Element name used by the native query dialect.
    pub fn as_str(self) -> &'static str {
        use CompareOp::*;

        match self {
            Eq => "Eq",
            Neq => "Neq",
            Gt => "Gt",
            Geq => "Geq",
            Lt => "Lt",
            Leq => "Leq",
            IsNull => "IsNull",
            IsNotNull => "IsNotNull",
            Contains => "Contains",
            BeginsWith => "BeginsWith",
            Includes => "Includes",
            NotIncludes => "NotIncludes",
            In => "In",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
