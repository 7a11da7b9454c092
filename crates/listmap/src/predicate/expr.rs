use super::Constant;

use std::fmt;

/// Untyped predicate tree.
#[derive(Clone)]
pub enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Compare(ExprCompare),
    IsNull(ExprIsNull),
    Method(ExprMethod),
    Value(bool),
}

/// `property <op> constant`
#[derive(Clone)]
pub struct ExprCompare {
    pub property: &'static str,
    pub op: BinaryOp,
    pub constant: Constant,
}

#[derive(Clone)]
pub struct ExprIsNull {
    pub property: &'static str,
    pub negated: bool,
}

/// `property.method(argument)`
#[derive(Clone)]
pub struct ExprMethod {
    pub property: &'static str,
    pub method: Method,
    pub argument: Constant,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Contains,
    StartsWith,
    Includes,
}

impl Expr {
    pub fn and(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::And(mut lhs), Expr::And(rhs)) => {
                lhs.extend(rhs);
                Expr::And(lhs)
            }
            (Expr::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Expr::And(lhs)
            }
            (lhs, Expr::And(mut rhs)) => {
                rhs.insert(0, lhs);
                Expr::And(rhs)
            }
            (lhs, rhs) => Expr::And(vec![lhs, rhs]),
        }
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Or(mut lhs), Expr::Or(rhs)) => {
                lhs.extend(rhs);
                Expr::Or(lhs)
            }
            (Expr::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                Expr::Or(lhs)
            }
            (lhs, Expr::Or(mut rhs)) => {
                rhs.insert(0, lhs);
                Expr::Or(rhs)
            }
            (lhs, rhs) => Expr::Or(vec![lhs, rhs]),
        }
    }
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    pub fn is_eq(self) -> bool {
        matches!(self, Self::Eq)
    }

    pub fn is_ne(self) -> bool {
        matches!(self, Self::Ne)
    }

    pub fn is_relational(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::Includes => "includes",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And(operands) => list(f, operands, " && "),
            Expr::Or(operands) => list(f, operands, " || "),
            Expr::Not(expr) => write!(f, "!({expr:?})"),
            Expr::Compare(cmp) => cmp.fmt(f),
            Expr::IsNull(e) => e.fmt(f),
            Expr::Method(e) => e.fmt(f),
            Expr::Value(v) => write!(f, "{v}"),
        }
    }
}

fn list(f: &mut fmt::Formatter<'_>, operands: &[Expr], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{operand:?}")?;
    }
    f.write_str(")")
}

impl fmt::Debug for ExprCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.property, self.op, self.constant)
    }
}

impl fmt::Debug for ExprIsNull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.negated { "!=" } else { "==" };
        write!(f, "{} {op} null", self.property)
    }
}

impl fmt::Debug for ExprMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({:?})", self.property, self.method, self.argument)
    }
}
