use super::{Escape, Formatter, ToCaml};
use crate::filter::{Comparison, FieldRef, Filter, Operand};

impl ToCaml for &Filter {
    fn to_caml(self, f: &mut Formatter<'_>) {
        match self {
            Filter::And(operands) => group(f, "And", operands),
            Filter::Or(operands) => group(f, "Or", operands),
            Filter::Compare(cmp) => fmt!(f, cmp),
            Filter::Local(inner) => f.fail(crate::err!(
                "filter on {:?} must be evaluated locally and cannot be sent to the store",
                inner.field_names()
            )),
        }
    }
}

/// The dialect's `And`/`Or` take exactly two operands; longer groups nest to
/// the right.
fn group(f: &mut Formatter<'_>, name: &str, operands: &[Filter]) {
    match operands {
        [] => f.fail(crate::err!("empty `{name}` group")),
        [single] => fmt!(f, single),
        [first, rest @ ..] => {
            fmt!(f, "<" name ">" first);
            group(f, name, rest);
            fmt!(f, "</" name ">");
        }
    }
}

impl ToCaml for &Comparison {
    fn to_caml(self, f: &mut Formatter<'_>) {
        let op = self.op.as_str();
        let field = &self.field;

        fmt!(f, "<" op ">" field);

        match &self.operand {
            Operand::None => {}
            Operand::Value(value) => value.to_caml(f),
            Operand::List(ty, values) => {
                fmt!(f, "<Values>");
                for value in values {
                    super::value::value_element(f, *ty, value, self.field.lookup_id);
                }
                fmt!(f, "</Values>");
            }
        }

        fmt!(f, "</" op ">");
    }
}

impl ToCaml for &FieldRef {
    fn to_caml(self, f: &mut Formatter<'_>) {
        fmt!(f, "<FieldRef Name='" Escape(&self.name) "'");
        if self.lookup_id {
            fmt!(f, " LookupId='TRUE'");
        }
        fmt!(f, " />");
    }
}
