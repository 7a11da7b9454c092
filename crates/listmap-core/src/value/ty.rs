use std::fmt;

/// Native type tag attached to a value in a filter comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Choice,
    Counter,
    DateTime,
    Guid,
    Integer,
    Lookup,
    MultiChoice,
    Number,
    Text,
    User,
}

impl ValueType {
    /// Name used for the `Type` attribute of a native `Value` element.
    pub fn as_str(self) -> &'static str {
        use ValueType::*;

        match self {
            Boolean => "Boolean",
            Choice => "Choice",
            Counter => "Counter",
            DateTime => "DateTime",
            Guid => "Guid",
            Integer => "Integer",
            Lookup => "Lookup",
            MultiChoice => "MultiChoice",
            Number => "Number",
            Text => "Text",
            User => "User",
        }
    }

    pub fn is_lookup_like(self) -> bool {
        matches!(self, Self::Lookup | Self::User)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
