use super::Error;

/// Error when a predicate cannot be translated into a native filter.
///
/// This occurs when:
/// - A predicate references a property that is not mapped
/// - A method call has no translation for the property's adapter
/// - A negation has no native equivalent
///
/// Translation fails before any query is sent to the store.
#[derive(Debug)]
pub(super) struct UnsupportedPredicateError {
    message: Box<str>,
}

impl std::error::Error for UnsupportedPredicateError {}

impl core::fmt::Display for UnsupportedPredicateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported predicate: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported predicate error.
    pub fn unsupported_predicate(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedPredicate(
            UnsupportedPredicateError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an unsupported predicate error.
    pub fn is_unsupported_predicate(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedPredicate(_))
    }
}
