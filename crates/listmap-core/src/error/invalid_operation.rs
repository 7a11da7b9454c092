use super::Error;

/// Error when an operation is invoked in a state that does not allow it.
///
/// This occurs when:
/// - The data item of an operation context is read before it was loaded
/// - An entity without an identifier is updated or deleted
/// - A read-only mapping is asked to write a value
#[derive(Debug)]
pub(super) struct InvalidOperationError {
    message: Box<str>,
}

impl std::error::Error for InvalidOperationError {}

impl core::fmt::Display for InvalidOperationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid operation: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidOperation(InvalidOperationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid operation error.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidOperation(_))
    }
}
