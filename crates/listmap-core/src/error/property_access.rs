use super::Error;

/// Error when reading or writing an entity property fails.
#[derive(Debug)]
pub(super) struct PropertyAccessError {
    declaring_type: &'static str,
    property: &'static str,
}

impl std::error::Error for PropertyAccessError {}

impl core::fmt::Display for PropertyAccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to access property `{}` of `{}`",
            self.property, self.declaring_type
        )
    }
}

impl Error {
    /// Creates a property access error for `declaring_type::property`.
    pub fn property_access(declaring_type: &'static str, property: &'static str) -> Error {
        Error::from(super::ErrorKind::PropertyAccess(PropertyAccessError {
            declaring_type,
            property,
        }))
    }

    /// Returns `true` if this error is a property access error.
    pub fn is_property_access(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PropertyAccess(_))
    }
}
