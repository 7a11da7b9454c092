use super::Error;

/// Error when an adapter fails to convert a value between its field and
/// property representation.
///
/// The underlying failure is attached as the cause, so the rendered message
/// reads `failed to convert field ... : <cause>`.
#[derive(Debug)]
pub(super) struct ConversionError {
    entity: &'static str,
    property: &'static str,
    field: Box<str>,
}

impl std::error::Error for ConversionError {}

impl core::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to convert field `{}` for property `{}::{}`",
            self.field, self.entity, self.property
        )
    }
}

impl Error {
    /// Creates a conversion error for `field`, mapped to `entity::property`.
    ///
    /// Use it as context around the adapter's own error:
    /// `err.context(Error::conversion(entity, property, field))`.
    pub fn conversion(
        entity: &'static str,
        property: &'static str,
        field: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::Conversion(ConversionError {
            entity,
            property,
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is a conversion error.
    pub fn is_conversion(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Conversion(_))
    }
}
