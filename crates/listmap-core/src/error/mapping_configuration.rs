use super::Error;

/// Error when an entity map is declared inconsistently.
///
/// This occurs when:
/// - The identifier is registered twice, or also mapped as a regular field
/// - Two attachment or file mappings are declared for one entity
/// - A property is registered as not updatable but was never mapped
///
/// These are programming defects and are never retried.
#[derive(Debug)]
pub(super) struct MappingConfigurationError {
    entity: &'static str,
    message: Box<str>,
}

impl std::error::Error for MappingConfigurationError {}

impl core::fmt::Display for MappingConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping for `{}`: {}", self.entity, self.message)
    }
}

impl Error {
    /// Creates a mapping configuration error.
    pub fn mapping_configuration(entity: &'static str, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MappingConfiguration(
            MappingConfigurationError {
                entity,
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a mapping configuration error.
    pub fn is_mapping_configuration(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MappingConfiguration(_))
    }

    /// Returns `true` if a mapping configuration error appears anywhere in the
    /// context chain.
    pub fn caused_by_mapping_configuration(&self) -> bool {
        self.chain_has(|kind| matches!(kind, super::ErrorKind::MappingConfiguration(_)))
    }
}
