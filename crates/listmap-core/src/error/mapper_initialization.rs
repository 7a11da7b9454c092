use super::Error;

/// Error when an entity map failed to initialize.
///
/// The failure is permanent for the lifetime of the registry: every later
/// use of the entity type returns this error wrapping the original cause.
#[derive(Debug)]
pub(super) struct MapperInitializationError {
    entity: &'static str,
}

impl std::error::Error for MapperInitializationError {}

impl core::fmt::Display for MapperInitializationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "entity map for `{}` failed to initialize", self.entity)
    }
}

impl Error {
    /// Creates a mapper initialization error for `entity`.
    pub fn mapper_initialization(entity: &'static str) -> Error {
        Error::from(super::ErrorKind::MapperInitialization(
            MapperInitializationError { entity },
        ))
    }

    /// Returns `true` if this error is a mapper initialization error.
    pub fn is_mapper_initialization(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MapperInitialization(_))
    }
}
