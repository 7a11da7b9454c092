use super::Error;

/// Error when an entity map is requested while the same thread is still
/// initializing it.
#[derive(Debug)]
pub(super) struct MapperInitializingError {
    entity: &'static str,
}

impl std::error::Error for MapperInitializingError {}

impl core::fmt::Display for MapperInitializingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "entity map for `{}` was requested while it is being initialized",
            self.entity
        )
    }
}

impl Error {
    /// Creates a re-entrant initialization error for `entity`.
    pub fn mapper_initializing(entity: &'static str) -> Error {
        Error::from(super::ErrorKind::MapperInitializing(MapperInitializingError {
            entity,
        }))
    }

    /// Returns `true` if this error is a re-entrant initialization error.
    pub fn is_mapper_initializing(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MapperInitializing(_))
    }
}
