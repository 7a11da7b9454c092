use super::Error;

/// Error raised by a record store repository.
#[derive(Debug)]
pub(super) struct RepositoryError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the error and walk its source chain
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a repository implementation error.
    pub fn repository(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Repository(RepositoryError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is a repository error.
    pub fn is_repository(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Repository(_))
    }
}
