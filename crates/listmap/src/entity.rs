use crate::{EntityMapBuilder, Result};

/// A typed record mirroring one store item through a set of mapped
/// properties.
///
/// `map` declares the mapping. It runs once per registry, the first time the
/// entity type is used, and must be deterministic: a failure is remembered
/// and returned on every later use.
pub trait Entity: Default + Send + Sync + Sized + 'static {
    /// Name used in diagnostics.
    const NAME: &'static str;

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()>;
}
