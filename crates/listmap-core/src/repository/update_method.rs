/// How the record store records an update.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum UpdateMethod {
    /// Regular update: bumps the version and the modified metadata
    #[default]
    Update,

    /// Keeps the modified metadata and does not create a version
    SystemUpdate,

    /// Updates the current version in place
    OverwriteVersion,
}
