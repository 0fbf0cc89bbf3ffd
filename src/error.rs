use std::fmt;

/// Errors that can occur while opening a storage backend.
#[derive(Debug)]
pub enum LoadError {
    /// Another handle to the same storage location is already open in this process.
    InstanceAlreadyLoaded,
    /// The platform configuration directory could not be resolved for a namespace.
    NoConfigDirectory(String),
    /// The backend could not be read or prepared.
    StorageError(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InstanceAlreadyLoaded => {
                write!(f, "storage location is already open in this process")
            }
            LoadError::NoConfigDirectory(namespace) => {
                write!(f, "no configuration directory for namespace '{}'", namespace)
            }
            LoadError::StorageError(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::StorageError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::StorageError(e)
    }
}

/// A backend write did not succeed.
///
/// The in-memory value has already changed when this is returned, so the
/// durable copy of `key` is stale until the next successful write.
#[derive(Debug)]
pub struct PersistError {
    pub key: &'static str,
    pub source: std::io::Error,
}

impl PersistError {
    pub(crate) fn new(key: &'static str, source: std::io::Error) -> Self {
        Self { key, source }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to persist '{}': {}", self.key, self.source)
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Errors returned by mutations on [`AppState`](crate::state::AppState).
#[derive(Debug)]
pub enum StoreError {
    /// The state has not finished loading; nothing was changed.
    NotReady,
    /// The change was applied in memory but its write failed.
    Persist(PersistError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotReady => write!(f, "store is not ready: load has not completed"),
            StoreError::Persist(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::NotReady => None,
            StoreError::Persist(e) => Some(e),
        }
    }
}

impl From<PersistError> for StoreError {
    fn from(e: PersistError) -> Self {
        StoreError::Persist(e)
    }
}
