use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Durable key-value slot that survives process restarts. Keys and values are
/// opaque strings; the session layer stores `token` and `currentUser` here.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
