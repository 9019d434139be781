/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key is empty or contains characters the backing medium can't
    /// represent (e.g. a path separator for [`FileStore`](crate::FileStore)).
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading, writing, or removing the value failed.
    #[error("storage i/o failed for key {key:?}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store can't be used at all right now (quota exceeded, storage
    /// disabled by the user, etc.).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
