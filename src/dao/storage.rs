use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached at all.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was unavailable.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A document could not be read.
    #[error("failed to read state document `{key}`")]
    Read {
        /// Key of the document.
        key: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A document could not be written.
    #[error("failed to write state document `{key}`")]
    Write {
        /// Key of the document.
        key: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A document was read but is not valid JSON.
    #[error("state document `{key}` has an unexpected shape")]
    Decode {
        /// Key of the document.
        key: String,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a read error for the document stored under `key`.
    pub fn read(key: &str, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Read {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    /// Construct a write error for the document stored under `key`.
    pub fn write(key: &str, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Write {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}
