use std::fmt;

/// Errors that can occur during content store operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested object was not found.
    NotFound(String),
    /// An object already exists under the key; stores never overwrite.
    AlreadyExists(String),
    /// The key is not a safe relative path.
    InvalidKey(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The remote object store rejected or failed the request.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::AlreadyExists(key) => write!(f, "object already exists: {key}"),
            Self::InvalidKey(msg) => write!(f, "invalid object key: {msg}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Backend(msg) => write!(f, "object store error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        Self::Backend(err.to_string())
    }
}
