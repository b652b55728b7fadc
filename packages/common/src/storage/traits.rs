use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed object storage for uploaded files.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `data` under `key`.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when an object is already
    /// stored under `key`. The filesystem backend checks atomically; the S3
    /// backend checks before writing, so two concurrent writers to one key
    /// can still race.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Publicly resolvable URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
