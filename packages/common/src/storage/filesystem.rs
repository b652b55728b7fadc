use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::key::validate_key;
use super::traits::ContentStore;

/// Filesystem-backed content store.
///
/// Objects live at `{root}/{key}`; public URLs are `{public_base_url}/{key}`,
/// so the root is expected to be served by a static file server.
pub struct FilesystemContentStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemContentStore {
    /// Create a new store rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf, public_base_url: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_key(key)?))
    }
}

#[async_trait]
impl ContentStore for FilesystemContentStore {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
