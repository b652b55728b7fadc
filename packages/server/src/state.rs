use std::sync::Arc;

use intake_common::storage::ContentStore;
use intake_common::storage::filesystem::FilesystemContentStore;
use intake_common::storage::s3_store::S3ContentStore;
use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, StorageBackend, StorageConfig};
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub content_store: Arc<dyn ContentStore>,
    pub notifier: Notifier,
}

/// Builds the content store selected by `storage.backend`.
pub async fn build_content_store(
    config: &StorageConfig,
) -> anyhow::Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match config.backend {
        StorageBackend::Filesystem => Arc::new(
            FilesystemContentStore::new(config.local_root.clone(), &config.public_base_url)
                .await?,
        ),
        StorageBackend::S3 => Arc::new(S3ContentStore::new(&config.s3_settings())?),
    };
    Ok(store)
}
