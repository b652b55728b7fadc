use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::key::validate_key;
use super::traits::ContentStore;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, Supabase).
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub path_style: bool,
    /// Overrides the bucket URL when building public links (e.g. a CDN).
    pub public_base_url: Option<String>,
}

/// Content store backed by an S3-compatible bucket.
pub struct S3ContentStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ContentStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => settings
                .region
                .parse()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            settings.access_key.as_deref(),
            settings.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        let public_base_url = settings
            .public_base_url
            .clone()
            .unwrap_or_else(|| bucket.url())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bucket,
            public_base_url,
        })
    }
}

fn ensure_success(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        409 | 412 => Err(StorageError::AlreadyExists(key.to_string())),
        other => Err(StorageError::Backend(format!(
            "unexpected status {other} for {key}"
        ))),
    }
}

#[async_trait]
impl ContentStore for S3ContentStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        let key = validate_key(key)?;
        // S3 has no create-only PUT; a concurrent writer can still slip in.
        if self.exists(key).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await?;
        debug!(key, status = response.status_code(), "Stored object");
        ensure_success(key, response.status_code())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let key = validate_key(key)?;
        let response = match self.bucket.get_object(key).await {
            Ok(response) => response,
            Err(S3Error::HttpFailWithBody(404, _)) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        ensure_success(key, response.status_code())?;
        Ok(response.bytes().to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = validate_key(key)?;
        match self.bucket.head_object(key).await {
            Ok((_, status)) => Ok((200..300).contains(&status)),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
