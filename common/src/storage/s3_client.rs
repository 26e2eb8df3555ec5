// S3 client for bucket listings (AWS, MinIO, LocalStack)

use crate::config::StorageConfig;
use crate::errors::StorageError;
use crate::storage::lister::{ObjectLister, Snapshot};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// S3 bucket handle scoped to one key prefix
#[derive(Clone, Debug)]
pub struct S3Client {
    bucket: Arc<Bucket>,
    bucket_name: String,
    prefix: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket))]
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        info!("Initializing S3 client");

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to create S3 credentials");
            StorageError::Credentials(e.to_string())
        })?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials).map_err(|e| {
            error!(error = %e, "Failed to create bucket handle");
            StorageError::BucketHandle {
                bucket: config.bucket.clone(),
                reason: e.to_string(),
            }
        })?;

        // LocalStack and MinIO don't resolve virtual-host style bucket names
        let bucket = if config.path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        info!(
            bucket = %config.bucket,
            prefix = %config.prefix,
            path_style = config.path_style,
            "S3 client initialized"
        );

        Ok(Self {
            bucket: Arc::from(bucket),
            bucket_name: config.bucket.clone(),
            prefix: config.prefix.clone(),
        })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Verify the bucket is reachable and readable
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), StorageError> {
        debug!("Performing S3 health check");

        self.bucket
            .list(self.prefix.clone(), Some("/".to_string()))
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(error = %e, "S3 health check failed");
                StorageError::HealthCheck(e.to_string())
            })
    }

    /// List every key under `prefix`, following continuation tokens
    #[instrument(skip(self), fields(bucket = %self.bucket_name, prefix = %prefix))]
    pub async fn list_keys(&self, prefix: &str) -> Result<Snapshot, StorageError> {
        debug!("Listing objects");

        let pages = self
            .bucket
            .list(prefix.to_string(), None)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list objects");
                StorageError::ListFailed {
                    bucket: self.bucket_name.clone(),
                    prefix: prefix.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let keys: Snapshot = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect();

        debug!(count = keys.len(), "Objects listed");
        Ok(keys)
    }
}

#[async_trait]
impl ObjectLister for S3Client {
    fn collection(&self) -> &str {
        &self.bucket_name
    }

    async fn list(&self) -> Result<Snapshot, StorageError> {
        self.list_keys(&self.prefix).await
    }
}
