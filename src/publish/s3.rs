use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, primitives::ByteStream, Client};
use tracing::debug;

use super::ObjectStore;
use crate::error::{PipelineError, Result};

/// S3-backed object store. Credentials come from the ambient AWS config
/// chain; bucket and region are per-invocation configuration.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(bucket: &str, region: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: Client::new(&shared),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        debug!(bucket = %self.bucket, %key, "put_object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| PipelineError::Publish {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        Ok(())
    }
}
