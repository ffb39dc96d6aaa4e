use async_trait::async_trait;
use std::{fs, path::Path};
use tracing::info;

use crate::error::{PipelineError, Result};

pub mod s3;
pub use s3::S3Store;

/// Fixed artifact name inside the partition; reruns for the same date
/// land on the same key and overwrite.
pub const ARTIFACT_NAME: &str = "IBOVDia";

/// Storage key for one day's artifact. Pure function of the resolved
/// date, so two runs collide only when their dates match.
pub fn artifact_key(iso_date: &str) -> String {
    format!("Raw/date={iso_date}/{ARTIFACT_NAME}.parquet")
}

/// Durable blob store with a single put-object operation. Injected into
/// the pipeline so tests can swap in an in-memory implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

/// Read the finalized artifact from scratch space and hand it to the
/// store under the date partition. Storage failures surface as-is; retry
/// is the orchestration layer's call.
pub async fn publish(store: &dyn ObjectStore, iso_date: &str, artifact: &Path) -> Result<String> {
    let key = artifact_key(iso_date);
    let bytes = fs::read(artifact).map_err(|source| PipelineError::ArtifactRead {
        path: artifact.to_path_buf(),
        source,
    })?;

    info!(%key, bytes = bytes.len(), "uploading artifact");
    store.put_object(&key, bytes).await?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_date_partitioned() {
        assert_eq!(
            artifact_key("2024-11-19"),
            "Raw/date=2024-11-19/IBOVDia.parquet"
        );
    }

    #[test]
    fn same_date_means_same_key() {
        assert_eq!(artifact_key("2025-01-02"), artifact_key("2025-01-02"));
        assert_ne!(artifact_key("2025-01-02"), artifact_key("2025-01-03"));
    }
}
