use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Row-level validation failures are not errors;
/// they drop the row and the run keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source filename carries no `DD-MM-YY` token, so no partition
    /// key can be computed for this run.
    #[error("no DD-MM-YY date token in file name '{file_name}'")]
    DateNotFound { file_name: String },

    /// The source CSV could not be read from local storage.
    #[error("reading source file {}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A validated batch could not be written into the fixed Parquet
    /// schema. Validation upstream should make this unreachable.
    #[error("encoding columnar artifact")]
    Encoding(#[from] parquet::errors::ParquetError),

    /// The encoded artifact could not be read back from scratch space
    /// for publishing.
    #[error("reading artifact {}", .path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object store rejected or failed the put. Not retried here;
    /// retry means re-invoking the whole pipeline.
    #[error("publishing object '{key}': {message}")]
    Publish { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
