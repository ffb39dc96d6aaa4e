use std::{fmt, fs, path::Path};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::process::{date::ReportDate, encode, normalize};
use crate::publish::{self, ObjectStore, ARTIFACT_NAME};

/// Pipeline states, in order. `Fetching` belongs to the collaborator that
/// produces the local CSV; `run` owns the rest. Any error is terminal for
/// the run, no state is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Normalizing,
    Encoding,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Encoding => "encoding",
            Stage::Publishing => "publishing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run: exactly one artifact on exactly one key.
#[derive(Debug)]
pub struct RunSummary {
    pub date: String,
    pub rows: usize,
    pub dropped: usize,
    pub artifact_bytes: u64,
    pub key: String,
}

/// Run the pipeline over one downloaded report. `scratch` and `store` are
/// per-invocation handles; concurrent runs for different dates must not
/// share either.
pub async fn run(csv_path: &Path, scratch: &Path, store: &dyn ObjectStore) -> Result<RunSummary> {
    let file_name = csv_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let date = ReportDate::from_file_name(&file_name)?.iso();

    info!(stage = %Stage::Normalizing, source = %csv_path.display(), %date, "reading report");
    let raw = fs::read(csv_path).map_err(|source| PipelineError::SourceRead {
        path: csv_path.to_path_buf(),
        source,
    })?;
    let outcome = normalize::normalize(&raw);
    info!(
        stage = %Stage::Normalizing,
        rows = outcome.records.len(),
        dropped = outcome.dropped,
        "report normalized"
    );

    info!(stage = %Stage::Encoding, "writing columnar artifact");
    let artifact_path = scratch.join(format!("{ARTIFACT_NAME}.parquet"));
    let artifact_bytes = encode::write_parquet(&outcome.records, &artifact_path)?;

    info!(stage = %Stage::Publishing, "publishing");
    let key = publish::publish(store, &date, &artifact_path).await?;

    info!(stage = %Stage::Done, %key, "run complete");
    Ok(RunSummary {
        date,
        rows: outcome.records.len(),
        dropped: outcome.dropped,
        artifact_bytes,
        key,
    })
}
