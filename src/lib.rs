pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod publish;

pub use error::PipelineError;
pub use pipeline::{run, RunSummary, Stage};
