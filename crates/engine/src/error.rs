use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid progress bar template: {0}")]
    ProgressTemplate(String),

    #[error("Aggregation started while the index was still shared with a worker")]
    IndexStillShared,

    #[error("Failed to build the canonical bucket sets: {0}")]
    Buckets(#[from] analytics::AnalyticsError),
}
