use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to parse bucket label '{0}': no numeric threshold")]
    InvalidBucketLabel(String),
}
