use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("The HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("get {0} - incorrect response code received - {1}")]
    Status(String, u16),

    #[error("Failed to decode the record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read local record: {0}")]
    Io(#[from] std::io::Error),
}
