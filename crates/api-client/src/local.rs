use crate::error::SourceError;
use crate::RecordSource;
use async_trait::async_trait;
use core_types::{DirectoryEntry, FirmRecord};
use std::path::PathBuf;

/// A `RecordSource` that reads records saved to the local filesystem by a
/// previous `--save` run, laid out exactly as the API paths are.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_raw(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        Ok(tokio::fs::read(self.root.join(path)).await?)
    }
}

#[async_trait]
impl RecordSource for LocalSource {
    async fn firm_record(&self, permalink: &str) -> Result<FirmRecord, SourceError> {
        let path = format!("financial-organization/{}", permalink);
        let body = self.read_raw(&path).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// The directory is a single file locally; every page re-reads it, and
    /// the caller's identical-final-entry rule ends the pagination loop.
    async fn directory_page(&self, _page: u32) -> Result<Vec<DirectoryEntry>, SourceError> {
        let body = self.read_raw("financial-organizations").await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
