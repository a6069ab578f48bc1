use crate::error::SourceError;
use crate::RecordSource;
use async_trait::async_trait;
use configuration::ApiSettings;
use core_types::{DirectoryEntry, FirmRecord};
use std::path::PathBuf;
use tracing::warn;

/// A concrete `RecordSource` backed by the CrunchBase v1 REST API.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// When set, every fetched body is mirrored to disk under this root so
    /// a later run can use `LocalSource` instead.
    save_root: Option<PathBuf>,
}

impl HttpSource {
    pub fn new(api: &ApiSettings, api_key: &str, save_root: Option<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: api.base_url.clone(),
            api_key: api_key.to_string(),
            save_root,
        }
    }

    fn url(&self, path: &str, page: u32) -> String {
        let mut url = format!("{}{}.js?api_key={}", self.base_url, path, self.api_key);
        if page > 0 {
            url.push_str(&format!("&page={}", page));
        }
        url
    }

    /// Fetches one resource body. A 504 from the API is transient often
    /// enough that it gets a single retry before counting as a failure.
    async fn get_raw(&self, path: &str, page: u32) -> Result<Vec<u8>, SourceError> {
        let url = self.url(path, page);

        let mut response = self.client.get(&url).send().await?;
        if response.status().as_u16() == 504 {
            warn!(path, "gateway timeout, retrying once");
            response = self.client.get(&url).send().await?;
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(url, response.status().as_u16()));
        }

        let body = response.bytes().await?.to_vec();

        if let Some(root) = &self.save_root {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, &body).await?;
        }

        Ok(body)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn firm_record(&self, permalink: &str) -> Result<FirmRecord, SourceError> {
        let path = format!("financial-organization/{}", permalink);
        let body = self.get_raw(&path, 0).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn directory_page(&self, page: u32) -> Result<Vec<DirectoryEntry>, SourceError> {
        let body = self.get_raw("financial-organizations", page).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
