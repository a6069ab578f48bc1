use crate::error::SourceError;
use async_trait::async_trait;
use core_types::{DirectoryEntry, FirmRecord};

pub mod error;
pub mod http;
pub mod local;

// --- Public API ---
pub use http::HttpSource;
pub use local::LocalSource;

/// The abstract interface to wherever firm records live. The ingestion
/// pipeline only ever talks to this trait, so the remote API and the local
/// data mirror are interchangeable (and mockable in tests).
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches and decodes one firm's full record.
    async fn firm_record(&self, permalink: &str) -> Result<FirmRecord, SourceError>;

    /// Fetches one page of the firm directory. Page 0 is the first page.
    async fn directory_page(&self, page: u32) -> Result<Vec<DirectoryEntry>, SourceError>;
}

/// Walks the paginated firm directory until the source signals the end of
/// the list: an empty page, or a page whose final entry matches the final
/// entry already accumulated (sources that ignore the page argument return
/// the same page forever, which this rule terminates on).
pub async fn full_directory(
    source: &dyn RecordSource,
) -> Result<Vec<DirectoryEntry>, SourceError> {
    let mut entries: Vec<DirectoryEntry> = Vec::new();
    let mut page = 0;

    loop {
        let batch = source.directory_page(page).await?;
        if batch.is_empty() {
            break;
        }
        if let (Some(prev), Some(next)) = (entries.last(), batch.last()) {
            if prev.permalink == next.permalink {
                break;
            }
        }
        entries.extend(batch);
        page += 1;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A directory source that serves a fixed set of pages and repeats the
    /// last one, like an API that clamps out-of-range page numbers.
    struct PagedDirectory {
        pages: Vec<Vec<&'static str>>,
    }

    #[async_trait]
    impl RecordSource for PagedDirectory {
        async fn firm_record(&self, permalink: &str) -> Result<FirmRecord, SourceError> {
            Err(SourceError::Status(permalink.to_string(), 404))
        }

        async fn directory_page(&self, page: u32) -> Result<Vec<DirectoryEntry>, SourceError> {
            let idx = (page as usize).min(self.pages.len().saturating_sub(1));
            Ok(self
                .pages
                .get(idx)
                .map(|p| {
                    p.iter()
                        .map(|s| DirectoryEntry {
                            permalink: s.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_full_directory_stops_on_repeated_final_entry() {
        let source = PagedDirectory {
            pages: vec![vec!["a", "b"], vec!["c"]],
        };
        let entries = full_directory(&source).await.unwrap();
        let permalinks: Vec<_> = entries.iter().map(|e| e.permalink.as_str()).collect();
        assert_eq!(permalinks, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_full_directory_stops_on_empty_page() {
        let source = PagedDirectory { pages: vec![] };
        let entries = full_directory(&source).await.unwrap();
        assert!(entries.is_empty());
    }
}
