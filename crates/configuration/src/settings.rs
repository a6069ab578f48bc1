use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub ingest: IngestSettings,
    pub stats: StatsSettings,
}

/// Parameters for talking to the record source.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Root of the remote API, including the version segment.
    pub base_url: String,
    /// API key; usually supplied via the CLI or the environment instead.
    #[serde(default)]
    pub key: Option<String>,
}

/// Parameters for the concurrent ingestion pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestSettings {
    /// Number of long-lived fetch workers.
    pub workers: usize,
}

/// Parameters that shape the computed statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSettings {
    /// Years before this are excluded from year-keyed aggregates.
    pub min_year: i32,
}
