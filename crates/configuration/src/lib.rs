use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ApiSettings, IngestSettings, Settings, StatsSettings};

/// Loads the application configuration from the `config.toml` file.
///
/// Every key has a built-in default, so the file is optional and may set
/// only the values it wants to override.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("api.base_url", "http://api.crunchbase.com/v/1/")?
        .set_default("ingest.workers", 40)?
        .set_default("stats.min_year", 2005)?
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_key() {
        let settings = load_config().expect("defaults should deserialize");
        assert!(settings.ingest.workers > 0);
        assert_eq!(settings.stats.min_year, 2005);
        assert!(settings.api.base_url.ends_with('/'));
    }
}
