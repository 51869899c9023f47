//! Reference dataset retrieval for the health census.
//!
//! Provides [`ReferenceSource`] implementations that load the condition
//! reference document (`{ "conditions": [...] }`) over HTTP or from disk.
//! Each fetch is a single attempt; failures are returned to the caller as-is.

pub mod file;
pub mod http;

pub use file::*;
pub use http::*;

use anyhow::Context;
use health_census_core::config::ReferenceConfig;
use health_census_core::reference::ReferenceSource;

/// Build the source described by `config`: `url` when set, otherwise `path`.
pub fn source_from_config(config: &ReferenceConfig) -> anyhow::Result<Box<dyn ReferenceSource>> {
    match &config.url {
        Some(url) => {
            let source = HttpSource::new(url.clone(), config.timeout_seconds)
                .with_context(|| format!("Failed to build HTTP client for {url}"))?;
            Ok(Box::new(source))
        }
        None => Ok(Box::new(FileSource::new(config.path.clone()))),
    }
}
