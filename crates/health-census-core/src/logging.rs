//! Structured logging setup using tracing.

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ConfigResult};

/// Install a global fmt subscriber at `level`.
///
/// `RUST_LOG` takes precedence when set. Returns `Ok(false)` if a global
/// subscriber was already installed (e.g. by the host application).
pub fn init_logging(level: &str) -> ConfigResult<bool> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid log level: {level}")))?;

    let level = level.as_str().to_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "health_census_core={level},health_census_fetch={level}"
        ))
    });

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok();

    Ok(installed)
}
