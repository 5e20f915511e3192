use super::{ConfigOverrides, RemediationConfig};
use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Read a TOML configuration file.
pub async fn load_config_file(path: &Path) -> Result<RemediationConfig> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    let config: RemediationConfig = toml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Build the effective configuration and validate it.
pub async fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<RemediationConfig> {
    let base = match path {
        Some(path) => load_config_file(path).await?,
        None => RemediationConfig::default(),
    };

    let config = base.apply(overrides);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}
