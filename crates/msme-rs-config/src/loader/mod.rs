//! Layered configuration loader.
//!
//! Discovers configuration layers (user, cwd, runtime overrides), checks each
//! against the schema, merges them, and decodes the result into `MsmeConfig`.

mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, MsmeConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "msme.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".msme";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, schema-checked config.
    pub config: MsmeConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.msme/msme.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl MsmeConfig {
    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime overrides. Missing
    /// user and cwd layers are skipped; runtime layers must exist.
    ///
    /// Only the schema is checked here. Callers apply their own overrides and
    /// then call [`MsmeConfig::validate`].
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layer_io::normalize_path(&options.cwd)?;
        debug!("normalized cwd for config load: {}", cwd.display());
        let mut layers = Vec::new();
        let mut values = Vec::new();
        let mut seen_paths = HashSet::new();

        let mut candidates = Vec::new();
        if let Some(path) = options.user_config_path {
            candidates.push((ConfigLayerSource::User, path, false));
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE), false));
        for path in options.runtime_paths {
            candidates.push((ConfigLayerSource::Runtime, path, true));
        }

        for (source, path, required) in candidates {
            if !required && !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if !seen_paths.insert(layer_io::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            debug!("loaded layer (source={:?}, path={})", source, path.display());
            layers.push(ConfigLayer { source, path });
            values.push(value);
        }

        let merged = merge::merge_layers(&values);
        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidField {
                path: "server.addr".to_string(),
                message: format!("not a socket address: {}", self.server.addr),
            });
        }
        if self.admin.username.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "admin.username must not be empty".to_string(),
            ));
        }
        if self.admin.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "admin.session_ttl_secs must be positive".to_string(),
            ));
        }
        if self.chat.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "chat.timeout_secs must be positive".to_string(),
            ));
        }
        if self.chatlog.path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "chatlog.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<MsmeConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    Ok(serde_json::from_value(value)?)
}
