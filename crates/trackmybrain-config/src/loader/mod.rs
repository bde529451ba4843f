//! Layered configuration loader.
//!
//! Discovers configuration layers (user, project, runtime overrides),
//! validates each against the schema, merges them low to high precedence,
//! and produces a final `TrackMyBrainConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;

#[cfg(test)]
mod tests;

use crate::{ConfigError, TrackMyBrainConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use trackmybrain_memory::backend::validate_key;

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "trackmybrain.json5";
/// Default config directory under user or project roots.
const DEFAULT_CONFIG_DIR: &str = ".trackmybrain";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git", DEFAULT_CONFIG_DIR];
/// Largest accepted offset magnitude: one minute short of a day.
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: TrackMyBrainConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Project root configuration.
    Project,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to locate the project layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.trackmybrain/trackmybrain.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Append a runtime override layer.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl TrackMyBrainConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, project, runtime overrides.
    /// Missing user and project layers are skipped; runtime layers must exist.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        debug!("normalized cwd for config load: {}", cwd.display());
        let mut loaded = Vec::new();
        let mut seen_paths = HashSet::new();

        if let Some(layer) = layer_io::load_optional_layer(
            ConfigLayerSource::User,
            options.user_config_path.as_deref(),
        )? {
            seen_paths.insert(utils::unique_path(&layer.meta.path));
            loaded.push(layer);
        }

        let project_root = utils::find_project_root(&cwd, &options.project_root_markers);
        match project_root.as_ref() {
            Some(root) => {
                debug!("resolved project root: {}", root.display());
                let path = root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE);
                if seen_paths.insert(utils::unique_path(&path)) {
                    if let Some(layer) =
                        layer_io::load_optional_layer(ConfigLayerSource::Project, Some(&path))?
                    {
                        loaded.push(layer);
                    }
                } else {
                    debug!("project layer is the user layer; skipping duplicate");
                }
            }
            None => debug!("project root not found; skipping project layer"),
        }

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_runtime_layer(runtime_path)?;
            debug!("loaded runtime layer (path={})", runtime_path.display());
            loaded.push(layer);
        }

        let mut merged = Value::Object(serde_json::Map::new());
        let mut layers = Vec::with_capacity(loaded.len());
        for layer in loaded {
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.top_k == 0 {
            return Err(field_error("retrieval.top_k", "must be greater than zero"));
        }
        if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES)
            .contains(&self.retrieval.utc_offset_minutes)
        {
            return Err(field_error(
                "retrieval.utc_offset_minutes",
                "must be less than a day in either direction",
            ));
        }
        if validate_key(&self.storage.key).is_err() {
            return Err(field_error(
                "storage.key",
                "must be non-empty and use only letters, digits, '_', '-' or '.'",
            ));
        }
        Ok(())
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<TrackMyBrainConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: TrackMyBrainConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn field_error(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
