//! Reading single `trackmybrain.json5` layers from disk.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LoadedLayer, schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Load the user or project layer; an absent file is skipped.
pub(super) fn load_optional_layer(
    source: ConfigLayerSource,
    path: Option<&Path>,
) -> Result<Option<LoadedLayer>, ConfigError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match fs::read_to_string(path) {
        Ok(contents) => parse_layer(source, path, &contents).map(Some),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no {} layer (path={})", source_name(source), path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Load a `--config` override, which must exist.
pub(super) fn load_runtime_layer(path: &Path) -> Result<LoadedLayer, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::MissingRuntimeLayer(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    parse_layer(ConfigLayerSource::Runtime, path, &contents)
}

/// Parse and schema-check one layer. A blank file is an empty layer.
fn parse_layer(
    source: ConfigLayerSource,
    path: &Path,
    contents: &str,
) -> Result<LoadedLayer, ConfigError> {
    let label = layer_label(source, path);
    let value = if contents.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        json5::from_str(contents).map_err(|source| ConfigError::LayerSyntax {
            layer: label.clone(),
            source,
        })?
    };
    schema::validate_layer_schema(&value, &label)?;
    let sections = value.as_object().map_or(0, Map::len);
    debug!("config layer parsed (layer={label}, sections={sections})");
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    })
}

fn source_name(source: ConfigLayerSource) -> &'static str {
    match source {
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Project => "project",
        ConfigLayerSource::Runtime => "runtime",
    }
}

/// `user(/home/me/.trackmybrain/trackmybrain.json5)` style label for errors.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    format!("{}({})", source_name(source), path.display())
}

/// `~/.trackmybrain/trackmybrain.json5`, or `None` without a home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
    )
}
