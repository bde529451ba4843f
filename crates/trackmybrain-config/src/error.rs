//! Errors raised while reading and validating `trackmybrain.json5` layers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read trackmybrain config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A `--config` override names a file that does not exist.
    #[error("runtime config not found: {}", .0.display())]
    MissingRuntimeLayer(PathBuf),
    /// One layer of the stack is not valid JSON5.
    #[error("{layer} is not valid JSON5: {source}")]
    LayerSyntax {
        layer: String,
        #[source]
        source: json5::Error,
    },
    /// Standalone config contents are not valid JSON5.
    #[error("trackmybrain config is not valid JSON5: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Values passed the schema but do not fit the typed model (e.g. out of range).
    #[error("config values do not fit the TrackMyBrain model: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific field failed validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
}
