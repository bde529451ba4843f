//! Tests for layered configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Build a project dir with a `.git` marker and return (project, cwd).
fn project_tree(root: &Path) -> (PathBuf, PathBuf) {
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");
    (project_root, cwd)
}

/// Verify that a minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = TrackMyBrainConfig::load_from_str("{}").expect("config");
    assert_eq!(config.storage.key, "trackmybrain_memories_v1");
    assert_eq!(config.retrieval.top_k, 5);
    assert!(config.assistant.strip_think_tags);
}

/// JSON5 comments, unquoted keys and trailing commas are accepted.
#[test]
fn parse_json5_features() {
    let json5 = r#"{
        // where notes live
        storage: { path: "/data/brain", key: "notes", },
        retrieval: { top_k: 3, max_context_chars: 2000, utc_offset_minutes: -300 },
        assistant: { name: "Brainy" },
    }"#;
    let config = TrackMyBrainConfig::load_from_str(json5).expect("config");
    assert_eq!(config.storage.path.as_deref(), Some("/data/brain"));
    assert_eq!(config.storage.key, "notes");
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.retrieval.max_context_chars, Some(2000));
    assert_eq!(config.retrieval.utc_offset_minutes, -300);
    assert_eq!(config.assistant.name, "Brainy");
    assert_eq!(config.assistant.recent_limit, 30);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = TrackMyBrainConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("unknown key"));
    assert!(msg.contains("config:unexpected"));
}

/// Reject wrongly typed nested values with the dotted path.
#[test]
fn rejects_wrong_type_with_path() {
    let err = TrackMyBrainConfig::load_from_str(r#"{ retrieval: { top_k: "five" } }"#)
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("config:retrieval.top_k"), "{msg}");
}

/// Semantic validation runs after schema validation.
#[test]
fn rejects_zero_top_k_and_bad_key() {
    let err = TrackMyBrainConfig::load_from_str(r#"{ retrieval: { top_k: 0 } }"#).unwrap_err();
    assert!(format!("{err}").contains("retrieval.top_k"));

    let err = TrackMyBrainConfig::load_from_str(r#"{ storage: { key: "../x" } }"#).unwrap_err();
    assert!(format!("{err}").contains("storage.key"));

    let err = TrackMyBrainConfig::load_from_str(r#"{ retrieval: { utc_offset_minutes: 1440 } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("utc_offset_minutes"));
}

/// Malformed JSON5 surfaces a parse error.
#[test]
fn rejects_unparseable_contents() {
    let err = TrackMyBrainConfig::load_from_str("{ storage: ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

/// Project layer overrides user layer; untouched keys keep lower values.
#[test]
fn layered_config_prefers_project_over_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let (project_root, cwd) = project_tree(root);

    let user_config = root.join("home").join("user.json5");
    write_json5(
        &user_config,
        "{ assistant: { name: \"user\", recent_limit: 7 } }",
    );
    write_json5(
        &project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
        "{ assistant: { name: \"project\" } }",
    );

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = Some(user_config);

    let layered = TrackMyBrainConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.assistant.name, "project");
    assert_eq!(layered.config.assistant.recent_limit, 7);
    let sources: Vec<_> = layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![ConfigLayerSource::User, ConfigLayerSource::Project]
    );
}

/// Runtime overrides are applied last.
#[test]
fn runtime_override_wins() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let (project_root, cwd) = project_tree(root);

    write_json5(
        &project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
        "{ retrieval: { top_k: 9 } }",
    );
    let runtime_config = root.join("runtime.json5");
    write_json5(&runtime_config, "{ retrieval: { top_k: 2 } }");

    let mut options = LayeredConfigOptions::new(&cwd).with_runtime_path(&runtime_config);
    options.user_config_path = None;

    let layered = TrackMyBrainConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.retrieval.top_k, 2);
    assert_eq!(layered.layers.len(), 2);
}

/// Missing optional layers produce the default config.
#[test]
fn missing_layers_yield_defaults() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(temp.path());

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = Some(temp.path().join("absent.json5"));

    let layered = TrackMyBrainConfig::load_layered_with_options(options).expect("layered");
    assert!(layered.layers.is_empty());
    assert_eq!(layered.config.retrieval.top_k, 5);
}

/// A missing runtime override is an error, not a silent skip.
#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(temp.path());

    let mut options =
        LayeredConfigOptions::new(&cwd).with_runtime_path(temp.path().join("nope.json5"));
    options.user_config_path = None;

    let err = TrackMyBrainConfig::load_layered_with_options(options).unwrap_err();
    match err {
        ConfigError::MissingRuntimeLayer(path) => assert!(path.ends_with("nope.json5")),
        other => panic!("unexpected error: {other}"),
    }
}

/// A bad key in any layer is reported with that layer's label.
#[test]
fn layer_schema_errors_name_the_layer() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(temp.path());
    let user_config = temp.path().join("user.json5");
    write_json5(&user_config, "{ storage: { bucket: \"x\" } }");

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = Some(user_config);

    let err = TrackMyBrainConfig::load_layered_with_options(options).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("user("), "{msg}");
    assert!(msg.contains("storage.bucket"), "{msg}");
}

/// Offsets at the extremes of the integer range are rejected, not wrapped.
#[test]
fn rejects_extreme_utc_offsets() {
    for offset in ["-2147483648", "2147483647", "-1440", "1440"] {
        let contents = format!("{{ retrieval: {{ utc_offset_minutes: {offset} }} }}");
        let err = TrackMyBrainConfig::load_from_str(&contents).unwrap_err();
        assert!(
            format!("{err}").contains("retrieval.utc_offset_minutes"),
            "{offset}: {err}"
        );
    }

    let err = TrackMyBrainConfig::load_from_str("{ retrieval: { utc_offset_minutes: 9999999999 } }")
        .unwrap_err();
    assert!(matches!(err, ConfigError::DecodeFailed(_)));

    for offset in [-1439, 0, 1439] {
        let contents = format!("{{ retrieval: {{ utc_offset_minutes: {offset} }} }}");
        let config = TrackMyBrainConfig::load_from_str(&contents).expect("offset in range");
        assert_eq!(config.retrieval.utc_offset_minutes, offset);
    }
}

/// Config accepts exactly the snapshot keys the store accepts.
#[test]
fn storage_key_rule_matches_snapshot_backend() {
    let cases = [
        "trackmybrain_memories_v1",
        "notes.v2",
        "a-b",
        "",
        ".",
        "..",
        "../escape",
        "with space",
        "slash/key",
        "ünïcode",
    ];
    for key in cases {
        let mut config = TrackMyBrainConfig::default();
        config.storage.key = key.to_string();
        assert_eq!(
            config.validate().is_ok(),
            validate_key(key).is_ok(),
            "key {key:?}"
        );
    }
}

/// A blank layer file counts as an empty layer rather than a parse error.
#[test]
fn blank_layer_file_is_empty_layer() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project_tree(temp.path());
    write_json5(
        &project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
        "  \n\t\n",
    );
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(&runtime_config, "");

    let mut options = LayeredConfigOptions::new(&cwd).with_runtime_path(&runtime_config);
    options.user_config_path = None;

    let layered = TrackMyBrainConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.layers.len(), 2);
    assert_eq!(layered.config.retrieval.top_k, 5);
}

/// Broken JSON5 in a layer names the layer it came from.
#[test]
fn layer_syntax_errors_name_the_layer() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project_tree(temp.path());
    write_json5(
        &project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
        "{ retrieval: ",
    );

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = None;

    let err = TrackMyBrainConfig::load_layered_with_options(options).unwrap_err();
    match &err {
        ConfigError::LayerSyntax { layer, .. } => {
            assert!(layer.starts_with("project("), "{layer}");
            assert!(layer.contains(DEFAULT_CONFIG_FILE), "{layer}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
