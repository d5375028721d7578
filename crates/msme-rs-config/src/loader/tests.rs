//! Tests for layered configuration loading.

use super::*;
use crate::{ChatEngineKind, ChatLogConfig, ChatLogProvider, ServerConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn load_str(contents: &str) -> Result<MsmeConfig, ConfigError> {
    let value: Value = json5::from_str(contents)?;
    config_from_value(value, "config")
}

fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

#[test]
fn parse_minimal_config() {
    let config = load_str("{}").expect("config");
    assert_eq!(config.server.addr, "127.0.0.1:5000");
    assert_eq!(config.chatlog.provider, ChatLogProvider::File);
    assert_eq!(config.chatlog.path, "chatlogs.json");
    assert_eq!(config.admin.session_ttl_secs, 43_200);
    assert_eq!(config.chat.engine, ChatEngineKind::Echo);
    assert_eq!(config.chat.default_model, "gemma2:2b");
    assert_eq!(config.versions.path, None);
}

#[test]
fn json5_comments_and_trailing_commas_are_accepted() {
    let json5 = r#"{
        // local dev
        chat: { engine: "ollama", timeout_secs: 5, },
    }"#;
    let config = load_str(json5).expect("config");
    assert_eq!(config.chat.engine, ChatEngineKind::Ollama);
    assert_eq!(config.chat.timeout_secs, 5);
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = load_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn rejects_unknown_nested_key() {
    let err = load_str("{ admin: { token: \"x\" } }").unwrap_err();
    assert!(format!("{err}").contains("admin.token"));
}

#[test]
fn rejects_invalid_chatlog_provider() {
    let err = load_str(r#"{ chatlog: { provider: "mongo" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("chatlog.provider"));
    assert!(msg.contains("file, memory"));
}

#[test]
fn rejects_negative_ttl() {
    let err = load_str("{ admin: { session_ttl_secs: -1 } }").unwrap_err();
    assert!(format!("{err}").contains("admin.session_ttl_secs"));
}

#[test]
fn rejects_unparseable_addr() {
    let config = load_str(r#"{ server: { addr: "localhost" } }"#).expect("schema ok");
    match config.validate().unwrap_err() {
        ConfigError::InvalidField { path, .. } => assert_eq!(path, "server.addr"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn layered_config_prefers_runtime_over_cwd_over_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("work");
    fs::create_dir_all(&cwd).expect("cwd");

    let user_config = root.join("home").join("msme.json5");
    write_json5(
        &user_config,
        r#"{ admin: { username: "user-admin" }, chatlog: { path: "user.json" } }"#,
    );
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ chatlog: { path: "cwd.json" }, chat: { default_model: "phi3" } }"#,
    );
    let runtime = root.join("runtime.json5");
    write_json5(&runtime, r#"{ chat: { default_model: "llama3" } }"#);

    let options = LayeredConfigOptions {
        cwd: cwd.clone(),
        user_config_path: Some(user_config),
        runtime_paths: vec![runtime],
    };
    let layered = MsmeConfig::load_layered_with_options(options).expect("layered");

    assert_eq!(layered.config.admin.username, "user-admin");
    assert_eq!(layered.config.chatlog.path, "cwd.json");
    assert_eq!(layered.config.chat.default_model, "llama3");
    assert_eq!(
        layered
            .layers
            .iter()
            .map(|layer| layer.source)
            .collect::<Vec<_>>(),
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Runtime
        ]
    );
}

#[test]
fn missing_optional_layers_are_skipped() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions {
        cwd: temp.path().to_path_buf(),
        user_config_path: Some(temp.path().join("absent.json5")),
        runtime_paths: Vec::new(),
    };
    let layered = MsmeConfig::load_layered_with_options(options).expect("layered");
    assert!(layered.layers.is_empty());
    assert_eq!(layered.config.server.addr, "127.0.0.1:5000");
}

#[test]
fn invalid_file_value_can_be_overridden_before_validation() {
    let temp = TempDir::new().expect("tmp");
    let runtime = temp.path().join("runtime.json5");
    write_json5(
        &runtime,
        r#"{ server: { addr: "localhost" }, chatlog: { path: " " } }"#,
    );
    let options = LayeredConfigOptions {
        cwd: temp.path().to_path_buf(),
        user_config_path: None,
        runtime_paths: vec![runtime],
    };
    let mut config = MsmeConfig::load_layered_with_options(options)
        .expect("layered")
        .config;
    assert!(config.validate().is_err());

    config.server.addr = "127.0.0.1:6000".to_string();
    config.chatlog.path = "logs/chatlogs.json".to_string();
    config.validate().expect("valid after overrides");
}

#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions {
        cwd: temp.path().to_path_buf(),
        user_config_path: None,
        runtime_paths: vec![temp.path().join("nope.json5")],
    };
    let err = MsmeConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn invalid_layer_names_its_source() {
    let temp = TempDir::new().expect("tmp");
    write_json5(
        &temp.path().join(DEFAULT_CONFIG_FILE),
        r#"{ chat: { engine: "gpt" } }"#,
    );
    let options = LayeredConfigOptions {
        cwd: temp.path().to_path_buf(),
        user_config_path: None,
        runtime_paths: Vec::new(),
    };
    let err = MsmeConfig::load_layered_with_options(options).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("cwd("));
    assert!(msg.contains("chat.engine"));
}

#[test]
fn builder_replaces_sections() {
    let config = MsmeConfig::builder()
        .server(ServerConfig {
            addr: "0.0.0.0:8080".to_string(),
        })
        .chatlog(ChatLogConfig {
            provider: ChatLogProvider::Memory,
            path: "unused.json".to_string(),
        })
        .build();
    config.validate().expect("valid");
    assert_eq!(config.server.addr, "0.0.0.0:8080");
    assert_eq!(config.chatlog.provider, ChatLogProvider::Memory);
    assert_eq!(config.chat.default_feature, "rag");
}
