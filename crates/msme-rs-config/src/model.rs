//! Configuration schema for the MSME assistant backend.

use serde::{Deserialize, Serialize};

/// Root config for the assistant backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MsmeConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chatlog: ChatLogConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub versions: VersionsConfig,
}

impl MsmeConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MsmeConfigBuilder {
        MsmeConfigBuilder::new()
    }
}

/// Builder for assembling an `MsmeConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MsmeConfigBuilder {
    config: MsmeConfig,
}

impl MsmeConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MsmeConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the chat-log store configuration.
    pub fn chatlog(mut self, chatlog: ChatLogConfig) -> Self {
        self.config.chatlog = chatlog;
        self
    }

    /// Replace the admin credentials and session settings.
    pub fn admin(mut self, admin: AdminConfig) -> Self {
        self.config.admin = admin;
        self
    }

    /// Replace the chat engine configuration.
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Replace the version catalog configuration.
    pub fn versions(mut self, versions: VersionsConfig) -> Self {
        self.config.versions = versions;
        self
    }

    /// Finalize and return the built `MsmeConfig`.
    pub fn build(self) -> MsmeConfig {
        self.config
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:5000".to_string()
}

/// Chat-log store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatLogProvider {
    #[default]
    File,
    Memory,
}

/// Chat-log store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogConfig {
    #[serde(default)]
    pub provider: ChatLogProvider,
    #[serde(default = "default_chatlog_path")]
    pub path: String,
}

impl Default for ChatLogConfig {
    fn default() -> Self {
        Self {
            provider: ChatLogProvider::default(),
            path: default_chatlog_path(),
        }
    }
}

/// Default chat-log document path.
fn default_chatlog_path() -> String {
    "chatlogs.json".to_string()
}

/// Admin credentials and session lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "adminpass".to_string()
}

/// Default admin session lifetime (12 hours).
fn default_session_ttl_secs() -> u64 {
    12 * 60 * 60
}

/// Chat engine selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatEngineKind {
    /// Placeholder engine that echoes the message back.
    #[default]
    Echo,
    /// Ollama `/api/chat` backend.
    Ollama,
}

/// Chat engine configuration and request defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub engine: ChatEngineKind,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_feature")]
    pub default_feature: String,
    #[serde(default = "default_version")]
    pub default_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            engine: ChatEngineKind::default(),
            ollama_url: default_ollama_url(),
            default_model: default_model(),
            default_feature: default_feature(),
            default_version: default_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma2:2b".to_string()
}

fn default_feature() -> String {
    "rag".to_string()
}

fn default_version() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Read-only model version catalog published by the training service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VersionsConfig {
    #[serde(default)]
    pub path: Option<String>,
}
