//! Shared application state and its assembly from config.

use crate::catalog::{FileVersionCatalog, StaticVersionCatalog, VersionCatalog};
use crate::engine::{ChatDefaults, ChatEngine, EchoEngine, OllamaEngine};
use crate::error::ServerError;
use crate::gate::{AdminGate, TokenSessionGate};
use chrono::TimeDelta;
use log::info;
use msme_rs_chatlog::{ChatLogStore, FileChatLogStore, MemoryChatLogStore};
use msme_rs_config::{ChatConfig, ChatEngineKind, ChatLogProvider, MsmeConfig};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on admin session lifetime (one year).
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatLogStore>,
    pub gate: Arc<dyn AdminGate>,
    pub engine: Arc<dyn ChatEngine>,
    pub catalog: Arc<dyn VersionCatalog>,
    pub defaults: ChatDefaults,
}

impl AppState {
    /// State with the echo engine, an empty catalog, and default chat fields.
    pub fn new(store: Arc<dyn ChatLogStore>, gate: Arc<dyn AdminGate>) -> Self {
        Self {
            store,
            gate,
            engine: Arc::new(EchoEngine),
            catalog: Arc::new(StaticVersionCatalog::default()),
            defaults: ChatDefaults::default(),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn ChatEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn VersionCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_defaults(mut self, defaults: ChatDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build every collaborator named by the effective config.
    pub fn from_config(config: &MsmeConfig) -> Result<Self, ServerError> {
        let store: Arc<dyn ChatLogStore> = match config.chatlog.provider {
            ChatLogProvider::File => Arc::new(FileChatLogStore::open(&config.chatlog.path)?),
            ChatLogProvider::Memory => Arc::new(MemoryChatLogStore::new()),
        };
        let ttl_secs = config.admin.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
        let ttl = TimeDelta::seconds(ttl_secs as i64);
        let gate = Arc::new(TokenSessionGate::new(
            config.admin.username.clone(),
            config.admin.password.clone(),
            ttl,
        ));
        let engine: Arc<dyn ChatEngine> = match config.chat.engine {
            ChatEngineKind::Echo => Arc::new(EchoEngine),
            ChatEngineKind::Ollama => Arc::new(OllamaEngine::new(
                &config.chat.ollama_url,
                Duration::from_secs(config.chat.timeout_secs),
            )?),
        };
        let catalog: Arc<dyn VersionCatalog> = match &config.versions.path {
            Some(path) => Arc::new(FileVersionCatalog::new(path)),
            None => Arc::new(StaticVersionCatalog::default()),
        };
        info!(
            "application state ready (store={:?}, engine={:?})",
            config.chatlog.provider, config.chat.engine
        );
        Ok(Self {
            store,
            gate,
            engine,
            catalog,
            defaults: ChatDefaults::from(&config.chat),
        })
    }
}

impl From<&ChatConfig> for ChatDefaults {
    fn from(chat: &ChatConfig) -> Self {
        Self {
            model: chat.default_model.clone(),
            feature: chat.default_feature.clone(),
            version: chat.default_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msme_rs_chatlog::NewChatLog;
    use msme_rs_config::{AdminConfig, ChatLogConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn from_config_wires_memory_store_and_padded_admin() {
        let config = MsmeConfig::builder()
            .chatlog(ChatLogConfig {
                provider: ChatLogProvider::Memory,
                path: "unused.json".to_string(),
            })
            .admin(AdminConfig {
                username: " ops ".to_string(),
                password: "secret".to_string(),
                session_ttl_secs: u64::MAX,
            })
            .chat(ChatConfig {
                default_model: "phi3:3.8b".to_string(),
                ..ChatConfig::default()
            })
            .build();
        let state = AppState::from_config(&config).expect("state");

        let session = state.gate.login("ops", "secret").expect("login");
        state.gate.verify(&session.token).expect("verify");
        assert_eq!(state.defaults.model, "phi3:3.8b");
        state
            .store
            .append(NewChatLog::new("q", "r", "m", "rag", "default"))
            .expect("append");
        assert_eq!(state.store.list_all().expect("list").len(), 1);
    }
}
