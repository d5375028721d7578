//! Public surface of the MSME assistant backend.
//!
//! Re-exports the building blocks and hosts the startup helpers shared by the
//! `msme` binary: logging setup and environment overrides.

pub use msme_rs_chatlog as chatlog;
pub use msme_rs_config as config;
pub use msme_rs_protocol as protocol;
pub use msme_rs_server as server;

use log::info;
use msme_rs_config::MsmeConfig;

/// Environment variables that override the effective config.
pub const ENV_ADDR: &str = "MSME_ADDR";
pub const ENV_CHATLOG_FILE: &str = "MSME_CHATLOG_FILE";
pub const ENV_ADMIN_USER: &str = "MSME_ADMIN_USER";
pub const ENV_ADMIN_PASS: &str = "MSME_ADMIN_PASS";
pub const ENV_OLLAMA_URL: &str = "OLLAMA_URL";

/// Initialize env_logger with millisecond timestamps; `RUST_LOG` filters.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Apply environment overrides using `lookup` (usually `std::env::var`).
///
/// Blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut MsmeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    if let Some(addr) = get(ENV_ADDR) {
        info!("config override from env ({ENV_ADDR})");
        config.server.addr = addr;
    }
    if let Some(path) = get(ENV_CHATLOG_FILE) {
        info!("config override from env ({ENV_CHATLOG_FILE})");
        config.chatlog.path = path;
    }
    if let Some(username) = get(ENV_ADMIN_USER) {
        info!("config override from env ({ENV_ADMIN_USER})");
        config.admin.username = username;
    }
    if let Some(password) = get(ENV_ADMIN_PASS) {
        info!("config override from env ({ENV_ADMIN_PASS})");
        config.admin.password = password;
    }
    if let Some(url) = get(ENV_OLLAMA_URL) {
        info!("config override from env ({ENV_OLLAMA_URL})");
        config.chat.ollama_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msme_rs_config::ServerConfig;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_replace_set_values_only() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ADDR, "0.0.0.0:8080"),
            (ENV_ADMIN_PASS, "s3cret"),
            (ENV_ADMIN_USER, "  "),
        ]);
        let mut config = MsmeConfig::default();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.admin.password, "s3cret");
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.chatlog.path, "chatlogs.json");
        assert_eq!(config.chat.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn env_override_repairs_file_value_before_validation() {
        let mut config = MsmeConfig::builder()
            .server(ServerConfig {
                addr: "localhost".to_string(),
            })
            .build();
        assert!(config.validate().is_err());

        apply_env_overrides(&mut config, |name| {
            (name == ENV_ADDR).then(|| "127.0.0.1:5001".to_string())
        });
        config.validate().expect("valid after env override");
        assert_eq!(config.server.addr, "127.0.0.1:5001");
    }
}
