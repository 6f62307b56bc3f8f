use chessdesk_base::pal::http::HttpServerConfig;
use chessdesk_base::{DeskResult, FilePath, PalHandle, ResultExt, err};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::auth::USERS;
use crate::store::{Record, RecordStoreHandle};

/// Console configuration, read from `chessdesk.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Title shown by the console.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub server: ServerConfig,
    /// Staff accounts created at start-up.
    #[serde(default = "default_users")]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on; the OS picks one when absent.
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_title() -> String {
    "Chess School Console".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_role() -> String {
    "staff".to_string()
}

fn default_users() -> Vec<UserConfig> {
    vec![UserConfig {
        username: "admin".to_string(),
        password: "Pass123@".to_string(),
        role: "admin".to_string(),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            server: ServerConfig::default(),
            users: default_users(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

impl Config {
    /// The HTTP server settings for this configuration.
    pub fn http_config(&self) -> HttpServerConfig {
        let config = HttpServerConfig::new(self.server.host.clone());
        match self.server.port {
            Some(port) => config.with_port(port),
            None => config,
        }
    }
}

/// Load the configuration at `path`; a missing file yields the defaults.
#[instrument(skip(pal))]
pub fn load_config(pal: &PalHandle, path: &FilePath) -> DeskResult<Config> {
    if !pal.file_exists(path)? {
        info!(%path, "no configuration file, using defaults");
        return Ok(Config::default());
    }
    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path))?;
    toml::from_str(&text).map_err(|e| err!("Failed to parse configuration {}: {}", path, e))
}

/// Store the configured staff accounts in the user collection.
pub fn seed_users(records: &RecordStoreHandle, users: &[UserConfig]) -> DeskResult<()> {
    for user in users {
        let mut record = Record::new();
        record.insert("username".to_string(), Value::from(user.username.as_str()));
        record.insert("password".to_string(), Value::from(user.password.as_str()));
        record.insert("role".to_string(), Value::from(user.role.as_str()));
        records.insert(USERS, record)?;
    }
    info!(count = users.len(), "seeded staff accounts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chessdesk_base::MockPal;

    fn pal_with(content: &str) -> PalHandle {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("chessdesk.toml"), content.as_bytes().to_vec());
        PalHandle::new(pal)
    }

    #[test]
    fn test_full_config() {
        let pal = pal_with(
            r#"
title = "Knight's Academy"

[server]
host = "0.0.0.0"
port = 8080

[[users]]
username = "admin"
password = "Pass123@"
role = "admin"

[[users]]
username = "coach"
password = "Coach123@"
"#,
        );
        let config = load_config(&pal, &FilePath::from("chessdesk.toml")).unwrap();
        assert_eq!(config.title, "Knight's Academy");
        assert_eq!(config.http_config().address(), "0.0.0.0:8080");
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[1].role, "staff");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let pal = PalHandle::new(MockPal::new());
        let config = load_config(&pal, &FilePath::from("chessdesk.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http_config().address(), "127.0.0.1:0");
        assert_eq!(config.users[0].username, "admin");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let pal = pal_with("title = \"Rook Club\"\n");
        let config = load_config(&pal, &FilePath::from("chessdesk.toml")).unwrap();
        assert_eq!(config.title, "Rook Club");
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.users, Config::default().users);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let pal = pal_with("[server]\nport = \"eighty\"\n");
        let error = load_config(&pal, &FilePath::from("chessdesk.toml")).unwrap_err();
        assert!(
            error
                .to_string()
                .starts_with("Failed to parse configuration chessdesk.toml:")
        );
    }

    #[test]
    fn test_seed_users() {
        let records = RecordStoreHandle::new(InMemoryRecordStore::new());
        seed_users(&records, &Config::default().users).unwrap();
        let admin = records.get(USERS, "users-0001").unwrap().unwrap();
        assert_eq!(admin["username"], "admin");
        assert_eq!(admin["role"], "admin");
    }
}
