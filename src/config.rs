use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read users file {path}: {source}")]
    UsersFileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse users file {path}: {source}")]
    UsersFileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding the redb file (durable backend only)
    pub data_dir: String,
    /// YAML file listing `users: [{username, password}]`
    pub users_file: PathBuf,
}

/// Which implementation backs the book, token and credential stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    Durable,
    #[default]
    Memory,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub session_ttl_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 86400, // 24 hours
        }
    }
}

/// Longest accepted session lifetime (10 years)
pub const MAX_SESSION_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

impl TokenConfig {
    /// Session lifetime, clamped to [`MAX_SESSION_TTL_SECONDS`]
    pub fn session_ttl(&self) -> chrono::Duration {
        let seconds = self.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: "./data".to_string(),
            users_file: PathBuf::from("config.yaml"),
        }
    }
}

/// One plaintext entry of the users file. Hashed before it is stored anywhere.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

/// Users seeded into an empty durable store when no users file exists
pub fn default_seed_users() -> Vec<UserEntry> {
    [
        ("admin", "admin123"),
        ("user1", "password1"),
        ("testuser", "test123"),
    ]
    .into_iter()
    .map(|(username, password)| UserEntry {
        password: password.to_string(),
        username: username.to_string(),
    })
    .collect()
}

/// Parse the users file
pub fn load_users(path: &Path) -> Result<Vec<UserEntry>, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::UsersFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_users(&data).map_err(|source| ConfigError::UsersFileParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_users(data: &str) -> Result<Vec<UserEntry>, serde_yaml::Error> {
    let file: UsersFile = serde_yaml::from_str(data)?;
    Ok(file.users)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS")
            .or_else(|| lookup("PORT").map(|port| format!("0.0.0.0:{port}")))
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let backend = match lookup("STORAGE_BACKEND").map(|s| s.to_lowercase()) {
            None => StorageBackend::Memory,
            Some(s) if s == "memory" => StorageBackend::Memory,
            Some(s) if s == "durable" => StorageBackend::Durable,
            Some(other) => {
                return Err(ConfigError::ValidationError(format!(
                    "STORAGE_BACKEND must be 'memory' or 'durable', got '{other}'"
                )))
            }
        };

        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string());
        let users_file = lookup("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"));

        let session_ttl_seconds = match lookup("SESSION_TTL_SECONDS") {
            Some(raw) => raw.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SESSION_TTL_SECONDS must be a positive integer, got '{raw}'"
                ))
            })?,
            None => TokenConfig::default().session_ttl_seconds,
        };

        let config = Config {
            server: ServerConfig { bind_address },
            storage: StorageConfig {
                backend,
                data_dir,
                users_file,
            },
            tokens: TokenConfig {
                session_ttl_seconds,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }
        if self.tokens.session_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.tokens.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "SESSION_TTL_SECONDS must be at most {MAX_SESSION_TTL_SECONDS}"
            )));
        }
        if self.storage.backend == StorageBackend::Durable && self.storage.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty for the durable backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Users to install at startup.
    ///
    /// The memory backend requires the users file. The durable backend falls
    /// back to [`default_seed_users`] when the file does not exist.
    pub fn initial_users(&self) -> Result<Vec<UserEntry>, ConfigError> {
        let path = &self.storage.users_file;
        if self.storage.backend == StorageBackend::Durable && !path.exists() {
            tracing::info!(path = %path.display(), "Users file not found, using built-in seed users");
            return Ok(default_seed_users());
        }
        load_users(path)
    }
}
