use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the storage connection string when set.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
const ENV_PREFIX: &str = "BIDREC";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::config(format!("invalid server address {}:{}: {}", self.host, self.port, e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// JSON file with `bids` and `listings` arrays, loaded by the memory backend.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl StorageConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                workers: num_cpus::get(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                url: "postgresql://localhost:5432/auction_app".to_string(),
                max_connections: 10,
                min_connections: 1,
                connect_timeout_secs: 10,
                seed_file: None,
            },
            recommendation: RecommendationConfig { top_n: 5 },
        }
    }
}

impl Config {
    /// Defaults, then the optional file, then `BIDREC_*` variables, then `DATABASE_URL`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                config.storage.url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        Self::load(Some(path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be non-zero"));
        }
        if self.server.workers == 0 {
            return Err(Error::config("server.workers must be at least 1"));
        }
        if self.recommendation.top_n == 0 {
            return Err(Error::config("recommendation.top_n must be at least 1"));
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.url.trim().is_empty() {
            return Err(Error::config("storage.url is required for the postgres backend"));
        }
        if self.storage.min_connections > self.storage.max_connections {
            return Err(Error::config(
                "storage.min_connections cannot exceed storage.max_connections",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // `Config::load` reads process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.recommendation.top_n, 5);
        assert!(config.server.workers >= 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.server.socket_addr().unwrap().port(), 5001);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.recommendation.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.url = "  ".to_string();
        assert!(config.validate().is_err());

        config.storage.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = write_toml(
            r#"
[server]
port = 6001

[storage]
backend = "memory"

[recommendation]
top_n = 3
"#,
        );

        let path = file.path().to_str().unwrap().to_string();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 6001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.recommendation.top_n, 3);
    }

    #[test]
    fn test_invalid_host_is_an_error() {
        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        assert!(config.server.socket_addr().is_err());
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = write_toml(
            r#"
[server]
port = 6001
host = "127.0.0.1"

[storage]
url = "postgresql://file-host:5432/from_file"

[recommendation]
top_n = 3
"#,
        );

        std::env::set_var("BIDREC_SERVER__PORT", "7777");
        std::env::set_var("BIDREC_RECOMMENDATION__TOP_N", "2");
        std::env::set_var(DATABASE_URL_ENV, "postgresql://env-host:5432/auction_app");

        let result = Config::load(file.path().to_str());

        std::env::remove_var("BIDREC_SERVER__PORT");
        std::env::remove_var("BIDREC_RECOMMENDATION__TOP_N");
        std::env::remove_var(DATABASE_URL_ENV);

        let config = result.unwrap();
        assert_eq!(config.server.port, 7777);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.recommendation.top_n, 2);
        assert_eq!(config.storage.url, "postgresql://env-host:5432/auction_app");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.max_connections, 10);
    }
}
