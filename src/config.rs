use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which `TaskStore`/`UserStore` implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" | "local" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub mongo_uri: Option<String>,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub instance_id: String,
}

const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:5174,http://localhost:3000";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let storage_backend = parse_var("STORAGE_BACKEND", StorageBackend::Mongo)?;
        let mongo_uri = env::var("MONGO_URI").ok();
        if storage_backend == StorageBackend::Mongo && mongo_uri.is_none() {
            return Err(ConfigError::Missing("MONGO_URI"));
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            storage_backend,
            mongo_uri,
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "growlog".to_string()),
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 7001)?,
            allowed_origins,
            instance_id: env::var("INSTANCE_ID").unwrap_or_else(|_| "default".to_string()),
        })
    }

    /// In-memory configuration for tests. Uses the cheapest bcrypt cost.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            mongo_uri: None,
            database_name: "growlog_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
            host: "127.0.0.1".to_string(),
            port: 7001,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            instance_id: "test".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
