use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub connection_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db: DbConfig,
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db = DbConfig {
            host: var("DB_HOST", "localhost"),
            port: parse_var(&lookup, "DB_PORT", 3306)?,
            user: var("DB_USER", "root"),
            password: var("DB_PASSWORD", ""),
            database: lookup("DB_NAME").context("DB_NAME must be set")?,
            connection_limit: parse_var(&lookup, "DB_CONNECTION_LIMIT", 10)?,
        };
        if db.connection_limit == 0 {
            anyhow::bail!("DB_CONNECTION_LIMIT must be at least 1");
        }

        let log_format = match var("LOG_FORMAT", "json").as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Ok(Self {
            db,
            host: var("APP_HOST", "0.0.0.0"),
            port: parse_var(&lookup, "PORT", 3000)?,
            service_name: var("SERVICE_NAME", "student-api"),
            log_format,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
