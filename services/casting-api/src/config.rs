use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";
pub const DEFAULT_ALGORITHM: &str = "RS256";
pub const DEFAULT_JWKS_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PG_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PG_TIMEOUT_MS: u64 = 5_000;
const JWKS_PATH: &str = ".well-known/jwks.json";

// Casting API configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => bail!("unknown storage backend {other:?}; expected memory or postgres"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    /// Explicit key set location; derived from the issuer when unset.
    pub jwks_url: Option<String>,
    pub algorithm: String,
    pub jwks_timeout_ms: u64,
    pub leeway_seconds: u64,
}

impl AuthSettings {
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!("{}/{JWKS_PATH}", self.issuer.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    postgres: Option<PostgresOverride>,
    auth: Option<AuthOverride>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostgresOverride {
    url: Option<String>,
    max_connections: Option<u32>,
    connect_timeout_ms: Option<u64>,
    acquire_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthOverride {
    issuer: Option<String>,
    audience: Option<String>,
    jwks_url: Option<String>,
    algorithm: Option<String>,
    jwks_timeout_ms: Option<u64>,
    leeway_seconds: Option<u64>,
}

impl ApiConfig {
    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Ok(path) = std::env::var("CASTING_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CASTING_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read settings through `lookup` without checking required values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("CASTING_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse CASTING_BIND")?;
        let metrics_bind = lookup("CASTING_METRICS_BIND")
            .unwrap_or_else(|| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse CASTING_METRICS_BIND")?;
        let storage = match lookup("CASTING_STORAGE") {
            Some(value) => StorageBackend::parse(&value).with_context(|| "parse CASTING_STORAGE")?,
            None => StorageBackend::Memory,
        };
        let postgres = match lookup("DATABASE_URL") {
            Some(url) => Some(PostgresConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "CASTING_PG_MAX_CONNECTIONS",
                    DEFAULT_PG_MAX_CONNECTIONS,
                )?,
                connect_timeout_ms: parse_or(
                    &lookup,
                    "CASTING_PG_CONNECT_TIMEOUT_MS",
                    DEFAULT_PG_TIMEOUT_MS,
                )?,
                acquire_timeout_ms: parse_or(
                    &lookup,
                    "CASTING_PG_ACQUIRE_TIMEOUT_MS",
                    DEFAULT_PG_TIMEOUT_MS,
                )?,
            }),
            None => None,
        };
        let auth = AuthSettings {
            issuer: lookup("CASTING_AUTH_ISSUER").unwrap_or_default(),
            audience: lookup("CASTING_AUTH_AUDIENCE").unwrap_or_default(),
            jwks_url: lookup("CASTING_AUTH_JWKS_URL"),
            algorithm: lookup("CASTING_AUTH_ALGORITHM")
                .unwrap_or_else(|| DEFAULT_ALGORITHM.to_string()),
            jwks_timeout_ms: parse_or(
                &lookup,
                "CASTING_AUTH_JWKS_TIMEOUT_MS",
                DEFAULT_JWKS_TIMEOUT_MS,
            )?,
            leeway_seconds: parse_or(&lookup, "CASTING_AUTH_LEEWAY_SECONDS", 0)?,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            auth,
        })
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ApiConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse casting api config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = StorageBackend::parse(&value).with_context(|| "parse storage")?;
        }
        if let Some(pg) = override_cfg.postgres {
            let current = self.postgres.take();
            let url = match (pg.url, current.as_ref()) {
                (Some(url), _) => url,
                (None, Some(existing)) => existing.url.clone(),
                (None, None) => bail!("postgres override requires url"),
            };
            self.postgres = Some(PostgresConfig {
                url,
                max_connections: pg
                    .max_connections
                    .or(current.as_ref().map(|c| c.max_connections))
                    .unwrap_or(DEFAULT_PG_MAX_CONNECTIONS),
                connect_timeout_ms: pg
                    .connect_timeout_ms
                    .or(current.as_ref().map(|c| c.connect_timeout_ms))
                    .unwrap_or(DEFAULT_PG_TIMEOUT_MS),
                acquire_timeout_ms: pg
                    .acquire_timeout_ms
                    .or(current.as_ref().map(|c| c.acquire_timeout_ms))
                    .unwrap_or(DEFAULT_PG_TIMEOUT_MS),
            });
        }
        if let Some(auth) = override_cfg.auth {
            if let Some(value) = auth.issuer {
                self.auth.issuer = value;
            }
            if let Some(value) = auth.audience {
                self.auth.audience = value;
            }
            if let Some(value) = auth.jwks_url {
                self.auth.jwks_url = Some(value);
            }
            if let Some(value) = auth.algorithm {
                self.auth.algorithm = value;
            }
            if let Some(value) = auth.jwks_timeout_ms {
                self.auth.jwks_timeout_ms = value;
            }
            if let Some(value) = auth.leeway_seconds {
                self.auth.leeway_seconds = value;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.issuer.trim().is_empty() {
            bail!("CASTING_AUTH_ISSUER is required");
        }
        if self.auth.audience.trim().is_empty() {
            bail!("CASTING_AUTH_AUDIENCE is required");
        }
        if self.auth.jwks_timeout_ms == 0 {
            bail!("CASTING_AUTH_JWKS_TIMEOUT_MS must be positive");
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value.trim().parse().with_context(|| format!("parse {key}")),
        None => Ok(default),
    }
}
