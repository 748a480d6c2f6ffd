/*
 * Responsibility
 * - Load settings from the environment (.env supported): DATABASE_URL, token keys, stable service URL...
 * - Validate values up front (missing/invalid -> fail at startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material used to verify access tokens issued by the identity service.
#[derive(Clone, PartialEq, Eq)]
pub enum AccessTokenKey {
    /// HS256 shared secret.
    Secret(String),
    /// Ed25519 public key (PEM), verified as EdDSA.
    Ed25519PublicPem(String),
}

impl fmt::Debug for AccessTokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Secret(_) => f.write_str("Secret(..)"),
            Self::Ed25519PublicPem(_) => f.write_str("Ed25519PublicPem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    pub access_token_key: AccessTokenKey,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,

    pub stable_service_url: Url,
    pub stable_service_timeout: Option<Duration>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections =
            parse_or(get("DATABASE_MAX_CONNECTIONS"), 10, "DATABASE_MAX_CONNECTIONS")?;

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("RUN_MIGRATIONS"))?,
            None => true,
        };

        let access_token_key = match (get("JWT_SECRET"), get("ACCESS_JWT_PUBLIC_KEY_PEM")) {
            (Some(secret), _) => AccessTokenKey::Secret(secret),
            (None, Some(pem)) => AccessTokenKey::Ed25519PublicPem(pem.replace("\\n", "\n")),
            (None, None) => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let auth_issuer = get("AUTH_ISSUER");
        let auth_audience = get("AUTH_AUDIENCE");

        let access_token_leeway_seconds = parse_or(
            get("ACCESS_TOKEN_LEEWAY_SECONDS"),
            60,
            "ACCESS_TOKEN_LEEWAY_SECONDS",
        )?;

        let stable_service_url = get("STABLE_SERVICE_URL")
            .unwrap_or_else(|| "http://localhost:8080/stables".to_string());
        let stable_service_url =
            Url::parse(&stable_service_url).map_err(|_| ConfigError::Invalid("STABLE_SERVICE_URL"))?;
        if !matches!(stable_service_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("STABLE_SERVICE_URL"));
        }

        let stable_service_timeout = match get("STABLE_SERVICE_TIMEOUT_SECONDS") {
            Some(raw) => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("STABLE_SERVICE_TIMEOUT_SECONDS"))?,
            )),
            None => None,
        };

        let request_timeout = Duration::from_secs(parse_or(
            get("REQUEST_TIMEOUT_SECONDS"),
            30,
            "REQUEST_TIMEOUT_SECONDS",
        )?);

        let request_body_limit_bytes = parse_or(
            get("REQUEST_BODY_LIMIT_BYTES"),
            1024 * 1024,
            "REQUEST_BODY_LIMIT_BYTES",
        )?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            run_migrations,
            access_token_key,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            stable_service_url,
            stable_service_timeout,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    default: T,
    key: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
