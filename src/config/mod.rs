//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `VECGATE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use crate::batch::{BatchConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENCY};
use crate::vectordb::{
    DEFAULT_MAX_IN_FLIGHT, DEFAULT_STORE_HOST, DEFAULT_STORE_PORT, DEFAULT_TIMEOUT_MS, StoreConfig,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VECGATE_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Vector store host. Default: `localhost`.
    pub store_host: String,

    /// Vector store gRPC port. Default: `6334`.
    pub store_port: u16,

    /// Vector store credential. Never logged.
    pub store_api_key: Option<String>,

    /// Connect to the store over TLS. Default: `false`.
    pub store_tls: bool,

    /// Per-call store timeout in milliseconds. Default: `5000`.
    pub store_timeout_ms: u64,

    /// Max concurrent store calls. Default: `64`.
    pub store_max_in_flight: usize,

    /// Documents per batch chunk. Default: `64`.
    pub batch_chunk_size: usize,

    /// Concurrent chunk writes per batch. Default: `4`.
    pub batch_concurrency: usize,

    /// Allowed CORS origins. Empty disables CORS; `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            store_host: DEFAULT_STORE_HOST.to_string(),
            store_port: DEFAULT_STORE_PORT,
            store_api_key: None,
            store_tls: false,
            store_timeout_ms: DEFAULT_TIMEOUT_MS,
            store_max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            batch_chunk_size: DEFAULT_CHUNK_SIZE,
            batch_concurrency: DEFAULT_MAX_CONCURRENCY,
            cors_origins: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("store_host", &self.store_host)
            .field("store_port", &self.store_port)
            .field(
                "store_api_key",
                &self.store_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("store_tls", &self.store_tls)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("store_max_in_flight", &self.store_max_in_flight)
            .field("batch_chunk_size", &self.batch_chunk_size)
            .field("batch_concurrency", &self.batch_concurrency)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Config {
    const ENV_PORT: &'static str = "VECGATE_PORT";
    const ENV_BIND_ADDR: &'static str = "VECGATE_BIND_ADDR";
    const ENV_STORE_HOST: &'static str = "VECGATE_STORE_HOST";
    const ENV_STORE_PORT: &'static str = "VECGATE_STORE_PORT";
    const ENV_STORE_API_KEY: &'static str = "VECGATE_STORE_API_KEY";
    const ENV_STORE_TLS: &'static str = "VECGATE_STORE_TLS";
    const ENV_STORE_TIMEOUT_MS: &'static str = "VECGATE_STORE_TIMEOUT_MS";
    const ENV_STORE_MAX_IN_FLIGHT: &'static str = "VECGATE_STORE_MAX_IN_FLIGHT";
    const ENV_BATCH_CHUNK_SIZE: &'static str = "VECGATE_BATCH_CHUNK_SIZE";
    const ENV_BATCH_CONCURRENCY: &'static str = "VECGATE_BATCH_CONCURRENCY";
    const ENV_CORS_ORIGINS: &'static str = "VECGATE_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(Self::ENV_PORT, defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            store_host: Self::parse_string_from_env(Self::ENV_STORE_HOST, defaults.store_host),
            store_port: Self::parse_port_from_env(Self::ENV_STORE_PORT, defaults.store_port)?,
            store_api_key: Self::parse_optional_string_from_env(Self::ENV_STORE_API_KEY),
            store_tls: Self::parse_bool_from_env(Self::ENV_STORE_TLS, defaults.store_tls)?,
            store_timeout_ms: Self::parse_number_from_env(
                Self::ENV_STORE_TIMEOUT_MS,
                defaults.store_timeout_ms,
            )?,
            store_max_in_flight: Self::parse_number_from_env(
                Self::ENV_STORE_MAX_IN_FLIGHT,
                defaults.store_max_in_flight,
            )?,
            batch_chunk_size: Self::parse_number_from_env(
                Self::ENV_BATCH_CHUNK_SIZE,
                defaults.batch_chunk_size,
            )?,
            batch_concurrency: Self::parse_number_from_env(
                Self::ENV_BATCH_CONCURRENCY,
                defaults.batch_concurrency,
            )?,
            cors_origins: Self::parse_list_from_env(Self::ENV_CORS_ORIGINS),
        })
    }

    /// Checks invariants that parsing alone does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_STORE_TIMEOUT_MS,
            });
        }
        if self.store_max_in_flight == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_STORE_MAX_IN_FLIGHT,
            });
        }
        self.batch_config().validate()
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            host: self.store_host.clone(),
            port: self.store_port,
            api_key: self.store_api_key.clone(),
            use_tls: self.store_tls,
            timeout: Duration::from_millis(self.store_timeout_ms),
            max_in_flight: self.store_max_in_flight,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::default()
            .chunk_size(self.batch_chunk_size)
            .max_concurrency(self.batch_concurrency)
    }

    fn parse_port_from_env(var_name: &'static str, default: u16) -> Result<u16, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let port: u16 = value.trim().parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidNumber {
                    name,
                    value,
                    source,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_list_from_env(var_name: &str) -> Vec<String> {
        env::var(var_name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
