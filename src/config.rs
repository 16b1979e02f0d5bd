//! Configuration Module
//!
//! Describes which backend the cache uses, the key namespace, and the budgets
//! of the in-process store. Values can be loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::key::DEFAULT_PREFIX;

// == Backend Kind ==
/// Which concrete store services the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-process bounded store
    #[default]
    Local,
    /// Networked Redis store
    Distributed,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Distributed => f.write_str("distributed"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "memory" => Ok(BackendKind::Local),
            "distributed" | "redis" => Ok(BackendKind::Distributed),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

// == Local Store Config ==
/// Budgets of the in-process store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStoreConfig {
    /// Maximum number of tracked entries
    pub max_entries: usize,
    /// Maximum total cost in bytes of all stored values
    pub max_cost: u64,
    /// Upper bound on entries evicted in one eviction pass
    pub eviction_batch: usize,
    /// Interval of the background expiry sweep, None disables it
    pub cleanup_interval: Option<Duration>,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000_000,
            max_cost: 1 << 30,
            eviction_batch: 64,
            cleanup_interval: Some(Duration::from_secs(1)),
        }
    }
}

impl LocalStoreConfig {
    /// Checks that every budget is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(invalid("max_entries", "must be greater than zero"));
        }
        if self.max_cost == 0 {
            return Err(invalid("max_cost", "must be greater than zero"));
        }
        if self.eviction_batch == 0 {
            return Err(invalid("eviction_batch", "must be greater than zero"));
        }
        if self.cleanup_interval == Some(Duration::ZERO) {
            return Err(invalid("cleanup_interval", "must be non-zero when set"));
        }
        Ok(())
    }
}

// == Cache Config ==
/// Everything needed to build a [`Cache`](crate::Cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Namespace prepended to every logical key
    pub prefix: String,
    /// Selected backend
    pub backend: BackendKind,
    /// Redis address, required for the distributed backend
    pub distributed_endpoint: Option<String>,
    /// Budgets used when the local backend is selected
    pub local: LocalStoreConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            backend: BackendKind::Local,
            distributed_endpoint: None,
            local: LocalStoreConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Local backend with the given namespace and default budgets.
    pub fn local(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Distributed backend at `endpoint` with the given namespace.
    pub fn distributed(prefix: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            backend: BackendKind::Distributed,
            distributed_endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Returns the endpoint when it is set and not blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.distributed_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Enforces the configuration invariants for the selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::Local => self.local.validate(),
            BackendKind::Distributed => self
                .endpoint()
                .map(|_| ())
                .ok_or(ConfigError::MissingEndpoint),
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Key namespace (default: "default")
    /// - `CACHE_BACKEND` - `local` or `redis`/`distributed` (default: local)
    /// - `CACHE_REDIS_URL` - Redis address, required for the distributed backend
    /// - `CACHE_MAX_ENTRIES` - Local entry budget (default: 1000000)
    /// - `CACHE_MAX_COST` - Local byte budget (default: 1 GiB)
    /// - `CACHE_EVICTION_BATCH` - Local eviction batch size (default: 64)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Local expiry sweep interval, 0 disables (default: 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("CACHE_BACKEND") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => defaults.backend,
        };

        let cleanup_interval = match parse_var::<u64, _>(&lookup, "CACHE_CLEANUP_INTERVAL_MS")? {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.local.cleanup_interval,
        };

        Ok(Self {
            prefix: lookup("CACHE_PREFIX").unwrap_or(defaults.prefix),
            backend,
            distributed_endpoint: lookup("CACHE_REDIS_URL"),
            local: LocalStoreConfig {
                max_entries: parse_var(&lookup, "CACHE_MAX_ENTRIES")?
                    .unwrap_or(defaults.local.max_entries),
                max_cost: parse_var(&lookup, "CACHE_MAX_COST")?.unwrap_or(defaults.local.max_cost),
                eviction_batch: parse_var(&lookup, "CACHE_EVICTION_BATCH")?
                    .unwrap_or(defaults.local.eviction_batch),
                cleanup_interval,
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(name, e.to_string())),
        None => Ok(None),
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSetting {
        name,
        reason: reason.into(),
    }
}
