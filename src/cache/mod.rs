//! Cache Module
//!
//! The store capability set shared by every backend, the two concrete
//! stores, and the selector that builds one from a [`CacheConfig`].

mod distributed;
mod entry;
mod local;
mod lru;
mod stats;


use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::{BackendKind, CacheConfig};
use crate::error::{ConfigError, StoreResult};

// Re-export public types
pub use distributed::RedisStore;
pub(crate) use entry::CacheEntry;
pub use local::LocalStore;
pub(crate) use lru::LruTracker;
pub use stats::CacheStats;

// == TTL Rules ==
/// Longest TTL that still expires; longer ones are stored without expiry.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Applies the TTL rules shared by every store: a zero or overlong TTL
/// means the entry does not expire.
pub fn normalize_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero() && *ttl <= MAX_TTL)
}

// == Cache Backend ==
/// Operations every store provides on physical keys and encoded bytes.
///
/// `get` reports an absent key with an error for which
/// [`StoreError::is_not_found`](crate::error::StoreError::is_not_found)
/// holds; each store chooses its own variant.
#[async_trait]
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Which kind of backend this is.
    fn kind(&self) -> BackendKind;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()>;

    /// Fetches the bytes stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Removes `key`; absent keys are not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

// == Backend Selector ==
/// Builds the store described by `config`.
///
/// The configuration is validated first, so no store is built from a
/// partially valid configuration.
pub fn select_backend(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>, ConfigError> {
    config.validate()?;

    let store: Arc<dyn CacheBackend> = match config.backend {
        BackendKind::Local => Arc::new(LocalStore::new(&config.local)?),
        BackendKind::Distributed => {
            let endpoint = config.endpoint().ok_or(ConfigError::MissingEndpoint)?;
            Arc::new(RedisStore::new(endpoint)?)
        }
    };

    info!(backend = %config.backend, prefix = %config.prefix, "cache backend selected");
    Ok(store)
}
