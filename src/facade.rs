//! Cache Facade
//!
//! [`Cache`] is the handle callers use: it composes namespaced keys, encodes
//! values, delegates to the selected store and normalizes store errors.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{select_backend, CacheBackend};
use crate::codec;
use crate::config::{BackendKind, CacheConfig};
use crate::error::{ConfigError, Result};
use crate::key::compose_key;

// == Cache ==
/// An initialized cache: a store handle plus the namespace prefix.
///
/// Cloning is cheap and clones share the same store, so one `Cache` built at
/// startup can be handed to every task. Replacing it with a cache built from
/// a different configuration is up to the owner.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheBackend>,
    prefix: Arc<str>,
}

impl Cache {
    /// Builds the backend described by `config`.
    ///
    /// Fails without producing a cache when the configuration is invalid.
    pub fn new(config: CacheConfig) -> std::result::Result<Self, ConfigError> {
        let store = select_backend(&config)?;
        Ok(Self::with_store(config.prefix, store))
    }

    /// Wraps an existing store. Several caches may share one store under
    /// different prefixes without seeing each other's entries.
    pub fn with_store(prefix: impl Into<String>, store: Arc<dyn CacheBackend>) -> Self {
        Self {
            store,
            prefix: Arc::from(prefix.into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.store.kind()
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CacheBackend> {
        &self.store
    }

    /// Physical key for a logical key in this cache's namespace.
    pub fn physical_key(&self, key: &str) -> String {
        compose_key(&self.prefix, key)
    }

    // == Set ==
    /// Stores `value` under `key` without expiration, overwriting any entry.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write(key, value, None).await
    }

    // == Set With TTL ==
    /// Stores `value` under `key`; it stops being readable once `ttl` elapses.
    ///
    /// How promptly an expired entry disappears is up to the backend.
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write(key, value, Some(ttl)).await
    }

    // == Get ==
    /// Reads and decodes the value stored under `key`.
    ///
    /// Returns [`CacheError::NotFound`](crate::CacheError::NotFound) when the
    /// key is absent or expired, whatever the backend. A stored value that
    /// does not decode as `T` is a decode error, not a miss.
    pub async fn get<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.store.get(&self.physical_key(key)).await?;
        codec::decode(&bytes)
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key succeeds.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&self.physical_key(key)).await?;
        Ok(())
    }

    async fn write<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = codec::encode(value)?;
        self.store.set(&self.physical_key(key), bytes, ttl).await?;
        Ok(())
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("prefix", &self.prefix)
            .field("store", &self.store)
            .finish()
    }
}
