//! Distributed Store Module
//!
//! Redis-backed store. The client is built eagerly but the connection is
//! only opened by the first operation, then shared by every later one.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::cache::{normalize_ttl, CacheBackend};
use crate::config::BackendKind;
use crate::error::{ConfigError, StoreError, StoreResult};

// == Redis Store ==
/// Store backed by a Redis server.
pub struct RedisStore {
    client: redis::Client,
    endpoint: String,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisStore {
    /// Builds a client for `endpoint` without touching the network.
    ///
    /// Accepts a bare `host:port` address or a full `redis://`, `rediss://`
    /// or `unix://` URL.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let url = connection_url(endpoint);
        let client =
            redis::Client::open(url.as_str()).map_err(|source| ConfigError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source,
            })?;

        debug!(endpoint, "redis store created, connection deferred");
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            connection: OnceCell::new(),
        })
    }

    /// Address this store was built for.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true once the lazy connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                debug!(endpoint = %self.endpoint, "opening redis connection");
                self.client.get_multiplexed_async_connection().await
            })
            .await?;
        Ok(conn.clone())
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl CacheBackend for RedisStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Distributed
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        match normalize_ttl(ttl) {
            Some(ttl) => conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        // Redis answers a missing or expired key with a nil reply
        value.ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

fn connection_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("redis://{}", endpoint)
    }
}

/// PX takes whole, positive milliseconds; shorter TTLs round up to 1 ms.
///
/// Callers pass TTLs already bounded by [`normalize_ttl`], so the result
/// stays well inside the range Redis accepts.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
