//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror. Store implementations
//! report failures through [`StoreError`]; the facade turns those into
//! [`CacheError`], collapsing every backend-specific "key absent" signal into
//! a single [`CacheError::NotFound`].

use thiserror::Error;

// == Cache Error Enum ==
/// Error returned by every facade operation.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The logical key has no live entry (never set, deleted, or expired).
    #[error("key not found")]
    NotFound,

    /// The value could not be serialized into the wire encoding
    #[error("failed to encode value: {0}")]
    Encode(#[source] bincode::Error),

    /// The stored bytes could not be deserialized into the requested type
    #[error("failed to decode value: {0}")]
    Decode(#[source] bincode::Error),

    /// Any other failure reported by the underlying store, passed through as-is
    #[error(transparent)]
    Backend(StoreError),

    /// Invalid configuration, only produced while building a cache
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// Returns true for the normalized cache-miss signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}

// == Not-found Normalization ==
impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            CacheError::NotFound
        } else {
            CacheError::Backend(err)
        }
    }
}

// == Store Error Enum ==
/// Error reported by a concrete store implementation.
///
/// Each backend signals an absent key its own way: the local store
/// distinguishes missing keys from expired ones, Redis answers a nil reply.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key not present in the local store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key was present in the local store but its TTL has elapsed
    #[error("Key expired: {0}")]
    Expired(String),

    /// Value can never fit in the local store's budget
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Error reported by the Redis client (I/O, protocol, server error)
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl StoreError {
    /// Returns true when the error means "no live entry for this key".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Expired(_))
    }
}

// == Config Error Enum ==
/// Error raised while validating a configuration or building a backend.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Distributed backend selected without an endpoint
    #[error("initialization with the distributed backend needs an endpoint")]
    MissingEndpoint,

    /// Endpoint could not be parsed into a Redis connection target
    #[error("invalid distributed endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: redis::RedisError,
    },

    /// Backend kind string did not name a known backend
    #[error("unknown cache backend: {0}")]
    UnknownBackend(String),

    /// A local store budget or environment value is unusable
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

// == Result Type Alias ==
/// Convenience Result type for facade operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type used by store implementations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
