//! unicache - one key/value cache API over interchangeable backends
//!
//! A [`Cache`] is backed either by a bounded in-process store or by Redis.
//! Callers see the same operations, the same namespacing and the same
//! [`CacheError::NotFound`] on a miss whichever backend is configured.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use unicache::{Cache, CacheConfig, CacheError};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), CacheError> {
//! let cache = Cache::new(CacheConfig::local("app"))?;
//! cache.set("user:1", &User { name: "Ada".into() }).await?;
//!
//! let user: User = cache.get("user:1").await?;
//! assert_eq!(user.name, "Ada");
//!
//! cache.delete("user:1").await?;
//! assert!(cache.get::<User>("user:1").await.unwrap_err().is_not_found());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod key;
pub mod tasks;

pub use cache::{CacheBackend, LocalStore, RedisStore};
pub use config::{BackendKind, CacheConfig, LocalStoreConfig};
pub use error::{CacheError, ConfigError, Result, StoreError};
pub use facade::Cache;
pub use tasks::spawn_cleanup_task;
