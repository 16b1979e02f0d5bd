//! TTL Cleanup Task
//!
//! Background task that periodically removes expired local-store entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LocalStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task holds only a weak reference to the store: it exits on the first
/// tick after every [`LocalStore`] clone has been dropped. The returned
/// handle can also be aborted explicitly.
///
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let store = LocalStore::new(&LocalStoreConfig { cleanup_interval: None, ..Default::default() })?;
/// let handle = spawn_cleanup_task(&store, Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(store: &LocalStore, interval: Duration) -> JoinHandle<()> {
    let weak = Arc::downgrade(store.engine());

    tokio::spawn(async move {
        debug!(?interval, "starting local store expiry sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let Some(engine) = weak.upgrade() else {
                debug!("local store dropped, stopping expiry sweeper");
                break;
            };

            let (removed, stats) = {
                let mut engine = engine.lock().await;
                (engine.cleanup_expired(), engine.stats())
            };

            if removed > 0 {
                info!(
                    entries = stats.total_entries,
                    hit_rate = stats.hit_rate(),
                    "TTL cleanup: removed {} expired entries",
                    removed
                );
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
