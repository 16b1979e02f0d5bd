//! unicache smoke check
//!
//! Builds a cache from the environment and runs one write/read/delete cycle
//! against it. Exits non-zero when the backend cannot be reached or does not
//! honour the cache contract.

use std::time::Duration;

use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unicache::{Cache, CacheConfig, CacheError};

const CHECK_KEY: &str = "unicache:smoke-check";
const CHECK_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Marker {
    pid: u32,
    issued_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unicache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().context("failed to load cache configuration")?;
    info!(
        "Configuration loaded: backend={}, prefix={}",
        config.backend, config.prefix
    );

    let cache = Cache::new(config).context("failed to initialize cache")?;

    let marker = Marker {
        pid: std::process::id(),
        issued_at: Utc::now(),
    };

    cache
        .set_with_ttl(CHECK_KEY, &marker, CHECK_TTL)
        .await
        .context("marker write failed")?;

    let echoed: Marker = cache.get(CHECK_KEY).await.context("marker read failed")?;
    ensure!(echoed == marker, "marker read back {:?}, wrote {:?}", echoed, marker);

    cache
        .delete(CHECK_KEY)
        .await
        .context("marker delete failed")?;

    match cache.get::<Marker>(CHECK_KEY).await {
        Err(CacheError::NotFound) => {}
        Ok(stale) => bail!("marker still readable after delete: {:?}", stale),
        Err(err) => return Err(err).context("marker re-read failed"),
    }

    info!(
        "Smoke check succeeded against {} backend at {}",
        cache.backend_kind(),
        cache.physical_key(CHECK_KEY)
    );
    Ok(())
}
