//! Background Tasks Module
//!
//! Contains background tasks that run alongside a local store.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired local-store entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
