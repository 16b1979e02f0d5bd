//! Cache Entry Module
//!
//! Defines the structure for individual local-store entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::normalize_ttl;

// == Cache Entry ==
/// A stored value with its expiration deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded value bytes
    pub value: Vec<u8>,
    /// Deadline after which the entry is dead, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// Zero and overlong TTLs store the entry without expiration.
    pub fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = normalize_ttl(ttl).map(|ttl| Instant::now() + ttl);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a fixed instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    // == Cost ==
    /// Budget units charged for this entry.
    pub fn cost(&self) -> u64 {
        self.value.len() as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MAX_TTL;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(b"test_value".to_vec(), None);

        assert_eq!(entry.value, b"test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(b"test_value".to_vec(), Some(Duration::from_secs(60)));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(b"v".to_vec(), Some(Duration::from_millis(50)));

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(80));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::new(b"v".to_vec(), Some(Duration::ZERO));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_overlong_ttl_never_expires() {
        for ttl in [MAX_TTL + Duration::from_secs(1), Duration::MAX] {
            let entry = CacheEntry::new(b"v".to_vec(), Some(ttl));
            assert!(entry.expires_at.is_none());
        }
        assert!(CacheEntry::new(b"v".to_vec(), Some(MAX_TTL)).expires_at.is_some());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: b"v".to_vec(),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - Duration::from_millis(1)));
    }

    #[test]
    fn test_cost_is_value_length() {
        let entry = CacheEntry::new(vec![0u8; 42], None);
        assert_eq!(entry.cost(), 42);
    }
}
