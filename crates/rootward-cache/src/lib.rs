//! # Rootward DNS Cache
//!
//! A TTL-bounded cache mapping (owner name, type) to a single record plus
//! its insertion instant. The cache is owned by the server's event loop and
//! never shared across threads, so it is a plain map with no interior
//! locking; every operation takes `now` so expiry is deterministic under
//! test.
//!
//! One record per key is a deliberate simplification: a later record for the
//! same key overwrites the earlier one and refreshes the timestamp.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod key;

pub use key::CacheKey;

use rootward_proto::{Name, ResourceRecord, Type};
use std::collections::HashMap;
use std::time::Instant;
use tracing::trace;

/// A cached record with its insertion time.
#[derive(Debug, Clone)]
struct CachedRecord {
    /// The record as received.
    record: ResourceRecord,
    /// When it was inserted.
    inserted_at: Instant,
}

impl CachedRecord {
    /// Returns true if the record has outlived its TTL at `now`.
    fn is_expired(&self, now: Instant) -> bool {
        self.record.is_expired(self.inserted_at, now)
    }
}

/// TTL-bounded record cache.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: HashMap<CacheKey, CachedRecord>,
}

impl RecordCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record at (owner, type), stamping it with `now`.
    ///
    /// An existing entry under the same key is overwritten and its
    /// timestamp refreshed.
    pub fn put(&mut self, record: ResourceRecord, now: Instant) {
        let key = CacheKey::new(record.name(), record.rtype());
        self.entries.insert(
            key,
            CachedRecord {
                record,
                inserted_at: now,
            },
        );
    }

    /// Returns the unexpired record at (name, type), if any.
    pub fn get(&self, name: &Name, rtype: Type, now: Instant) -> Option<&ResourceRecord> {
        let key = CacheKey::new(name, rtype);
        let cached = self.entries.get(&key)?;

        if cached.is_expired(now) {
            None
        } else {
            Some(&cached.record)
        }
    }

    /// Drops every expired entry.
    pub fn sweep(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, cached| !cached.is_expired(now));

        let dropped = before - self.entries.len();
        if dropped > 0 {
            trace!(dropped, remaining = self.entries.len(), "cache swept");
        }
    }

    /// Returns every unexpired record.
    ///
    /// Used to synthesise responses from cache.
    pub fn snapshot(&self, now: Instant) -> Vec<ResourceRecord> {
        self.entries
            .values()
            .filter(|cached| !cached.is_expired(now))
            .map(|cached| cached.record.clone())
            .collect()
    }

    /// Returns the number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
