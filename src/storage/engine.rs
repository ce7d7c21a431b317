//! Thread-Safe Key-Value Table
//!
//! This module implements the single shared table every connection reads and
//! writes. Keys and values are arbitrary byte strings.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Instead of one big lock, keys are spread over 64 shards.
//! 2. **RwLock**: Concurrent `get`s on a shard share the lock; `set`/`delete` are exclusive.
//! 3. **One lock per operation**: Every public operation takes exactly one shard
//!    lock and releases it before returning, so no caller ever holds a lock
//!    across a network read or write.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Table                              │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key always maps to the same shard, so all operations on one key are
//! serialized by that shard's lock and linearize in lock-acquisition order.
//!
//! ## Poisoned Locks
//!
//! A shard lock is only poisoned if a thread panicked while holding it. The
//! shard may then hold a half-applied update, so every operation panics
//! instead of serving possibly inconsistent data.

use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of shards in a table.
const NUM_SHARDS: usize = 64;

const POISONED: &str = "table shard lock poisoned; refusing to serve inconsistent data";

/// A single shard containing a portion of the entries.
#[derive(Debug, Default)]
struct Shard {
    entries: RwLock<HashMap<Bytes, Bytes>>,
}

impl Shard {
    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Bytes>> {
        self.entries.read().expect(POISONED)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Bytes>> {
        self.entries.write().expect(POISONED)
    }
}

/// Point-in-time counters for a [`Table`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub keys: u64,
    pub get_ops: u64,
    pub set_ops: u64,
    pub del_ops: u64,
}

/// The shared in-memory key-value table.
///
/// Created once at startup, wrapped in an `Arc` and handed to every
/// connection. Each of [`get`](Table::get), [`set`](Table::set) and
/// [`delete`](Table::delete) is atomic with respect to every other operation
/// on the same table.
///
/// # Example
///
/// ```
/// use linekv::storage::Table;
/// use bytes::Bytes;
///
/// let table = Table::new();
///
/// table.set(Bytes::from("name"), Bytes::from("alice"));
/// assert_eq!(table.get(b"name"), Some(Bytes::from("alice")));
///
/// assert!(table.delete(b"name"));
/// assert!(!table.delete(b"name"));
/// assert_eq!(table.get(b"name"), None);
/// ```
///
/// # Panics
///
/// Every operation panics if the shard it touches has a poisoned lock.
pub struct Table {
    shards: Vec<Shard>,

    /// Number of keys (approximate under concurrent updates)
    key_count: AtomicU64,
    get_count: AtomicU64,
    set_count: AtomicU64,
    del_count: AtomicU64,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
        }
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Returns the current value for `key`, if any.
    ///
    /// The returned `Bytes` is a cheap reference-counted handle to the value
    /// as it was when the read lock was held; later writes never alter it.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        self.shard(key).read().get(key).cloned()
    }

    /// Inserts `key` with `value`, replacing any previous value.
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(&key).write();
        if shard.insert(key, value).is_none() {
            // Counted under the shard lock so the count never underflows.
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(key).write();
        let removed = shard.remove(key).is_some();
        if removed {
            self.key_count.fetch_sub(1, Ordering::Relaxed);
        }

        removed
    }

    /// Returns the number of keys (approximate while writers are active).
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the table counters.
    pub fn stats(&self) -> TableStats {
        TableStats {
            keys: self.key_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
        }
    }
}
