//! In-memory cache of decoded file bodies.
//!
//! Each key owns a slot guarded by its own lock, so concurrent callers asking
//! for the same key wait for the first fetch instead of issuing their own.
//! Only successfully decoded bodies are stored; transport and decode failures
//! leave the slot empty for a later retry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::error::{Result, ScoutError};

type Slot = Arc<Mutex<Option<String>>>;

#[derive(Debug, Default)]
pub struct ContentCache {
    slots: Mutex<HashMap<String, Slot>>,
    entries: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    decode_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub decode_failures: u64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decoded body for `key`, calling `fetch` for the raw base64
    /// payload only when nothing is stored yet.
    ///
    /// `Ok(None)` means the payload arrived but could not be decoded.
    pub fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<Option<String>>
    where
        F: FnOnce() -> Result<String>,
    {
        let slot = self.slot(key);
        let mut stored = lock(&slot);
        if let Some(text) = stored.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "content cache hit");
            return Ok(Some(text.clone()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let raw = fetch()?;
        match decode_content(key, &raw) {
            Ok(text) => {
                *stored = Some(text.clone());
                self.count_entry(key, &slot);
                Ok(Some(text))
            }
            Err(err) => {
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %err, "skipping undecodable file content");
                Ok(None)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let slot = lock(&self.slots).get(key).cloned()?;
        lock(&slot).clone()
    }

    /// Number of stored bodies. Never waits on an in-flight fetch.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut slots = lock(&self.slots);
        slots.clear();
        self.entries.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len() as u64,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Counts a freshly stored body unless `clear` detached its slot meanwhile.
    /// Slot locks are always taken before the map lock, never the reverse.
    fn count_entry(&self, key: &str, slot: &Slot) {
        let slots = lock(&self.slots);
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            self.entries.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Decodes a contents-API payload: base64 wrapped at 60 columns.
pub fn decode_content(path: &str, raw: &str) -> Result<String> {
    let compact: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let bytes = STANDARD
        .decode(compact.trim())
        .map_err(|source| ScoutError::Decode {
            path: path.to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
