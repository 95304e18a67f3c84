//! In-memory TTL cache store.
//!
//! Values are stored as type-erased JSON snapshots so one store can hold
//! any serializable type; typed callers deserialize on read. Expired
//! entries are dropped lazily on read and proactively by the registry's
//! sweep task.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct CacheEntry {
  data: Value,
  expiry: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
  entries: HashMap<String, CacheEntry>,
  hits: u64,
  misses: u64,
}

/// Hit/miss accounting snapshot for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  pub hits: u64,
  pub misses: u64,
  pub entries: usize,
}

/// One logical cache domain: prefixed keys, its own default TTL, bounded
/// entry count with soonest-expiry eviction.
#[derive(Clone)]
pub struct CacheStore {
  inner: Arc<Mutex<Inner>>,
  prefix: String,
  default_ttl: Duration,
  max_entries: usize,
}

impl CacheStore {
  pub fn new(prefix: &str, default_ttl_secs: i64, max_entries: usize) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner::default())),
      prefix: prefix.to_string(),
      default_ttl: Duration::seconds(default_ttl_secs),
      max_entries,
    }
  }

  fn full_key(&self, key: &str) -> String {
    format!("{}:{}", self.prefix, key)
  }

  /// Store a value with expiry `now + ttl` (store default when omitted).
  ///
  /// When the store is at capacity and the key is new, the entry with the
  /// soonest expiry is evicted first. That approximates least-recently-useful
  /// without tracking access order.
  pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: Option<i64>) -> Result<()> {
    let data = serde_json::to_value(value)
      .map_err(|e| Error::Internal(format!("failed to serialize cache value: {}", e)))?;
    let ttl = ttl_secs.map(Duration::seconds).unwrap_or(self.default_ttl);
    let full = self.full_key(key);

    let mut inner = self.lock();
    if inner.entries.len() >= self.max_entries && !inner.entries.contains_key(&full) {
      if let Some(soonest) = inner
        .entries
        .iter()
        .min_by_key(|(_, e)| e.expiry)
        .map(|(k, _)| k.clone())
      {
        inner.entries.remove(&soonest);
      }
    }
    inner.entries.insert(
      full,
      CacheEntry {
        data,
        expiry: Utc::now() + ttl,
      },
    );
    Ok(())
  }

  /// Fetch a value if present and unexpired. Expired entries are deleted on
  /// this read and count as misses.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let full = self.full_key(key);
    let now = Utc::now();

    let mut inner = self.lock();
    let entry = match inner.entries.get(&full) {
      Some(e) => e.clone(),
      None => {
        inner.misses += 1;
        return None;
      }
    };

    if now > entry.expiry {
      inner.entries.remove(&full);
      inner.misses += 1;
      return None;
    }

    inner.hits += 1;
    drop(inner);

    match serde_json::from_value(entry.data) {
      Ok(value) => Some(value),
      Err(e) => {
        // Stored shape no longer matches the requested type; treat as absent.
        tracing::warn!(key = %full, error = %e, "cached value failed to deserialize");
        self.delete(key);
        None
      }
    }
  }

  pub fn delete(&self, key: &str) -> bool {
    let full = self.full_key(key);
    self.lock().entries.remove(&full).is_some()
  }

  pub fn clear(&self) {
    self.lock().entries.clear();
  }

  /// Remove every entry whose full (prefixed) key matches the glob pattern.
  /// Supports `*` (any run) and `?` (one character). Returns how many
  /// entries were removed.
  pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
    let re = glob_to_regex(pattern)?;
    let mut inner = self.lock();
    let before = inner.entries.len();
    inner.entries.retain(|k, _| !re.is_match(k));
    Ok(before - inner.entries.len())
  }

  /// Return the cached value, or run `factory`, store its result, and
  /// return it.
  ///
  /// Concurrent misses for the same key are not coalesced; both callers may
  /// run the factory. Upstream reads are idempotent, so the cost is a
  /// duplicate fetch, not a correctness problem.
  pub async fn get_or_set<T, F, Fut>(&self, key: &str, factory: F, ttl_secs: Option<i64>) -> Result<T>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(value) = self.get::<T>(key) {
      return Ok(value);
    }
    let value = factory().await?;
    self.set(key, &value, ttl_secs)?;
    Ok(value)
  }

  /// Drop every expired entry. Called periodically by the registry sweeper.
  pub fn sweep(&self) -> usize {
    let now = Utc::now();
    let mut inner = self.lock();
    let before = inner.entries.len();
    inner.entries.retain(|_, e| e.expiry >= now);
    before - inner.entries.len()
  }

  pub fn stats(&self) -> CacheStats {
    let inner = self.lock();
    CacheStats {
      hits: inner.hits,
      misses: inner.misses,
      entries: inner.entries.len(),
    }
  }

  pub fn len(&self) -> usize {
    self.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    // A poisoned lock means a panic mid-mutation; the map is still usable.
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Translate a `*`/`?` glob into an anchored regex over full keys.
fn glob_to_regex(pattern: &str) -> Result<regex::Regex> {
  let mut re = String::with_capacity(pattern.len() + 8);
  re.push('^');
  for ch in pattern.chars() {
    match ch {
      '*' => re.push_str(".*"),
      '?' => re.push('.'),
      c => re.push_str(&regex::escape(&c.to_string())),
    }
  }
  re.push('$');
  regex::Regex::new(&re).map_err(|e| Error::Internal(format!("bad cache pattern {:?}: {}", pattern, e)))
}
