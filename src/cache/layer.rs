//! Tag-invalidated in-memory query cache.
//!
//! One entry per query descriptor. Entries move `idle -> loading ->
//! success | error` and back to `loading` on refetch or invalidation. All
//! bookkeeping happens under a synchronous mutex that is never held across
//! an `.await`; network work runs on spawned tasks that report back through
//! [`QueryCache::complete`].

use futures::future::BoxFuture;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, OwnedMutexGuard};
use tracing::{debug, warn};

use super::key::QueryKey;
use super::tags::{intersects, Tag};
use crate::api::HttpError;
use crate::query::QueryState;

/// Type-erased cached value; handles downcast it back to the endpoint's type
pub type Erased = Arc<dyn Any + Send + Sync>;

/// Produces a fresh request future for an entry
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<Erased, HttpError>> + Send + Sync>;

struct Entry {
  /// Distinguishes an entry from a later one under the same key
  id: u64,
  key: QueryKey,
  tags: Vec<Tag>,
  fetcher: Fetcher,
  tx: watch::Sender<QueryState<Erased>>,
  stale: bool,
  in_flight: bool,
  /// Invalidated while a request was in flight
  refetch_queued: bool,
  subscribers: usize,
  /// Bumped on every acquire/release so only the latest GC timer can evict
  gc_epoch: u64,
  fetch_count: u64,
}

struct Inner {
  entries: Mutex<HashMap<String, Entry>>,
  next_id: AtomicU64,
  gc_time: Duration,
  tag_locks: Vec<Arc<tokio::sync::Mutex<()>>>,
  runtime: tokio::runtime::Handle,
}

/// Snapshot of an entry's bookkeeping
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
  pub subscribers: usize,
  pub stale: bool,
  pub in_flight: bool,
  pub fetch_count: u64,
}

/// Shared query cache. Cheap to clone.
#[derive(Clone)]
pub struct QueryCache {
  inner: Arc<Inner>,
}

impl QueryCache {
  /// Create a cache whose released entries are evicted after `gc_time`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn new(gc_time: Duration) -> Self {
    Self {
      inner: Arc::new(Inner {
        entries: Mutex::new(HashMap::new()),
        next_id: AtomicU64::new(1),
        gc_time,
        tag_locks: Tag::ALL
          .iter()
          .map(|_| Arc::new(tokio::sync::Mutex::new(())))
          .collect(),
        runtime: tokio::runtime::Handle::current(),
      }),
    }
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
    // A panic while holding the lock leaves the maps consistent: every
    // critical section is a handful of field writes.
    self
      .inner
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Subscribe to a descriptor.
  ///
  /// A fresh entry is served without touching the network. A missing or
  /// stale entry starts exactly one request; acquirers arriving while it is
  /// in flight share it.
  pub fn acquire(&self, key: QueryKey, tags: &[Tag], fetcher: Fetcher) -> Subscription {
    let hash = key.cache_hash();
    let mut entries = self.entries();

    if let Some(entry) = entries.get_mut(&hash) {
      entry.subscribers += 1;
      entry.gc_epoch += 1;

      if entry.stale && !entry.in_flight {
        debug!(query = %entry.key.description(), "stale entry, refetching");
        self.start_fetch(&hash, entry);
      } else {
        debug!(
          query = %entry.key.description(),
          in_flight = entry.in_flight,
          "cache hit"
        );
      }

      return Subscription {
        cache: self.clone(),
        hash,
        entry_id: entry.id,
        rx: entry.tx.subscribe(),
        endpoint: entry.key.endpoint(),
      };
    }

    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = watch::channel(QueryState::Idle);
    let endpoint = key.endpoint();
    let mut entry = Entry {
      id,
      key,
      tags: tags.to_vec(),
      fetcher,
      tx,
      stale: false,
      in_flight: false,
      refetch_queued: false,
      subscribers: 1,
      gc_epoch: 0,
      fetch_count: 0,
    };
    debug!(query = %entry.key.description(), "cache miss");
    self.start_fetch(&hash, &mut entry);
    entries.insert(hash.clone(), entry);

    Subscription {
      cache: self.clone(),
      hash,
      entry_id: id,
      rx,
      endpoint,
    }
  }

  /// Move an entry to `loading` and spawn its request.
  fn start_fetch(&self, hash: &str, entry: &mut Entry) {
    entry.in_flight = true;
    entry.stale = false;
    entry.refetch_queued = false;
    entry.fetch_count += 1;
    entry.tx.send_replace(QueryState::Loading);
    debug!(query = %entry.key.description(), fetch = entry.fetch_count, "fetching");

    let future = (entry.fetcher)();
    let cache = self.clone();
    let hash = hash.to_string();
    let id = entry.id;
    self.inner.runtime.spawn(async move {
      let result = future.await;
      cache.complete(&hash, id, result);
    });
  }

  /// Store a finished request and notify every handle.
  fn complete(&self, hash: &str, id: u64, result: Result<Erased, HttpError>) {
    let mut entries = self.entries();
    let Some(entry) = entries.get_mut(hash).filter(|e| e.id == id) else {
      debug!("result for evicted entry dropped");
      return;
    };

    entry.in_flight = false;
    let state = match result {
      Ok(data) => {
        debug!(query = %entry.key.description(), "query succeeded");
        QueryState::Success(data)
      }
      Err(e) => {
        warn!(query = %entry.key.description(), error = %e, "query failed");
        QueryState::Error(e)
      }
    };
    entry.tx.send_replace(state);

    if entry.refetch_queued {
      if entry.subscribers > 0 {
        debug!(query = %entry.key.description(), "invalidated while loading, refetching");
        self.start_fetch(hash, entry);
      } else {
        entry.refetch_queued = false;
        entry.stale = true;
      }
    }
  }

  /// Mark every entry providing one of `tags` stale and refetch the ones
  /// that still have handles. Returns the number of entries refetched.
  pub fn invalidate(&self, tags: &[Tag]) -> usize {
    if tags.is_empty() {
      return 0;
    }

    let mut entries = self.entries();
    let mut refetched = 0;
    for (hash, entry) in entries.iter_mut() {
      if !intersects(&entry.tags, tags) {
        continue;
      }

      if entry.in_flight {
        // The in-flight response may predate the write
        entry.refetch_queued = true;
        continue;
      }

      entry.stale = true;
      if entry.subscribers > 0 {
        self.start_fetch(hash, entry);
        refetched += 1;
      }
    }

    debug!(
      tags = ?tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
      refetched,
      "invalidated tags"
    );
    refetched
  }

  /// Manual refetch; a no-op while a request is in flight
  fn refetch(&self, hash: &str, id: u64) {
    let mut entries = self.entries();
    if let Some(entry) = entries.get_mut(hash).filter(|e| e.id == id) {
      if !entry.in_flight {
        self.start_fetch(hash, entry);
      }
    }
  }

  fn release(&self, hash: &str, id: u64) {
    let mut entries = self.entries();
    let Some(entry) = entries.get_mut(hash).filter(|e| e.id == id) else {
      return;
    };

    entry.subscribers = entry.subscribers.saturating_sub(1);
    if entry.subscribers > 0 {
      return;
    }

    entry.gc_epoch += 1;
    let epoch = entry.gc_epoch;
    let gc_time = self.inner.gc_time;
    let cache = self.clone();
    let hash = hash.to_string();
    debug!(query = %entry.key.description(), ?gc_time, "last handle released");

    self.inner.runtime.spawn(async move {
      tokio::time::sleep(gc_time).await;
      cache.evict_if_unused(&hash, epoch);
    });
  }

  fn evict_if_unused(&self, hash: &str, epoch: u64) {
    let mut entries = self.entries();
    let unused = entries
      .get(hash)
      .is_some_and(|e| e.subscribers == 0 && e.gc_epoch == epoch);
    if unused {
      if let Some(entry) = entries.remove(hash) {
        debug!(query = %entry.key.description(), "evicted");
      }
    }
  }

  /// Serialize mutations that touch overlapping tags.
  ///
  /// Locks are taken in tag order so two mutations can never wait on each
  /// other in a cycle.
  pub async fn lock_tags(&self, tags: &[Tag]) -> Vec<OwnedMutexGuard<()>> {
    let mut sorted = tags.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut guards = Vec::with_capacity(sorted.len());
    for tag in sorted {
      let lock = Arc::clone(&self.inner.tag_locks[tag.index()]);
      guards.push(lock.lock_owned().await);
    }
    guards
  }

  /// Bookkeeping for a descriptor, if cached
  #[cfg(test)]
  pub fn inspect(&self, key: &QueryKey) -> Option<EntryInfo> {
    let entries = self.entries();
    entries.get(&key.cache_hash()).map(|e| EntryInfo {
      subscribers: e.subscribers,
      stale: e.stale,
      in_flight: e.in_flight,
      fetch_count: e.fetch_count,
    })
  }

  /// Number of cached entries
  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries().len()
  }

  /// Drop every entry (sign-out). Handles keep their last state.
  pub fn clear(&self) {
    self.entries().clear();
  }
}

/// A counted reference to a cache entry.
///
/// Dropping it releases the reference; the entry is evicted once the GC
/// interval passes with no new subscriber.
pub struct Subscription {
  cache: QueryCache,
  hash: String,
  entry_id: u64,
  rx: watch::Receiver<QueryState<Erased>>,
  endpoint: &'static str,
}

impl Subscription {
  pub fn endpoint(&self) -> &'static str {
    self.endpoint
  }

  pub fn receiver(&self) -> &watch::Receiver<QueryState<Erased>> {
    &self.rx
  }

  pub fn receiver_mut(&mut self) -> &mut watch::Receiver<QueryState<Erased>> {
    &mut self.rx
  }

  pub fn refetch(&self) {
    self.cache.refetch(&self.hash, self.entry_id);
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.cache.release(&self.hash, self.entry_id);
  }
}
