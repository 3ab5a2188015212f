//! Bounded FIFO set of recently dispatched item keys.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use serde::Deserialize;

/// Default number of keys remembered.
pub const DEFAULT_DEDUP_CAPACITY: usize = 1000;

/// Whether a dispatched item is remembered for everyone or per subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// One entry per item: the first subscriber to match it gets it.
    Global,
    /// One entry per (subscriber, item): every subscriber gets each match once.
    #[default]
    PerSubscriber,
}

impl DedupScope {
    /// Name of the cache an item delivered to `subscriber_id` is remembered in.
    pub fn partition(self, subscriber_id: &str) -> &str {
        match self {
            DedupScope::Global => "",
            DedupScope::PerSubscriber => subscriber_id,
        }
    }
}

/// Cache key for an item: the same id from two sources is two items.
pub fn item_key(source: &str, item_id: &str) -> String {
    format!("{source}\u{1f}{item_id}")
}

/// Fixed-capacity set evicting the earliest-recorded key when full.
///
/// Eviction follows insertion order only; lookups do not refresh an entry.
#[derive(Debug, Clone)]
pub struct DedupCache<K> {
    capacity: usize,
    order: VecDeque<K>,
    members: HashSet<K>,
}

impl<K: Eq + Hash + Clone> DedupCache<K> {
    /// Create a cache holding at most `capacity` keys (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Maximum number of keys held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `key` has been recorded and not yet evicted.
    pub fn contains(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    /// Record `key`, evicting the oldest key if the cache is full.
    ///
    /// Recording a key that is already present does nothing.
    pub fn record(&mut self, key: K) {
        if self.members.contains(&key) {
            return;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }

        self.members.insert(key.clone());
        self.order.push_back(key);
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }
}

impl<K: Eq + Hash + Clone> Default for DedupCache<K> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUP_CAPACITY)
    }
}

/// Dispatched items partitioned by [`DedupScope`].
///
/// `Global` keeps one cache; `PerSubscriber` keeps one cache per subscriber,
/// each holding `capacity` keys, so adding guilds never shortens how long an
/// item is remembered.
#[derive(Debug, Clone)]
pub struct DedupStore {
    scope: DedupScope,
    capacity: usize,
    caches: HashMap<String, DedupCache<String>>,
}

impl DedupStore {
    pub fn new(scope: DedupScope, capacity: usize) -> Self {
        Self {
            scope,
            capacity,
            caches: HashMap::new(),
        }
    }

    pub fn scope(&self) -> DedupScope {
        self.scope
    }

    /// Whether `item_id` from `source` was already dispatched for `subscriber_id`.
    pub fn contains(&self, subscriber_id: &str, source: &str, item_id: &str) -> bool {
        self.caches
            .get(self.scope.partition(subscriber_id))
            .is_some_and(|cache| cache.contains(&item_key(source, item_id)))
    }

    /// Remember `item_id` from `source` as dispatched for `subscriber_id`.
    pub fn record(&mut self, subscriber_id: &str, source: &str, item_id: &str) {
        let capacity = self.capacity;
        self.caches
            .entry(self.scope.partition(subscriber_id).to_string())
            .or_insert_with(|| DedupCache::with_capacity(capacity))
            .record(item_key(source, item_id));
    }

    /// Cache used for `subscriber_id`, if anything was recorded in it.
    pub fn cache_for(&self, subscriber_id: &str) -> Option<&DedupCache<String>> {
        self.caches.get(self.scope.partition(subscriber_id))
    }

    /// Keys held across all partitions.
    pub fn len(&self) -> usize {
        self.caches.values().map(DedupCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.values().all(DedupCache::is_empty)
    }
}
