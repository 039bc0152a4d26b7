use dashmap::DashMap;
use std::sync::Arc;

use super::etf::EtfProfile;
use super::sector::SectorInfo;

/// A symbol-keyed lookup cache shared by resolvers.
///
/// Implementations must tolerate concurrent reads and concurrent inserts;
/// inserting the same key twice keeps the last value.
pub trait LookupCache<V>: Send + Sync {
    /// Get a cached value. Keys are compared uppercased.
    fn get(&self, symbol: &str) -> Option<V>;

    /// Insert or replace a value.
    fn set(&self, symbol: &str, value: V);

    /// Drop every entry.
    fn clear(&self);

    /// Number of cached symbols.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory `LookupCache` backed by a concurrent map. No TTL: entries live
/// until `clear()`.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: DashMap<String, V>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> LookupCache<V> for MemoryCache<V> {
    fn get(&self, symbol: &str) -> Option<V> {
        self.entries
            .get(&symbol.to_uppercase())
            .map(|entry| entry.value().clone())
    }

    fn set(&self, symbol: &str, value: V) {
        self.entries.insert(symbol.to_uppercase(), value);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The two resolver caches an engine owns.
///
/// Cloning shares the underlying caches, so several engines (or a test and
/// an engine) can observe the same entries.
#[derive(Clone)]
pub struct ResolverCaches {
    pub constituents: Arc<dyn LookupCache<EtfProfile>>,
    pub sectors: Arc<dyn LookupCache<SectorInfo>>,
}

impl ResolverCaches {
    /// Fresh, empty in-memory caches.
    pub fn new() -> Self {
        Self {
            constituents: Arc::new(MemoryCache::new()),
            sectors: Arc::new(MemoryCache::new()),
        }
    }

    pub fn with(
        constituents: Arc<dyn LookupCache<EtfProfile>>,
        sectors: Arc<dyn LookupCache<SectorInfo>>,
    ) -> Self {
        Self {
            constituents,
            sectors,
        }
    }

    /// Clear both caches. Call whenever the holdings dataset changes owner
    /// (bulk import, reset) so stale constituent data cannot leak across.
    pub fn clear_all(&self) {
        self.constituents.clear();
        self.sectors.clear();
    }

    pub fn total_entries(&self) -> usize {
        self.constituents.len() + self.sectors.len()
    }
}

impl Default for ResolverCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolverCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverCaches")
            .field("constituents", &self.constituents.len())
            .field("sectors", &self.sectors.len())
            .finish()
    }
}
