use dashmap::DashMap;
use std::sync::Arc;

use crate::models::geo::GeoPoint;

/// In-process cache of resolved locations, keyed by IP.
///
/// Entries live for the lifetime of the process and are never evicted:
/// each entry is small and the IP space seen is bounded by log volume.
/// Failed resolutions are cached too, so a known-bad address is not
/// retried on every aggregation pass.
///
/// Concurrent writers for the same uncached IP both store the same
/// resolved value, so no per-key locking is needed.
#[derive(Clone, Default)]
pub struct GeoCache {
    entries: Arc<DashMap<String, GeoPoint>>,
}

impl GeoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ip: &str) -> Option<GeoPoint> {
        self.entries.get(ip).map(|e| e.value().clone())
    }

    pub fn insert(&self, point: GeoPoint) {
        self.entries.insert(point.ip.clone(), point);
    }

    /// Current number of cached entries (for logging / debugging).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
