//! IP geolocation with a fallback chain.
//!
//! Resolution walks an ordered list of strategies: the offline MaxMind
//! database first, then a rate-limited remote HTTP lookup. The first
//! strategy that produces a location wins; if none does, the resolver
//! returns the "Unknown" sentinel. Every outcome — sentinel included —
//! lands in the process-wide cache, so each distinct IP costs at most one
//! round of lookups per process lifetime.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::models::geo::GeoPoint;

pub mod cache;
pub mod local;
pub mod rate_limit;
pub mod remote;

pub use cache::GeoCache;

/// One way of turning an IP address into a location. Strategies swallow
/// their own failures: `None` means "no answer here, try the next one".
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_resolve(&self, ip: &str) -> Option<GeoPoint>;
}

/// Resolves IPs to locations. Owns the cache and the strategy chain;
/// construct one per process and share it behind an `Arc`.
pub struct GeoResolver {
    cache: GeoCache,
    chain: Vec<Box<dyn ResolveStrategy>>,
}

impl GeoResolver {
    /// Standard chain from configuration: local database, then remote
    /// lookup behind a fixed-window limiter.
    pub fn from_config(cfg: &Config) -> Self {
        let limiter = Arc::new(rate_limit::FixedWindow::new(
            cfg.geo_rate_limit,
            Duration::from_secs(cfg.geo_rate_limit_window_secs),
        ));
        let chain: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(local::LocalDbStrategy::open(Path::new(&cfg.maxmind_db_path))),
            Box::new(remote::RemoteApiStrategy::new(
                cfg.geo_api_url.clone(),
                limiter,
            )),
        ];
        Self::with_chain(chain)
    }

    /// Custom chain, mainly for tests that inject doubles.
    pub fn with_chain(chain: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self {
            cache: GeoCache::new(),
            chain,
        }
    }

    /// Resolve one IP. Total: always yields a GeoPoint, falling back to
    /// the "Unknown" sentinel when every strategy comes up empty.
    pub async fn resolve(&self, ip: &str) -> GeoPoint {
        if let Some(hit) = self.cache.get(ip) {
            return hit;
        }

        for strategy in &self.chain {
            if let Some(point) = strategy.try_resolve(ip).await {
                tracing::debug!(ip, strategy = strategy.name(), "resolved");
                self.cache.insert(point.clone());
                return point;
            }
        }

        let sentinel = GeoPoint::unknown(ip);
        self.cache.insert(sentinel.clone());
        sentinel
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }
}
