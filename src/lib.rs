//! Geodash — request-log heatmap dashboard backend.
//!
//! Library crate so integration tests in `tests/` can assemble the same
//! router the binary serves.

use std::sync::Arc;

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod geo;
pub mod models;
pub mod upstream;

use aggregate::LogAggregator;
use geo::GeoResolver;
use upstream::QueryGateway;

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: config::Config,
    pub gateway: QueryGateway,
    pub aggregator: LogAggregator,
    pub resolver: Arc<GeoResolver>,
}

/// Wire the pipeline together: gateway → aggregator → resolver.
pub fn build_state(cfg: config::Config) -> Arc<AppState> {
    let resolver = Arc::new(GeoResolver::from_config(&cfg));
    let gateway = QueryGateway::from_config(&cfg);
    let aggregator = LogAggregator::new(resolver.clone());
    Arc::new(AppState {
        gateway,
        aggregator,
        resolver,
        config: cfg,
    })
}
