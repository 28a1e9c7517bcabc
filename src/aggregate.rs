//! Turns raw log records into the dashboard's derived views: geolocated
//! per-IP request counts, the status-code histogram, and the top-endpoint
//! table. Holds no state of its own — every call recomputes from scratch,
//! and the only side effect is the resolver warming its cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::geo::GeoResolver;
use crate::models::geo::{EndpointHits, GeoDatum, StatsResult, StatusCount};
use crate::models::log::LogRecord;

/// The endpoint table is cut to the busiest entries; ties at the boundary
/// are dropped after the deterministic (hits desc, url asc) sort.
const TOP_ENDPOINTS: usize = 15;

pub struct LogAggregator {
    resolver: Arc<GeoResolver>,
}

impl LogAggregator {
    pub fn new(resolver: Arc<GeoResolver>) -> Self {
        Self { resolver }
    }

    /// Produce both aggregate views over one window of records.
    ///
    /// The resolver is consulted once per distinct IP, not once per
    /// record, so lookup cost is bounded by the address space seen rather
    /// than the log volume. Empty input yields empty output, never an
    /// error.
    pub async fn aggregate(&self, records: &[LogRecord]) -> (Vec<GeoDatum>, StatsResult) {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            // Records without an IP are malformed; drop them rather than
            // abort the batch.
            if record.ip.is_empty() {
                continue;
            }
            *counts.entry(record.ip.as_str()).or_insert(0) += 1;
        }

        let mut geodata = Vec::with_capacity(counts.len());
        for (ip, request_count) in &counts {
            let point = self.resolver.resolve(ip).await;
            geodata.push(GeoDatum {
                point,
                request_count: *request_count,
            });
        }
        // The rendering layer assumes index 0 is the busiest IP. BTreeMap
        // iteration already ordered ties by IP ascending; the stable sort
        // preserves that.
        geodata.sort_by(|a, b| b.request_count.cmp(&a.request_count));

        (geodata, tabulate_stats(records))
    }
}

/// Status-code histogram and endpoint hit table. Records missing a status
/// are excluded from the histogram (not bucketed separately); records with
/// an empty or missing url are excluded from the endpoint table.
pub fn tabulate_stats(records: &[LogRecord]) -> StatsResult {
    let mut by_status: BTreeMap<u16, u64> = BTreeMap::new();
    let mut by_url: BTreeMap<&str, u64> = BTreeMap::new();

    for record in records {
        if let Some(status) = record.status {
            *by_status.entry(status).or_insert(0) += 1;
        }
        if let Some(url) = record.url.as_deref() {
            if !url.is_empty() {
                *by_url.entry(url).or_insert(0) += 1;
            }
        }
    }

    let mut status_codes: Vec<StatusCount> = by_status
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    status_codes.sort_by(|a, b| b.count.cmp(&a.count));

    let mut top_endpoints: Vec<EndpointHits> = by_url
        .into_iter()
        .map(|(url, hits)| EndpointHits {
            url: url.to_string(),
            hits,
        })
        .collect();
    top_endpoints.sort_by(|a, b| b.hits.cmp(&a.hits));
    top_endpoints.truncate(TOP_ENDPOINTS);

    StatsResult {
        status_codes,
        top_endpoints,
    }
}
