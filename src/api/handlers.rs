use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::geo::{GeoDatum, StatsResult};
use crate::AppState;

/// Selectable time windows, in hours. Anything else falls back to a week.
const ALLOWED_WINDOWS: [u32; 4] = [6, 24, 168, 720];
const DEFAULT_WINDOW: u32 = 168;

/// `hours` is taken as a raw string so an unparsable value degrades to the
/// default instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub hours: Option<String>,
}

pub fn normalize_hours(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse().ok())
        .filter(|h| ALLOWED_WINDOWS.contains(h))
        .unwrap_or(DEFAULT_WINDOW)
}

/// GET /api/geodata — geolocated per-IP request counts for the map,
/// sorted busiest-first. Fails open: upstream trouble yields an empty
/// array, never a 5xx that would break the front-end's fetch flow.
pub async fn get_geodata(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Json<Vec<GeoDatum>> {
    let hours = normalize_hours(params.hours.as_deref());

    let records = match state.gateway.fetch_logs(hours).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(hours, error = %e, "upstream query failed, serving empty geodata");
            return Json(Vec::new());
        }
    };

    let (geodata, _) = state.aggregator.aggregate(&records).await;
    tracing::debug!(
        hours,
        points = geodata.len(),
        cached_ips = state.resolver.cache().len(),
        "geodata served"
    );
    Json(geodata)
}

/// GET /api/stats — status-code breakdown and top endpoints. Same
/// fail-open policy as the map feed.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Json<StatsResult> {
    let hours = normalize_hours(params.hours.as_deref());

    let records = match state.gateway.fetch_logs(hours).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(hours, error = %e, "upstream query failed, serving empty stats");
            return Json(StatsResult::default());
        }
    };

    Json(crate::aggregate::tabulate_stats(&records))
}
