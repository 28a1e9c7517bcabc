use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::geo::rate_limit::FixedWindow;
use crate::geo::ResolveStrategy;
use crate::models::geo::GeoPoint;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// ip-api.com response body. `status` is "success" or "fail".
#[derive(Debug, Deserialize)]
struct RemoteLookupBody {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// Remote HTTP geolocation fallback, used when the local database has no
/// answer. Every call is gated on the shared window limiter so concurrent
/// aggregations stay inside the external service's free-tier budget.
pub struct RemoteApiStrategy {
    client: reqwest::Client,
    base_url: String,
    limiter: Arc<FixedWindow>,
}

impl RemoteApiStrategy {
    pub fn new(base_url: impl Into<String>, limiter: Arc<FixedWindow>) -> Self {
        // Short timeout: one unreachable lookup must not stall a batch.
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            limiter,
        }
    }

    async fn lookup(&self, ip: &str) -> Option<GeoPoint> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let resp = self
            .client
            .get(&url)
            .query(&[("fields", "status,lat,lon,city,country,countryCode")])
            .send()
            .await
            .map_err(|e| tracing::warn!(ip, error = %e, "remote geolocation request failed"))
            .ok()?;

        if !resp.status().is_success() {
            tracing::warn!(ip, status = %resp.status(), "remote geolocation returned error status");
            return None;
        }

        let body: RemoteLookupBody = resp
            .json()
            .await
            .map_err(|e| tracing::warn!(ip, error = %e, "remote geolocation response malformed"))
            .ok()?;

        if body.status != "success" {
            tracing::debug!(ip, "remote geolocation could not resolve address");
            return None;
        }

        Some(GeoPoint {
            ip: ip.to_string(),
            lat: body.lat?,
            lng: body.lon?,
            city: body.city.unwrap_or_else(|| "Unknown".to_string()),
            country: body.country.unwrap_or_else(|| "Unknown".to_string()),
            country_code: body.country_code.unwrap_or_else(|| "??".to_string()),
        })
    }
}

#[async_trait]
impl ResolveStrategy for RemoteApiStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn try_resolve(&self, ip: &str) -> Option<GeoPoint> {
        // Budget check before any I/O. When exhausted the caller gets the
        // sentinel (and caches it), so throttled IPs are not retried.
        if !self.limiter.try_acquire() {
            tracing::debug!(ip, "remote geolocation budget exhausted, skipping lookup");
            return None;
        }
        self.lookup(ip).await
    }
}
