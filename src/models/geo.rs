use serde::{Deserialize, Serialize};

/// Resolved location for an IP. Never partially populated: unresolvable
/// addresses carry the `"Unknown"` / `"??"` sentinels rather than absent
/// fields, so the rendering layer can treat every entry uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub ip: String,
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub country: String,
    pub country_code: String,
}

impl GeoPoint {
    /// Placeholder for an IP whose location could not be determined.
    pub fn unknown(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            lat: 0.0,
            lng: 0.0,
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
            country_code: "??".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.country_code == "??"
    }
}

/// GeoPoint plus the number of requests its IP made inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDatum {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: u16,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHits {
    pub url: String,
    pub hits: u64,
}

/// Aggregate bundle served by `/api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub status_codes: Vec<StatusCount>,
    pub top_endpoints: Vec<EndpointHits>,
}
