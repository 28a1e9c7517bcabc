use std::net::IpAddr;
use std::path::Path;

use async_trait::async_trait;
use maxminddb::geoip2;

use crate::geo::ResolveStrategy;
use crate::models::geo::GeoPoint;

/// Offline MaxMind City database lookup. Microsecond-fast, no network,
/// no rate limits — always the first strategy in the chain.
pub struct LocalDbStrategy {
    reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl LocalDbStrategy {
    /// Opens the database at `path` if it exists. A missing or unreadable
    /// file is not an error: the strategy simply never matches and the
    /// chain falls through to the remote lookup.
    pub fn open(path: &Path) -> Self {
        let reader = match maxminddb::Reader::open_readfile(path) {
            Ok(reader) => {
                tracing::info!(path = %path.display(), "MaxMind database loaded");
                Some(reader)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "MaxMind database unavailable, remote fallback only"
                );
                None
            }
        };
        Self { reader }
    }

    fn lookup(&self, ip: &str) -> Option<GeoPoint> {
        let reader = self.reader.as_ref()?;
        let addr: IpAddr = ip.parse().ok()?;
        let city: geoip2::City = reader.lookup(addr).ok()?;

        let location = city.location.as_ref()?;
        // Private/reserved ranges come back without coordinates.
        let lat = location.latitude?;
        let lng = location.longitude?;

        let city_name = city
            .city
            .as_ref()
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let country = city.country.as_ref();
        let country_name = country
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let country_code = country
            .and_then(|c| c.iso_code)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "??".to_string());

        Some(GeoPoint {
            ip: ip.to_string(),
            lat,
            lng,
            city: city_name,
            country: country_name,
            country_code,
        })
    }
}

#[async_trait]
impl ResolveStrategy for LocalDbStrategy {
    fn name(&self) -> &'static str {
        "maxmind"
    }

    async fn try_resolve(&self, ip: &str) -> Option<GeoPoint> {
        // Pure in-memory lookup, never blocks on network I/O.
        self.lookup(ip)
    }
}
