use serde::Deserialize;

/// All configuration comes from environment variables, loaded once at
/// startup so every setting is visible in one place.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Bearer token for the log dataset query API.
    pub axiom_api_token: String,
    pub axiom_dataset: String,
    pub axiom_api_url: String,
    /// Optional local GeoIP database. Absence switches the resolver to
    /// remote-fallback-only mode.
    pub maxmind_db_path: String,
    /// Base URL of the remote geolocation fallback (ip-api.com style).
    pub geo_api_url: String,
    /// Remote-lookup budget per window. Matches the external service's
    /// documented free tier; a configurable constant, not an invariant.
    pub geo_rate_limit: u32,
    pub geo_rate_limit_window_secs: u64,
    /// Consumed only by the served HTML shell, never by the pipeline.
    pub google_maps_api_key: String,
    pub frontend_dir: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let cfg = Config {
        port: env_or("GEODASH_PORT", 8050),
        axiom_api_token: std::env::var("AXIOM_API_TOKEN").unwrap_or_default(),
        axiom_dataset: std::env::var("AXIOM_DATASET").unwrap_or_else(|_| "audimeta".into()),
        axiom_api_url: std::env::var("AXIOM_API_URL")
            .unwrap_or_else(|_| "https://api.axiom.co/v1/datasets/_apl?format=tabular".into()),
        maxmind_db_path: std::env::var("MAXMIND_DB_PATH")
            .unwrap_or_else(|_| "./data/GeoLite2-City.mmdb".into()),
        geo_api_url: std::env::var("GEO_API_URL")
            .unwrap_or_else(|_| "http://ip-api.com/json".into()),
        geo_rate_limit: env_or("GEODASH_GEO_RPM", 45),
        geo_rate_limit_window_secs: env_or("GEODASH_GEO_RPM_WINDOW", 60),
        google_maps_api_key: std::env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
        frontend_dir: std::env::var("FRONTEND_DIR").unwrap_or_else(|_| "./frontend".into()),
    };

    if cfg.axiom_api_token.is_empty() {
        tracing::warn!("AXIOM_API_TOKEN is not set — upstream queries will be rejected");
    }

    Ok(cfg)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
