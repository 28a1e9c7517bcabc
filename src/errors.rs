use thiserror::Error;

/// Failure fetching the raw log window from the upstream dataset.
///
/// Never surfaced as an HTTP error: the API boundary logs it and degrades
/// to an empty result set so the dashboard keeps rendering through
/// upstream flakiness.
#[derive(Debug, Error)]
pub enum UpstreamQueryError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("upstream response malformed: {0}")]
    Decode(#[from] reqwest::Error),
}
