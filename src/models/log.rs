use serde::{Deserialize, Serialize};

/// One observed HTTP request as reported by the upstream dataset.
///
/// The upstream window filter consumes the record's timestamp; it is not
/// carried past the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub ip: String,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub method: Option<String>,
}

impl LogRecord {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            url: None,
            status: None,
            method: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}
