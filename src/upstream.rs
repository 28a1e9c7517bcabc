//! Client for the upstream log dataset's APL query API.
//!
//! Issues a time-windowed query for raw request records and decodes the
//! columnar "tabular" response shape into `LogRecord`s. The window is
//! enforced upstream — results are trusted as-is, with no client-side
//! re-windowing or deduplication.

use std::time::Duration;

use chrono::Utc;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::errors::UpstreamQueryError;
use crate::models::log::LogRecord;

/// Upper bound on raw records per window. Bounds response size; the
/// heaviest talkers still dominate the aggregates well below this.
const MAX_ROWS: u32 = 50_000;

/// The upstream returns column-major tables:
/// `{"tables": [{"fields": [{"name": "ip"}, ...], "columns": [[...], ...]}]}`.
#[derive(Debug, Default, Deserialize)]
pub struct TabularResponse {
    #[serde(default)]
    tables: Vec<Table>,
}

#[derive(Debug, Default, Deserialize)]
struct Table {
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default)]
    columns: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
}

pub struct QueryGateway {
    client: ClientWithMiddleware,
    api_url: String,
    dataset: String,
    token: String,
}

impl QueryGateway {
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.axiom_api_url, &cfg.axiom_dataset, &cfg.axiom_api_token)
    }

    pub fn new(api_url: &str, dataset: &str, token: &str) -> Self {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            api_url: api_url.to_string(),
            dataset: dataset.to_string(),
            token: token.to_string(),
        }
    }

    /// Fetch the raw request records for the window `[now - hours, now]`.
    pub async fn fetch_logs(&self, hours: u32) -> Result<Vec<LogRecord>, UpstreamQueryError> {
        let apl = format!(
            "['{dataset}'] \
             | where _time >= ago({hours}h) \
             | project ip, url, status, method \
             | take {MAX_ROWS}",
            dataset = self.dataset,
        );

        let now = Utc::now();
        let start = now - chrono::Duration::hours(i64::from(hours));

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&json!({
                "apl": apl,
                "startTime": start.to_rfc3339(),
                "endTime": now.to_rfc3339(),
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UpstreamQueryError::Status(resp.status()));
        }

        let body: TabularResponse = resp.json().await?;
        Ok(decode_records(body))
    }
}

/// Transpose the columnar response into rows. Rows with a missing or
/// empty `ip` are malformed and dropped; everything else is optional.
pub fn decode_records(body: TabularResponse) -> Vec<LogRecord> {
    let Some(table) = body.tables.into_iter().next() else {
        return Vec::new();
    };

    let mut ip_col = None;
    let mut url_col = None;
    let mut status_col = None;
    let mut method_col = None;
    for (idx, field) in table.fields.iter().enumerate() {
        match field.name.as_str() {
            "ip" => ip_col = Some(idx),
            "url" => url_col = Some(idx),
            "status" => status_col = Some(idx),
            "method" => method_col = Some(idx),
            _ => {}
        }
    }
    let Some(ip_col) = ip_col else {
        return Vec::new();
    };

    let rows = table.columns.first().map_or(0, Vec::len);

    let mut records = Vec::with_capacity(rows);
    for row in 0..rows {
        let Some(ip) = cell(&table.columns, Some(ip_col), row).and_then(Value::as_str) else {
            continue;
        };
        if ip.is_empty() {
            continue;
        }

        records.push(LogRecord {
            ip: ip.to_string(),
            url: cell(&table.columns, url_col, row)
                .and_then(Value::as_str)
                .map(str::to_string),
            status: cell(&table.columns, status_col, row).and_then(as_status),
            method: cell(&table.columns, method_col, row)
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    records
}

fn cell(columns: &[Vec<Value>], col: Option<usize>, row: usize) -> Option<&Value> {
    columns.get(col?)?.get(row)
}

/// Status codes arrive as numbers or numeric strings depending on the
/// dataset's field typing.
fn as_status(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabular(json: Value) -> TabularResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn decodes_column_major_rows() {
        let body = tabular(json!({
            "tables": [{
                "fields": [
                    {"name": "ip"}, {"name": "url"},
                    {"name": "status"}, {"name": "method"}
                ],
                "columns": [
                    ["1.2.3.4", "5.6.7.8"],
                    ["/a", "/b"],
                    [200, "404"],
                    ["GET", null]
                ]
            }]
        }));

        let records = decode_records(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ip, "1.2.3.4");
        assert_eq!(records[0].url.as_deref(), Some("/a"));
        assert_eq!(records[0].status, Some(200));
        assert_eq!(records[0].method.as_deref(), Some("GET"));
        assert_eq!(records[1].status, Some(404));
        assert_eq!(records[1].method, None);
    }

    #[test]
    fn drops_rows_without_ip() {
        let body = tabular(json!({
            "tables": [{
                "fields": [{"name": "ip"}, {"name": "status"}],
                "columns": [["1.2.3.4", "", null], [200, 201, 202]]
            }]
        }));

        let records = decode_records(body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "1.2.3.4");
    }

    #[test]
    fn empty_tables_decode_to_no_records() {
        assert!(decode_records(tabular(json!({"tables": []}))).is_empty());
        assert!(decode_records(tabular(json!({}))).is_empty());
        assert!(decode_records(tabular(json!({
            "tables": [{"fields": [], "columns": []}]
        })))
        .is_empty());
    }

    #[test]
    fn missing_ip_field_yields_no_records() {
        let body = tabular(json!({
            "tables": [{
                "fields": [{"name": "url"}],
                "columns": [["/a"]]
            }]
        }));
        assert!(decode_records(body).is_empty());
    }

    #[test]
    fn ragged_columns_do_not_panic() {
        let body = tabular(json!({
            "tables": [{
                "fields": [{"name": "ip"}, {"name": "url"}],
                "columns": [["1.2.3.4", "5.6.7.8"], ["/only-one"]]
            }]
        }));

        let records = decode_records(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_deref(), Some("/only-one"));
        assert_eq!(records[1].url, None);
    }
}
