//! Fetch functions - retrieve raw estimate records from the AVM API

use crate::config::Config;
use crate::error::{EstimateError, Result};
use crate::pipeline::types::{EstimateKind, EstimateRecord, PropertyQuery};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Blocking client for the RentCast AVM endpoints
#[derive(Debug, Clone)]
pub struct AvmClient {
    http: Client,
    config: Config,
}

impl AvmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(AvmClient {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// GET one estimate for `query`; fails on any non-success status
    pub fn fetch_estimate(&self, kind: EstimateKind, query: &PropertyQuery) -> Result<EstimateRecord> {
        let url = self.config.endpoint(kind.endpoint_path());
        let params = query.query_params(kind, self.config.comp_count);

        info!("Fetching {} estimate for '{}'", kind.noun(), query.address);
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(&params)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!("{} responded {} ({} bytes)", url, status, body.len());

        check_status(status, &body, &query.address)?;

        parse_record(&body)
    }
}

/// Map a response status onto the error taxonomy
pub fn check_status(status: StatusCode, body: &str, address: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    warn!("AVM API error {} for '{}': {}", status, address, body);

    Err(match status {
        StatusCode::BAD_REQUEST => EstimateError::InvalidAddress {
            address: address.to_string(),
            body: body.to_string(),
        },
        StatusCode::UNAUTHORIZED => EstimateError::Unauthorized,
        _ => EstimateError::Upstream {
            status,
            body: body.to_string(),
        },
    })
}

/// Parse a success body; an empty body or `null` is an empty record
pub fn parse_record(body: &str) -> Result<EstimateRecord> {
    if body.trim().is_empty() {
        return Ok(EstimateRecord::default());
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Object(fields) => Ok(EstimateRecord::new(fields)),
        Value::Null => Ok(EstimateRecord::default()),
        other => Err(EstimateError::UnexpectedPayload {
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
