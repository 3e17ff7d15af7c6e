//! Error taxonomy for the estimate pipeline

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can abort a single pipeline run.
///
/// Empty data (no record, no point estimate) is never an error: those cases
/// produce empty tables and empty charts instead.
#[derive(Error, Debug)]
pub enum EstimateError {
    /// HTTP 400 from the AVM API
    #[error("Bad request! Check if the address '{address}' is correctly formatted.")]
    InvalidAddress { address: String, body: String },

    /// HTTP 401 from the AVM API
    #[error("Unauthorized! Check if your API key is correct.")]
    Unauthorized,

    /// Any other non-success status
    #[error("AVM API responded with error {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected AVM payload: expected a JSON object, got {found}")]
    UnexpectedPayload { found: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl EstimateError {
    /// HTTP status behind the error, if it came from the API
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            EstimateError::InvalidAddress { .. } => Some(StatusCode::BAD_REQUEST),
            EstimateError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            EstimateError::Upstream { status, .. } => Some(*status),
            EstimateError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimateError>;
