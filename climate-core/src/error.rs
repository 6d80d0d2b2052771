use reqwest::StatusCode;
use rust_decimal::Decimal;

use crate::validate::ValidationErrors;

/// Every failure the rainfall pipeline can surface to a caller.
#[derive(Debug, thiserror::Error)]
pub enum ClimateError {
    #[error("invalid query: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("transport failure: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("climate API responded with status {status}: {body}")]
    Remote { status: StatusCode, body: String },

    #[error("failed to decode climate response: {0}")]
    Decode(String),

    #[error("failed to encode climate data: {0}")]
    Encode(String),

    #[error("no rainfall data available for {from}-{to}")]
    EmptyDataset { from: i64, to: i64 },

    #[error("rainfall values for {from}-{to} sum past the decimal range")]
    Overflow { from: i64, to: i64 },

    #[error("rainfall value '{value}' is not a decimal number")]
    NumericParse {
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("average {0} cannot be represented as f64")]
    Conversion(Decimal),
}

impl ClimateError {
    /// Transport-level failures, including cancellation and timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClimateError::Transport(_) | ClimateError::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClimateError::Cancelled)
    }

    /// HTTP status of a non-success upstream response, if that is what failed.
    pub fn remote_status(&self) -> Option<StatusCode> {
        match self {
            ClimateError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
