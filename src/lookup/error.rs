use reqwest::StatusCode;
use thiserror::Error;

use crate::lookup::models::{Failure, FailureKind};

/// Everything that can go wrong inside a resolver before it is folded into
/// a [`Failure`].
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("source has no record for this IMEI")]
    NotFound,

    #[error("unexpected page structure: {0}")]
    Parse(String),

    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Status(status) => FailureKind::HttpError {
                status: status.as_u16(),
            },
            Self::Request(e) if e.is_timeout() => FailureKind::Timeout,
            Self::Request(e) if e.is_builder() => FailureKind::InternalError,
            Self::Request(e)
                if e.is_connect() || e.is_request() || e.is_body() || e.is_redirect() =>
            {
                FailureKind::NetworkError
            }
            Self::Request(e) if e.is_decode() => FailureKind::InvalidPayload,
            Self::Request(_) => FailureKind::InternalError,
            Self::NotFound => FailureKind::NotFound,
            Self::Parse(_) => FailureKind::ParseError,
            Self::InvalidJson(_) => FailureKind::InvalidPayload,
        }
    }
}

impl From<LookupError> for Failure {
    fn from(err: LookupError) -> Self {
        Failure::new(err.kind(), err.to_string())
    }
}
