use std::fmt;

use crate::config::{SourceConfig, SourceKind};

/// A syntactically valid IMEI: exactly 15 ASCII digits.
///
/// Only [`crate::lookup::validator::validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Imei(pub(crate) String);

impl Imei {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One lookup against the configured source.
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub imei: &'a Imei,
    pub source: &'a SourceConfig,
}

impl LookupRequest<'_> {
    pub fn url(&self) -> String {
        let base = self.source.base_url.trim_end_matches('/');
        match self.source.kind {
            SourceKind::Scrape => format!("{}/check/imei/{}/", base, self.imei),
            SourceKind::Api => format!("{}/imei/{}", base, self.imei),
        }
    }
}

/// Category of a failed lookup; each one maps to a fixed user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    HttpError { status: u16 },
    Timeout,
    NetworkError,
    ParseError,
    InvalidPayload,
    NotFound,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Operator-facing detail. Logged, never shown to the user.
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found {
        title: Option<String>,
        fields: Vec<(String, String)>,
    },
    PartialOrUnrecognized {
        raw_payload: String,
    },
    Failure(Failure),
}

impl LookupOutcome {
    pub fn brand_model(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self::Found {
            title: None,
            fields: vec![
                ("Brand".to_string(), brand.into()),
                ("Model".to_string(), model.into()),
            ],
        }
    }

    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, detail))
    }
}
