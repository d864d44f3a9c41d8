use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::{ConfigError, SourceConfig};
use crate::lookup::error::LookupError;
use crate::lookup::fetcher;
use crate::lookup::models::{Failure, FailureKind, Imei, LookupOutcome, LookupRequest};
use crate::lookup::parser;

/// Maps a validated IMEI to a [`LookupOutcome`] using one upstream source.
///
/// Implementations never fail: every upstream problem comes back as
/// [`LookupOutcome::Failure`].
pub trait Resolver: Send + Sync + 'static {
    /// Short name used in log fields.
    fn source_name(&self) -> &'static str;

    fn resolve(&self, imei: &Imei) -> impl Future<Output = LookupOutcome> + Send;
}

/// Scrapes the imei24.com check page.
pub struct ScrapeResolver {
    client: Client,
    source: SourceConfig,
}

impl ScrapeResolver {
    pub fn new(source: SourceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = fetcher::build_client(timeout).context("failed to build http client")?;
        Ok(Self { client, source })
    }

    async fn lookup(&self, imei: &Imei) -> Result<LookupOutcome, LookupError> {
        let url = LookupRequest {
            imei,
            source: &self.source,
        }
        .url();

        let html = fetcher::fetch_text(self.client.get(url)).await?;
        parser::parse_info_page(&html)
    }
}

impl Resolver for ScrapeResolver {
    fn source_name(&self) -> &'static str {
        "imei24"
    }

    async fn resolve(&self, imei: &Imei) -> LookupOutcome {
        let span = info_span!("lookup", source = self.source_name(), %imei);
        async { settle(self.lookup(imei).await) }
            .instrument(span)
            .await
    }
}

/// Queries a JSON API that answers `{brand, model, ...}`.
pub struct ApiResolver {
    client: Client,
    source: SourceConfig,
    token: String,
}

impl ApiResolver {
    pub fn new(source: SourceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let token = source
            .api_token
            .clone()
            .ok_or(ConfigError::Missing("IMEI_API_TOKEN"))?;
        let client = fetcher::build_client(timeout).context("failed to build http client")?;

        Ok(Self {
            client,
            source,
            token,
        })
    }

    async fn lookup(&self, imei: &Imei) -> Result<LookupOutcome, LookupError> {
        let url = LookupRequest {
            imei,
            source: &self.source,
        }
        .url();

        let body = fetcher::fetch_text(
            self.client
                .get(url)
                .bearer_auth(&self.token)
                .header(reqwest::header::ACCEPT, "application/json"),
        )
        .await?;

        parser::parse_device_json(&body)
    }
}

impl Resolver for ApiResolver {
    fn source_name(&self) -> &'static str {
        "api"
    }

    async fn resolve(&self, imei: &Imei) -> LookupOutcome {
        let span = info_span!("lookup", source = self.source_name(), %imei);
        async { settle(self.lookup(imei).await) }
            .instrument(span)
            .await
    }
}

/// Folds a resolver result into an outcome, logging per failure kind.
fn settle(result: Result<LookupOutcome, LookupError>) -> LookupOutcome {
    let err = match result {
        Ok(outcome) => {
            match &outcome {
                LookupOutcome::PartialOrUnrecognized { raw_payload } => {
                    warn!(payload = %raw_payload, "Source returned incomplete data")
                }
                LookupOutcome::Found { fields, .. } => {
                    info!(fields = fields.len(), "Lookup succeeded")
                }
                LookupOutcome::Failure(_) => {}
            }
            return outcome;
        }
        Err(err) => err,
    };

    let failure = Failure::from(err);
    match failure.kind {
        FailureKind::NotFound | FailureKind::InvalidInput => {
            debug!(kind = ?failure.kind, "No data for IMEI")
        }
        FailureKind::InternalError => {
            error!(detail = %failure.detail, "Unclassified lookup error")
        }
        kind => warn!(?kind, detail = %failure.detail, "Lookup failed"),
    }

    LookupOutcome::Failure(failure)
}
