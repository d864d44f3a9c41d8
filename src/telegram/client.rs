use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::telegram::models::{ApiResponse, Message, SendMessage, Update};

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("bot api request failed: {0}")]
    Http(reqwest::Error),

    #[error("bot api error: {0}")]
    Api(String),
}

// Request URLs embed the bot token; keep it out of error text and logs.
impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// Thin Telegram Bot API client: long polling plus `sendMessage`.
pub struct BotClient {
    http: Client,
    endpoint: String,
    poll_timeout_secs: u64,
}

impl BotClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> anyhow::Result<Self> {
        // must outlive the server-side long poll
        let http = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs.saturating_add(10)))
            .build()
            .context("failed to build bot api client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout_secs,
        })
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TelegramError> {
        let res: ApiResponse<T> = request.send().await?.json().await?;

        match (res.ok, res.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api(
                res.description
                    .unwrap_or_else(|| "response carried no result".to_string()),
            )),
        }
    }

    /// Long-polls for message updates newer than `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let mut query = vec![
            ("timeout", self.poll_timeout_secs.to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        self.call(
            self.http
                .get(format!("{}/getUpdates", self.endpoint))
                .query(&query),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        self.call(
            self.http
                .post(format!("{}/sendMessage", self.endpoint))
                .json(&SendMessage { chat_id, text }),
        )
        .await
    }
}
