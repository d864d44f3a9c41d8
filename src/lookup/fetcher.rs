use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::lookup::error::LookupError;

const USER_AGENT: &str = concat!("imei-bot/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
}

/// Sends the request and returns the body of a 2xx response.
pub async fn fetch_text(request: RequestBuilder) -> Result<String, LookupError> {
    let res = request.send().await?;
    let status = res.status();
    debug!(status = status.as_u16(), url = %res.url(), "Upstream responded");

    if !status.is_success() {
        return Err(LookupError::Status(status));
    }

    Ok(res.text().await?)
}
