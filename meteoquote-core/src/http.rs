use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;

/// One client shared by every provider, with connect and read timeouts.
pub fn build_client(config: &Config) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.timeout())
        .read_timeout(config.timeout())
        .build()
        .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {e}")))
}

/// Sends `request` and decodes a successful JSON body into `T`.
pub async fn get_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, FetchError> {
    let res = request.send().await?;

    let status = res.status();
    debug!(provider, %status, url = %res.url(), "response received");

    let body = res.text().await?;

    if !status.is_success() {
        return Err(FetchError::from_status(provider, status, &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| FetchError::MalformedResponse(format!("{provider} payload: {e}")))
}
