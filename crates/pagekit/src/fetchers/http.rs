//! HTTP/HTTPS fetcher
//!
//! Opens a TCP connection, upgrades it to TLS for https targets, then runs
//! a single request/response [`exchange`]. No retries, no redirects.

use crate::channel::{default_tls_config, PlainChannel, TlsChannel};
use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::http::{exchange, Response};
use crate::locator::{Scheme, Target};
use crate::types::FetchResponse;
use async_trait::async_trait;
use tracing::debug;

/// Network fetcher for `http` and `https` targets
///
/// Non-2xx responses are returned like any other; only transport failures
/// and rejected encodings are errors.
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }

    async fn request(
        &self,
        target: &Target,
        options: &FetchOptions,
    ) -> Result<Response, FetchError> {
        let user_agent = options.effective_user_agent();

        if target.scheme == Scheme::Https {
            let config = match &options.tls_config {
                Some(config) => config.clone(),
                None => default_tls_config().map_err(FetchError::TlsConfig)?,
            };
            let plain = PlainChannel::connect(&target.host, target.port).await?;
            let mut channel = TlsChannel::upgrade(plain, &target.host, config).await?;
            exchange(&mut channel, target, user_agent).await
        } else {
            let mut channel = PlainChannel::connect(&target.host, target.port).await?;
            exchange(&mut channel, target, user_agent).await
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    fn matches(&self, target: &Target) -> bool {
        target.scheme.is_network()
    }

    async fn fetch(
        &self,
        target: &Target,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        let response = self.request(target, options).await?;
        debug!(
            status = response.status.code,
            headers = response.headers.len(),
            "Parsed response"
        );

        Ok(FetchResponse {
            url: target.to_string(),
            scheme: Some(target.scheme),
            status_code: Some(response.status.code),
            reason: Some(response.status.reason.clone()).filter(|r| !r.is_empty()),
            content_type: response.content_type().map(str::to_string),
            size: response.body.len() as u64,
            content: response.body,
        })
    }
}
