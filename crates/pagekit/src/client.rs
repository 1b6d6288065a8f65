//! Client entry points for PageKit
//!
//! This module provides the main entry points for fetching targets.
//! The actual fetch logic is implemented by fetchers in the
//! [`fetchers`](crate::fetchers) module.

use crate::error::FetchError;
use crate::fetchers::FetcherRegistry;
use crate::locator::Target;
use crate::types::FetchResponse;
use crate::DEFAULT_USER_AGENT;
use rustls::ClientConfig;
use std::sync::Arc;

/// Fetch options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// TLS configuration; defaults to the Mozilla root store
    pub tls_config: Option<Arc<ClientConfig>>,
}

impl FetchOptions {
    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Use a custom TLS configuration, e.g. with extra trusted roots
    pub fn tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// User-Agent sent on the request
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Fetch a target and return its body
pub async fn fetch(target: &Target) -> Result<String, FetchError> {
    fetch_response(target).await.map(|resp| resp.content)
}

/// Fetch a target and return the body together with response metadata
pub async fn fetch_response(target: &Target) -> Result<FetchResponse, FetchError> {
    fetch_with_options(target, &FetchOptions::default()).await
}

/// Fetch a target with custom options
///
/// Uses the default fetcher registry. For custom fetchers, use
/// [`FetcherRegistry`] directly.
pub async fn fetch_with_options(
    target: &Target,
    options: &FetchOptions,
) -> Result<FetchResponse, FetchError> {
    let registry = FetcherRegistry::with_defaults();
    registry.fetch(target, options).await
}
