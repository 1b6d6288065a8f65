//! Inline data fetcher
//!
//! The payload travels in the locator itself, so there is no I/O.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::locator::{Scheme, Target};
use crate::types::FetchResponse;
use async_trait::async_trait;

/// Returns the payload of `data:text/html,` locators
pub struct DataFetcher;

impl DataFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for DataFetcher {
    fn name(&self) -> &'static str {
        "data"
    }

    fn matches(&self, target: &Target) -> bool {
        target.scheme == Scheme::Data
    }

    async fn fetch(
        &self,
        target: &Target,
        _options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse {
            url: target.to_string(),
            scheme: Some(Scheme::Data),
            content_type: Some("text/html".to_string()),
            size: target.path.len() as u64,
            content: target.path.clone(),
            ..Default::default()
        })
    }
}
