//! Fetcher system
//!
//! Design: each fetcher handles one or more schemes. FetcherRegistry
//! dispatches a target to the first fetcher that matches it, so exactly one
//! of network fetch, local-file read or inline-data return applies.

mod data;
mod file;
mod http;

pub use data::DataFetcher;
pub use file::FileFetcher;
pub use http::HttpFetcher;

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::locator::Target;
use crate::types::FetchResponse;
use async_trait::async_trait;

/// Trait for scheme-specific content fetchers
///
/// Each fetcher declares which targets it handles via `matches()` and
/// performs the actual fetch via `fetch()`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this fetcher can handle the given target
    fn matches(&self, target: &Target) -> bool;

    /// Fetch content for the target
    ///
    /// Called only if `matches()` returned true.
    async fn fetch(
        &self,
        target: &Target,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError>;
}

/// Registry of fetchers that dispatches to the appropriate handler
///
/// Fetchers are tried in registration order; the first match wins.
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FetcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            fetchers: Vec::new(),
        }
    }

    /// Create a registry with the data, file and http fetchers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DataFetcher::new()));
        registry.register(Box::new(FileFetcher::new()));
        registry.register(Box::new(HttpFetcher::new()));
        registry
    }

    /// Register a fetcher
    pub fn register(&mut self, fetcher: Box<dyn Fetcher>) {
        self.fetchers.push(fetcher);
    }

    /// Fetch a target using the first matching fetcher
    pub async fn fetch(
        &self,
        target: &Target,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        for fetcher in &self.fetchers {
            if fetcher.matches(target) {
                tracing::debug!(fetcher = fetcher.name(), target = %target, "Using fetcher");
                return fetcher.fetch(target, options).await;
            }
        }

        Err(FetchError::NoFetcher(target.scheme))
    }
}
