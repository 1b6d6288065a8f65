//! Local file fetcher

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::locator::{Scheme, Target};
use crate::types::FetchResponse;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads `file` targets from local storage
///
/// Content is decoded as UTF-8, replacing invalid sequences.
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    fn name(&self) -> &'static str {
        "file"
    }

    fn matches(&self, target: &Target) -> bool {
        target.scheme == Scheme::File
    }

    async fn fetch(
        &self,
        target: &Target,
        _options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        let path = PathBuf::from(&target.path);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| FetchError::LocalResource { path, source })?;

        Ok(FetchResponse {
            url: target.to_string(),
            scheme: Some(Scheme::File),
            size: bytes.len() as u64,
            content: String::from_utf8_lossy(&bytes).into_owned(),
            ..Default::default()
        })
    }
}
