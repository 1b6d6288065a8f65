//! Core types for PageKit

use crate::locator::Scheme;
use serde::Serialize;

/// Result of fetching one target
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchResponse {
    /// The fetched target, rendered as a locator
    pub url: String,

    /// Scheme branch that produced the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,

    /// HTTP status code (network targets only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// HTTP reason phrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Content-Type header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Content size in bytes
    pub size: u64,

    /// The fetched body
    pub content: String,
}
