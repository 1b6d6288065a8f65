//! PageKit - minimal text-mode user agent
//!
//! This crate resolves a textual locator into a [`Target`], fetches it over
//! a raw TCP connection (upgraded in place to TLS for `https`), and strips
//! markup from the result.
//!
//! ## Pipeline
//!
//! 1. [`parse`] turns any input string into a [`Target`]. It never fails:
//!    unparsable input is replaced by [`Target::fallback`].
//! 2. [`fetch`] dispatches the target through the [`FetcherRegistry`]:
//!    - [`DataFetcher`] - returns the inline `data:text/html,` payload
//!    - [`FileFetcher`] - reads a local file
//!    - [`HttpFetcher`] - HTTP/1.1 GET over a [`Channel`], rejecting
//!      chunked and compressed responses
//! 3. [`strip_tags`] / [`render`] drop everything between `<` and `>`.
//!
//! ```no_run
//! # async fn run() -> Result<(), pagekit::FetchError> {
//! let target = pagekit::parse("https://example.org/");
//! let body = pagekit::fetch(&target).await?;
//! println!("{}", pagekit::strip_tags(&body));
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
mod error;
pub mod fetchers;
pub mod http;
pub mod locator;
mod render;
mod types;

pub use channel::{default_tls_config, Channel, PlainChannel, TlsChannel};
pub use client::{fetch, fetch_response, fetch_with_options, FetchOptions};
pub use error::{FetchError, LocatorError};
pub use fetchers::{DataFetcher, Fetcher, FetcherRegistry, FileFetcher, HttpFetcher};
pub use http::{Response, StatusLine};
pub use locator::{parse, Locator, Scheme, Target};
pub use render::{render, strip_tags};
pub use types::FetchResponse;

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "PageKit/0.1";

/// Host of the target used when a locator cannot be parsed
pub const FALLBACK_HOST: &str = "example.org";

/// Local file opened when the locator is empty
pub const DEFAULT_LOCAL_FILE: &str = "/usr/share/pagekit/index.html";
