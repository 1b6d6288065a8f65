//! Locator parsing
//!
//! Turns an arbitrary input string into a [`Target`]. Parsing is total:
//! [`Locator::parse`] never fails, it substitutes [`Target::fallback`]
//! whenever [`Locator::try_parse`] reports a [`LocatorError`].

use crate::error::LocatorError;
use crate::{DEFAULT_LOCAL_FILE, FALLBACK_HOST};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Marker for inline HTML payloads
pub const DATA_MARKER: &str = "data:text/html,";

/// Marker for absolute local file paths
pub const FILE_MARKER: &str = "file:///";

const SCHEME_SEPARATOR: &str = "://";

/// Which branch of fetch behavior applies to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
}

impl Scheme {
    /// Port used when the authority does not name one
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
            Scheme::File | Scheme::Data => 0,
        }
    }

    /// True for schemes that go over the network
    pub fn is_network(self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed, validated connection target
///
/// For `data` targets `path` holds the inline payload; for `file` targets
/// `host` is empty and `port` is 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Target {
    /// The fixed well-known target used when parsing fails
    pub fn fallback() -> Self {
        Self {
            scheme: Scheme::Https,
            host: FALLBACK_HOST.to_string(),
            port: Scheme::Https.default_port(),
            path: "/".to_string(),
        }
    }

    fn file(path: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::File,
            host: String::new(),
            port: 0,
            path: path.into(),
        }
    }

    fn data(payload: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::Data,
            host: String::new(),
            port: 0,
            path: payload.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::Http | Scheme::Https => write!(
                f,
                "{}://{}:{}{}",
                self.scheme, self.host, self.port, self.path
            ),
            Scheme::File => write!(f, "file://{}", self.path),
            Scheme::Data => write!(f, "{}{}", DATA_MARKER, self.path),
        }
    }
}

/// Locator parser
///
/// Carries the local file that an empty input resolves to.
#[derive(Debug, Clone)]
pub struct Locator {
    default_file: PathBuf,
}

impl Default for Locator {
    fn default() -> Self {
        Self::with_default_file(DEFAULT_LOCAL_FILE)
    }
}

impl Locator {
    /// Create a parser whose empty input selects `path`
    pub fn with_default_file(path: impl Into<PathBuf>) -> Self {
        Self {
            default_file: path.into(),
        }
    }

    /// Parse `input`, substituting [`Target::fallback`] on any error
    pub fn parse(&self, input: &str) -> Target {
        match self.try_parse(input) {
            Ok(target) => target,
            Err(e) => {
                debug!(input, reason = %e, "Locator fell back to default target");
                Target::fallback()
            }
        }
    }

    /// Parse `input`, reporting why it was rejected
    pub fn try_parse(&self, input: &str) -> Result<Target, LocatorError> {
        if input.is_empty() {
            return Ok(Target::file(self.default_file.to_string_lossy()));
        }

        if let Some(payload) = input.strip_prefix(DATA_MARKER) {
            return Ok(Target::data(payload));
        }

        if let Some(rest) = input.strip_prefix(FILE_MARKER) {
            return Ok(Target::file(format!("/{rest}")));
        }

        // No separator means an implicit http target
        let (scheme, rest) = match input.split_once(SCHEME_SEPARATOR) {
            Some((scheme, rest)) => (parse_network_scheme(scheme)?, rest),
            None => (Scheme::Http, input),
        };

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, format!("/{path}")),
            None => (rest, "/".to_string()),
        };

        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (authority, scheme.default_port()),
        };

        validate_host(host)?;

        Ok(Target {
            scheme,
            host: host.to_string(),
            port,
            path,
        })
    }
}

/// Parse a locator with the default [`Locator`]
pub fn parse(input: &str) -> Target {
    Locator::default().parse(input)
}

fn parse_network_scheme(scheme: &str) -> Result<Scheme, LocatorError> {
    match scheme.to_lowercase().as_str() {
        "http" => Ok(Scheme::Http),
        "https" => Ok(Scheme::Https),
        other => Err(LocatorError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_port(port: &str) -> Result<u16, LocatorError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(LocatorError::InvalidPort(port.to_string())),
        Ok(n) => Ok(n),
    }
}

fn validate_host(host: &str) -> Result<(), LocatorError> {
    if host.is_empty() {
        return Err(LocatorError::EmptyHost);
    }
    if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(LocatorError::InvalidHost(host.to_string()));
    }
    Ok(())
}
