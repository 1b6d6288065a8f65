//! Error types for PageKit
//!
//! Two families that never mix: [`LocatorError`] is always recovered inside
//! [`parse`](crate::parse) by substituting the fallback target, while
//! [`FetchError`] always propagates to the caller.

use crate::locator::Scheme;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a locator string could not be turned into a target
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// Scheme before `://` is not http or https
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Authority has no host
    #[error("Missing host")]
    EmptyHost,

    /// Host contains characters that cannot appear in a host name
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// Port is not a number in 1..=65535
    #[error("Invalid port: {0:?}")]
    InvalidPort(String),
}

/// Errors that can occur during fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to open the TCP connection
    #[error("Failed to connect to {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Host cannot be used as a TLS server name
    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// TLS client configuration could not be built
    #[error("Failed to create TLS configuration")]
    TlsConfig(#[source] rustls::Error),

    /// TLS handshake did not complete
    #[error("TLS handshake failed")]
    TlsHandshake(#[source] io::Error),

    /// Write or read failed on an established connection
    #[error("Transport error")]
    Transport(#[source] io::Error),

    /// Response declares a body transformation we cannot reverse
    #[error("Unsupported response encoding: {header}: {value}")]
    UnsupportedEncoding { header: String, value: String },

    /// Response could not be parsed as HTTP/1.x
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local file could not be read
    #[error("Failed to read local file {}", .path.display())]
    LocalResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No registered fetcher handles the scheme
    #[error("No fetcher available for scheme {0}")]
    NoFetcher(Scheme),
}

impl FetchError {
    /// True when the network broke rather than the server misbehaving
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            FetchError::Connect { .. }
                | FetchError::InvalidServerName(_)
                | FetchError::TlsHandshake(_)
                | FetchError::Transport(_)
        )
    }

    /// True when the server sent an encoding we refuse to decode
    pub fn is_encoding_error(&self) -> bool {
        matches!(self, FetchError::UnsupportedEncoding { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LocatorError::UnsupportedScheme("ftp".to_string()).to_string(),
            "Unsupported scheme: ftp"
        );
        assert_eq!(
            LocatorError::InvalidPort("abc".to_string()).to_string(),
            "Invalid port: \"abc\""
        );
        assert_eq!(
            FetchError::UnsupportedEncoding {
                header: "transfer-encoding".to_string(),
                value: "chunked".to_string(),
            }
            .to_string(),
            "Unsupported response encoding: transfer-encoding: chunked"
        );
        assert_eq!(
            FetchError::Connect {
                host: "example.com".to_string(),
                port: 80,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
            .to_string(),
            "Failed to connect to example.com:80"
        );
        assert_eq!(
            FetchError::LocalResource {
                path: PathBuf::from("/missing.html"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .to_string(),
            "Failed to read local file /missing.html"
        );
    }

    #[test]
    fn test_error_classification() {
        let refused = FetchError::Connect {
            host: "localhost".to_string(),
            port: 1,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(refused.is_connection_error());
        assert!(!refused.is_encoding_error());

        let encoded = FetchError::UnsupportedEncoding {
            header: "content-encoding".to_string(),
            value: "gzip".to_string(),
        };
        assert!(encoded.is_encoding_error());
        assert!(!encoded.is_connection_error());

        assert!(!FetchError::InvalidResponse("empty".to_string()).is_connection_error());
    }
}
