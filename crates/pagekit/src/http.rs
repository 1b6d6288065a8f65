//! HTTP/1.1 request writing and response parsing over a [`Channel`]
//!
//! The client asks for `Connection: close` and reads until the peer closes,
//! so there is no length- or chunk-based framing. Responses that declare a
//! `transfer-encoding` or `content-encoding` are rejected outright since
//! nothing here can decode them.

use crate::channel::Channel;
use crate::error::FetchError;
use crate::locator::Target;
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Protocol version sent on the request line
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Line separator on the wire
pub const CRLF: &str = "\r\n";

/// Headers whose presence makes a response unreadable for us
const REJECTED_ENCODINGS: &[&str] = &["transfer-encoding", "content-encoding"];

const READ_CHUNK: usize = 8 * 1024;

/// First line of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: String,
    pub code: u16,
    pub reason: String,
}

impl StatusLine {
    /// Parse `HTTP/1.1 200 OK`; the reason may be empty or span several words
    pub fn parse(line: &str) -> Result<Self, FetchError> {
        let mut parts = line.split(' ');

        let version = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(FetchError::InvalidResponse(format!(
                "bad status line: {line:?}"
            )));
        }

        let code = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| FetchError::InvalidResponse(format!("bad status code: {line:?}")))?;

        let reason = parts.collect::<Vec<_>>().join(" ");

        Ok(Self {
            version: version.to_string(),
            code,
            reason,
        })
    }
}

/// Parsed response whose headers passed the encoding check
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusLine,
    /// Lower-cased names to trimmed values; last duplicate wins
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Response {
    /// Look up a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Value of the `content-type` header, if present
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Render the GET request for `target`
pub fn build_request(target: &Target, user_agent: &str) -> String {
    format!(
        "GET {path} {HTTP_VERSION}{CRLF}\
         Host: {host}{CRLF}\
         User-Agent: {user_agent}{CRLF}\
         Connection: close{CRLF}\
         {CRLF}",
        path = target.path,
        host = target.host,
    )
}

/// Split a raw response into status line, headers and body
///
/// Header lines without a `:` are skipped. Fails with
/// [`FetchError::UnsupportedEncoding`] when the body is transfer- or
/// content-encoded.
pub fn parse_response(raw: &[u8]) -> Result<Response, FetchError> {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.split(CRLF);

    let status_line = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| FetchError::InvalidResponse("empty response".to_string()))?;
    let status = StatusLine::parse(status_line)?;

    let mut headers = HashMap::new();
    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        match line.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_lowercase(), value.trim().to_string());
            }
            None => warn!(line, "Skipping malformed header line"),
        }
    }

    for name in REJECTED_ENCODINGS {
        if let Some(value) = headers.get(*name) {
            return Err(FetchError::UnsupportedEncoding {
                header: name.to_string(),
                value: value.clone(),
            });
        }
    }

    let body = lines.collect::<Vec<_>>().join(CRLF);

    Ok(Response {
        status,
        headers,
        body,
    })
}

/// Send the request for `target` over `channel` and parse the reply
///
/// The channel is closed exactly once before returning, whatever the outcome.
pub async fn exchange<C>(
    channel: &mut C,
    target: &Target,
    user_agent: &str,
) -> Result<Response, FetchError>
where
    C: Channel + ?Sized,
{
    let received = send_and_drain(channel, target, user_agent).await;

    if let Err(e) = channel.close().await {
        debug!(error = %e, "Error closing channel");
    }
    debug_assert!(channel.is_closed());

    let raw = received?;
    debug!(bytes = raw.len(), "Response received");
    parse_response(&raw)
}

async fn send_and_drain<C>(
    channel: &mut C,
    target: &Target,
    user_agent: &str,
) -> Result<Bytes, FetchError>
where
    C: Channel + ?Sized,
{
    let request = build_request(target, user_agent);
    channel
        .write_all(request.as_bytes())
        .await
        .map_err(FetchError::Transport)?;

    let mut received = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = channel.read(&mut chunk).await.map_err(FetchError::Transport)?;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&chunk[..n]);
    }

    Ok(received.freeze())
}
