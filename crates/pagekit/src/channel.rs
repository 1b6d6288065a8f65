//! Byte channels: plaintext TCP and TLS over TCP
//!
//! A [`TlsChannel`] is built by consuming an already-connected
//! [`PlainChannel`], so the upgrade happens in place on the same socket.
//! Both implementations make [`Channel::close`] idempotent.

use crate::error::FetchError;
use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Bidirectional byte stream used by the HTTP exchange
#[async_trait]
pub trait Channel: Send {
    /// Write the whole buffer
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Read the next chunk; `Ok(0)` means the peer closed the stream
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the connection; later calls are no-ops
    async fn close(&mut self) -> io::Result<()>;

    /// Whether [`close`](Channel::close) has already run
    fn is_closed(&self) -> bool;
}

/// Unencrypted channel over any async stream (a `TcpStream` in practice)
#[derive(Debug)]
pub struct PlainChannel<S = TcpStream> {
    stream: S,
    closed: bool,
}

impl PlainChannel<TcpStream> {
    /// Open a TCP connection to `host:port`
    pub async fn connect(host: &str, port: u16) -> Result<Self, FetchError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| FetchError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;
        debug!(host, port, "Connected");
        Ok(Self::new(stream))
    }
}

impl<S> PlainChannel<S> {
    /// Wrap an already-connected stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    fn into_inner(self) -> S {
        self.stream
    }
}

#[async_trait]
impl<S> Channel for PlainChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf).await
    }

    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        shutdown_quietly(self.stream.shutdown().await)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// TLS channel wrapping the socket of a former [`PlainChannel`]
pub struct TlsChannel<S = TcpStream> {
    stream: TlsStream<S>,
    closed: bool,
}

impl<S> std::fmt::Debug for TlsChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsChannel")
            .field("closed", &self.closed)
            .finish()
    }
}

impl<S> TlsChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Upgrade `plain` to TLS, validating the peer certificate against `host`
    ///
    /// Returns only once the handshake has completed.
    pub async fn upgrade(
        plain: PlainChannel<S>,
        host: &str,
        config: Arc<ClientConfig>,
    ) -> Result<Self, FetchError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| FetchError::InvalidServerName(host.to_string()))?;

        let connector = TlsConnector::from(config);
        let stream = connector
            .connect(server_name, plain.into_inner())
            .await
            .map_err(FetchError::TlsHandshake)?;
        debug!(host, "TLS handshake complete");

        Ok(Self {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl<S> Channel for TlsChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf).await
    }

    // Sends close_notify, then shuts down the underlying socket
    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        shutdown_quietly(self.stream.shutdown().await)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A peer that already went away is not a close failure
fn shutdown_quietly(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

/// TLS client configuration trusting the Mozilla root store
///
/// Certificate verification is always enabled.
pub fn default_tls_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config =
        ClientConfig::builder_with_provider(rustls::crypto::ring::default_provider().into())
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_store)
            .with_no_client_auth();

    Ok(Arc::new(config))
}
