//! Transport abstraction between the host and the signer.
//!
//! A transport moves one framed request to the signer and returns its
//! response; delivery is exactly-once and in-order per call. Retry
//! policy, if any, belongs to the transport, not to the session logic.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use common::message::{Request, Response};

/// Half-duplex request/response channel to a signer.
#[async_trait]
pub trait Transport: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    /// Sends one request and waits for the signer's response.
    async fn exchange(&self, request: &Request) -> Result<Response, Self::Error>;
}

/// Errors from the TCP transport.
#[derive(Debug)]
pub enum TcpTransportError {
    /// Socket-level failure.
    Io(std::io::Error),
    /// The peer's frame could not be decoded.
    BadFrame(&'static str),
}

impl std::fmt::Display for TcpTransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TcpTransportError::Io(e) => write!(f, "io error: {}", e),
            TcpTransportError::BadFrame(detail) => write!(f, "bad frame: {}", detail),
        }
    }
}

impl Error for TcpTransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TcpTransportError::Io(e) => Some(e),
            TcpTransportError::BadFrame(_) => None,
        }
    }
}

impl From<std::io::Error> for TcpTransportError {
    fn from(e: std::io::Error) -> Self {
        TcpTransportError::Io(e)
    }
}

/// Transport to a signer emulator over TCP.
///
/// Frames are postcard-encoded messages behind a 4-byte big-endian
/// length prefix. Exchange and byte counters are kept so tests and
/// callers can observe exactly how much signer traffic occurred.
pub struct TcpTransport {
    connection: Mutex<TcpStream>,
    total_exchanges: AtomicU64,
    total_sent: AtomicU64,
    total_received: AtomicU64,
}

impl TcpTransport {
    /// Connects to a signer emulator at the provided socket address.
    pub async fn connect(addr: SocketAddr) -> Result<Self, TcpTransportError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            connection: Mutex::new(stream),
            total_exchanges: AtomicU64::new(0),
            total_sent: AtomicU64::new(0),
            total_received: AtomicU64::new(0),
        })
    }

    /// Number of exchanges made with this instance. An exchange
    /// includes both sending a request and receiving a response.
    pub fn total_exchanges(&self) -> u64 {
        self.total_exchanges.load(Ordering::Relaxed)
    }

    /// Total bytes sent.
    pub fn total_sent(&self) -> u64 {
        self.total_sent.load(Ordering::Relaxed)
    }

    /// Total bytes received.
    pub fn total_received(&self) -> u64 {
        self.total_received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    type Error = TcpTransportError;

    async fn exchange(&self, request: &Request) -> Result<Response, Self::Error> {
        self.total_exchanges.fetch_add(1, Ordering::Relaxed);

        let body = postcard::to_allocvec(request)
            .map_err(|_| TcpTransportError::BadFrame("request serialization failed"))?;

        let mut frame = Vec::with_capacity(body.len() + 4);
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);

        let mut stream = self.connection.lock().await;
        stream.write_all(&frame).await?;
        self.total_sent
            .fetch_add(frame.len() as u64, Ordering::Relaxed);

        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;
        self.total_received.fetch_add(4, Ordering::Relaxed);

        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;
        self.total_received
            .fetch_add(body.len() as u64, Ordering::Relaxed);

        postcard::from_bytes(&body)
            .map_err(|_| TcpTransportError::BadFrame("response deserialization failed"))
    }
}
