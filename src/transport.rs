use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::request::redacted;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("kodik/", env!("CARGO_PKG_VERSION"));

/// A completed exchange the transport did not reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Why a GET did not produce a usable response.
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// The host could not be reached, or never answered.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with a 4xx status.
    #[error("client error status {status}")]
    Client { status: u16 },

    /// The server answered with a 5xx status; the body may carry an API error.
    #[error("server error status {status}")]
    Server { status: u16, body: Vec<u8> },

    /// Anything without a category of its own.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Sends exactly one GET per call and never interprets the payload.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_get(&self, url: &Url) -> Result<Response, TransportFailure>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_get(&self, url: &Url) -> Result<Response, TransportFailure> { (**self).send_get(url).await }
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self { Self { client } }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Timeout from `KODIK_TIMEOUT_SECS`, 30 seconds by default.
    pub fn from_env() -> anyhow::Result<Self> {
        let secs = std::env::var("KODIK_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::with_timeout(Duration::from_secs(secs))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_get(&self, url: &Url) -> Result<Response, TransportFailure> {
        tracing::debug!(url = %redacted(url), "GET");
        let resp = self.client.get(url.clone()).send().await.map_err(categorize)?;
        let status = resp.status();
        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), "client error");
            return Err(TransportFailure::Client { status: status.as_u16() });
        }
        if status.is_server_error() {
            tracing::debug!(status = status.as_u16(), "server error");
            // The body is only a hint here; an unreadable one classifies like a missing error field.
            let body = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            return Err(TransportFailure::Server { status: status.as_u16(), body });
        }
        let body = resp.bytes().await.map_err(categorize)?.to_vec();
        Ok(Response { status: status.as_u16(), body })
    }
}

fn categorize(err: reqwest::Error) -> TransportFailure {
    if err.is_connect() || err.is_timeout() {
        tracing::debug!(error = %err, "connect failure");
        TransportFailure::Connect(err.to_string())
    } else {
        TransportFailure::Other(anyhow::Error::new(err))
    }
}
