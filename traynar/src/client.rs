use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::outcome::Outcome;
use anyhow::Context;
pub use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Why no response could be classified.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<TransportError> for Outcome {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(_) => Outcome::Timeout,
            // reqwest's own timeout is not configured, but treat it the same way if it fires
            TransportError::Http(e) if e.is_timeout() => Outcome::Timeout,
            TransportError::Http(_) => Outcome::NetworkError,
        }
    }
}

/// A received response: status code plus the body, if it parsed as JSON.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Option<Value>,
}

/// Posts credential payloads to the authentication API.
///
/// Holds no per-request state; every call is independent of previous ones.
#[derive(Debug, Clone)]
pub struct CredentialClient {
    http_client: reqwest::Client,
    host: String,
}

impl CredentialClient {
    pub fn new(host: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("could not build HTTP client")?;

        Ok(CredentialClient {
            http_client,
            host: host.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sends one POST and waits at most `endpoint.timeout` for the whole exchange (headers and
    /// body). When the timer fires first the in-flight request is dropped.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        body: &B,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = endpoint.url(&self.host);
        debug!("POST endpoint={} url={}", endpoint.name, url);
        let exchange = async {
            // .json() also sets "Content-Type: application/json"
            let res = self.http_client.post(&url).json(body).send().await?;
            let status = res.status().as_u16();
            let bytes = res.bytes().await?;
            Ok::<_, TransportError>((status, bytes))
        };
        let (status, bytes) = match tokio::time::timeout(endpoint.timeout, exchange).await {
            Ok(result) => result?,
            Err(_elapsed) => return Err(TransportError::Timeout(endpoint.timeout)),
        };
        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(val) => Some(val),
            Err(e) => {
                debug!("response body is not JSON ({} bytes): {}", bytes.len(), e);
                None
            }
        };
        debug!("endpoint={} status={} body={:?}", endpoint.name, status, body);
        Ok(RawResponse { status, body })
    }

    /// Posts `body` and classifies whatever happens into exactly one `Outcome`.
    pub async fn submit<B: Serialize + ?Sized>(&self, endpoint: &Endpoint, body: &B) -> Outcome {
        let outcome = match self.post(endpoint, body).await {
            Ok(res) => endpoint.classify(res.status, res.body.as_ref()),
            Err(err) => {
                warn!("{} request failed: {}", endpoint.name, err);
                Outcome::from(err)
            }
        };
        info!("{} outcome: {}", endpoint.name, outcome.kind());
        outcome
    }
}

#[test]
fn test_transport_error_outcome() {
    assert_eq!(
        Outcome::from(TransportError::Timeout(Duration::from_secs(15))),
        Outcome::Timeout
    );
    assert_eq!(
        TransportError::Timeout(Duration::from_millis(1500)).to_string(),
        "no response within 1.5s"
    );
}

#[test]
fn test_client_host() {
    let client = CredentialClient::new("http://localhost:8080/").unwrap();
    assert_eq!(client.host(), "http://localhost:8080");
}
