//! HTTP delivery of a single payload

use std::error::Error as _;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::config::RelayConfig;
use crate::error::{Error, Result};

use super::DeliveryError;

/// Sends one payload to one URL and reports the response status
///
/// Implementations block until a response or a transport-level error.
/// Interpreting the status code is left to the caller.
pub trait Transport {
    fn deliver(&self, url: &str, body: &[u8]) -> std::result::Result<u16, DeliveryError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn deliver(&self, url: &str, body: &[u8]) -> std::result::Result<u16, DeliveryError> {
        (**self).deliver(url, body)
    }
}

/// Blocking HTTP transport
///
/// Wraps an async `reqwest` client in a current-thread runtime so the replay
/// loop can wait on each delivery before touching the next entry. Must not be
/// used from inside another tokio runtime.
pub struct HttpTransport {
    http_client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTransport {
    /// Create a transport from relay configuration
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Transport(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            http_client,
            runtime,
        })
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, url: &str, body: &[u8]) -> std::result::Result<u16, DeliveryError> {
        self.runtime.block_on(async {
            let response = self
                .http_client
                .post(url)
                .body(body.to_vec())
                .send()
                .await
                .map_err(|e| DeliveryError::Transport(describe(&e)))?;

            Ok(response.status().as_u16())
        })
    }
}

/// Flatten a reqwest error and its sources into one line
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_with_and_without_timeout() {
        assert!(HttpTransport::new(&RelayConfig::default()).is_ok());
        assert!(HttpTransport::new(&RelayConfig {
            timeout_secs: Some(5)
        })
        .is_ok());
    }

    #[test]
    fn test_invalid_url_is_transport_error() {
        let transport = HttpTransport::new(&RelayConfig::default()).unwrap();
        let err = transport.deliver("not a url", b"{}").unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
