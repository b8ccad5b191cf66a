// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! How the login flow reaches the relay.

use std::{future::Future, time::Duration};

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::UPSTREAM_CHECK_PATH;
use crate::models::AuthenticationRequest;

/// Default upper bound for one round trip to the relay.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),

    #[error("request to relay failed: {0}")]
    Request(String),
}

/// A relay answer. `body` is `None` when it was not JSON (e.g. the plain
/// `Bad Gateway` text).
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl RelayReply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }
}

pub trait RelayTransport {
    /// Post one authentication request to `/validate/check`.
    fn send(
        &self,
        request: &AuthenticationRequest,
    ) -> impl Future<Output = Result<RelayReply, TransportError>> + Send;
}

/// [`RelayTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelayTransport {
    endpoint: Url,
    origin: Option<String>,
    timeout: Duration,
    http: Client,
}

impl HttpRelayTransport {
    /// Create a transport for the relay at `base_url` (e.g.
    /// `http://localhost:3000/`).
    ///
    /// `origin` is sent as the `Origin` header. Browsers add it themselves;
    /// other clients must name the WebAuthn origin the credential was
    /// registered for.
    pub fn new(base_url: &str, origin: Option<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, origin, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        origin: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(UPSTREAM_CHECK_PATH))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint,
            origin,
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &AuthenticationRequest) -> Result<RelayReply, TransportError> {
        debug!(
            user = request.user(),
            transaction_id = ?request.transaction_id(),
            "Posting to relay"
        );
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(request);
        if let Some(origin) = &self.origin {
            builder = builder.header(header::ORIGIN, origin);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        let body = serde_json::from_slice(&bytes).ok();

        debug!(
            status = %status,
            json = body.is_some(),
            "Relay answered /validate/check"
        );

        Ok(RelayReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChallengeRequest;
    use crate::upstream::tests::{fixed_authority, raw_authority};
    use serde_json::json;

    fn phase_one() -> AuthenticationRequest {
        AuthenticationRequest::Challenge(ChallengeRequest {
            user: "alice".into(),
            realm: None,
            pass: "1234".into(),
        })
    }

    #[test]
    fn endpoint_is_joined_onto_base_url() {
        let transport = HttpRelayTransport::new("http://localhost:3000/", None).unwrap();
        assert_eq!(
            transport.endpoint().as_str(),
            "http://localhost:3000/validate/check"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpRelayTransport::new("not a url", None).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn json_replies_are_decoded() {
        let body = json!({ "result": { "status": true, "value": false }, "detail": {} });
        let addr = fixed_authority(StatusCode::OK, body.clone()).await;
        let transport = HttpRelayTransport::new(&format!("http://{addr}/"), None).unwrap();

        let reply = transport.send(&phase_one()).await.unwrap();
        assert_eq!(reply, RelayReply::json(StatusCode::OK, body));
    }

    #[tokio::test]
    async fn plain_text_replies_have_no_body() {
        let addr = raw_authority(
            b"HTTP/1.1 502 Bad Gateway\r\nContent-Type: text/plain\r\nContent-Length: 11\r\n\r\nBad Gateway",
        )
        .await;
        let transport = HttpRelayTransport::new(&format!("http://{addr}/"), None).unwrap();

        let reply = transport.send(&phase_one()).await.unwrap();
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(reply.body, None);
    }
}
