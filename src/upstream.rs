// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Forwarding client for the identity authority's `/validate/check`.
//!
//! The relay does not interpret WebAuthn. It posts the caller's JSON body
//! upstream, reads the reply to completion into a buffer owned by the call,
//! and parses it once. Anything short of a complete JSON reply is a
//! [`RelayError`], which always renders as `502 Bad Gateway`.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

/// Body sent to the caller whenever the upstream reply is unusable.
pub const BAD_GATEWAY_BODY: &str = "Bad Gateway";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to build upstream HTTP client: {0}")]
    Client(String),

    #[error("identity authority unreachable: {0}")]
    Unreachable(String),

    #[error("identity authority did not answer within {0:?}")]
    Timeout(Duration),

    #[error("identity authority reply ended before the message was complete: {0}")]
    IncompleteBody(String),

    #[error("identity authority reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("identity authority reply carries no data: {0}")]
    EmptyReply(Value),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Relaying to identity authority failed");
        (StatusCode::BAD_GATEWAY, BAD_GATEWAY_BODY).into_response()
    }
}

/// A complete, decoded reply from the authority.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        // axum::Json already sets Content-Type: application/json.
        (self.status, axum::Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    check_url: Url,
    timeout: Duration,
    http: Client,
}

impl UpstreamClient {
    /// Create a client for the given `/validate/check` URL.
    pub fn new(check_url: Url, timeout: Duration) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self {
            check_url,
            timeout,
            http,
        })
    }

    pub fn check_url(&self) -> &Url {
        &self.check_url
    }

    /// Forward one request body to the authority.
    ///
    /// The body is serialized once and sent as-is; `origin` is passed through
    /// so the authority can check it against the WebAuthn relying party.
    pub async fn forward(
        &self,
        body: &Value,
        origin: Option<&HeaderValue>,
    ) -> Result<UpstreamReply, RelayError> {
        let payload = serde_json::to_vec(body)?;

        let mut request = self
            .http
            .post(self.check_url.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(origin) = origin {
            request = request.header(header::ORIGIN, origin.clone());
        }

        // Content-Length comes from the buffered payload.
        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| self.classify(e, false))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, true))?;

        let body: Value = serde_json::from_slice(&bytes)?;
        if !carries_data(&body) {
            return Err(RelayError::EmptyReply(body));
        }

        if let Some(user_id) = authenticated_user(&body) {
            info!(user_id = %user_id, "User has authenticated successfully");
        } else if is_authenticated(&body) {
            warn!("Authority reported success without detail.user.id");
        }

        Ok(UpstreamReply { status, body })
    }

    fn classify(&self, error: reqwest::Error, reading_body: bool) -> RelayError {
        if error.is_timeout() {
            RelayError::Timeout(self.timeout)
        } else if reading_body {
            RelayError::IncompleteBody(error.to_string())
        } else {
            RelayError::Unreachable(error.to_string())
        }
    }
}

/// `null`, `false`, `0` and `""` are not a usable reply.
fn carries_data(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `result.status` and `result.value` are both `true`.
pub fn is_authenticated(body: &Value) -> bool {
    body.pointer("/result/status").and_then(Value::as_bool) == Some(true)
        && body.pointer("/result/value").and_then(Value::as_bool) == Some(true)
}

/// The id of the user a fully successful reply authenticated.
pub fn authenticated_user(body: &Value) -> Option<String> {
    if !is_authenticated(body) {
        return None;
    }
    match body.pointer("/detail/user/id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
