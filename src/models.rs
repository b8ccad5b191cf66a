// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wire Data Models
//!
//! Request and response bodies exchanged with `/validate/check`. The relay
//! itself forwards bodies as opaque JSON; these types are what the login
//! flow builds and reads, and what the OpenAPI document describes.
//!
//! ## Field names
//!
//! The authority dictates the wire names: `transaction_id`,
//! `webAuthnSignRequest`, and the all-lowercase signature fields
//! (`credentialid`, `clientdata`, ...). Rust names are mapped with
//! `#[serde(rename)]` where they differ.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Reason given when a challenge carries no WebAuthn sign request.
pub const UNSUPPORTED_CREDENTIAL_MESSAGE: &str =
    "The given PIN is either incorrect, or does not correspond to a WebAuthn token.";

// =============================================================================
// Identity
// =============================================================================

/// Separator between user and realm in the login field (`alice@realm`).
pub const LOGIN_REALM_DELIMITER: char = '@';

/// The user (and optional realm) one attempt authenticates as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialIdentity {
    pub user: String,
    pub realm: Option<String>,
}

impl CredentialIdentity {
    /// Split a login string on the first [`LOGIN_REALM_DELIMITER`].
    ///
    /// `"alice@corp"` yields user `alice` in realm `corp`; `"alice"` has no
    /// realm at all, so the `realm` key is left out of request bodies.
    pub fn parse(login: &str) -> Self {
        match login.split_once(LOGIN_REALM_DELIMITER) {
            Some((user, realm)) => Self {
                user: user.to_string(),
                realm: Some(realm.to_string()),
            },
            None => Self {
                user: login.to_string(),
                realm: None,
            },
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Opaque WebAuthn sign request issued by the authority.
///
/// Handed to the signature ceremony untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignRequest(pub Value);

/// Assertion produced by the signature ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignatureResponse {
    #[serde(rename = "credentialid")]
    pub credential_id: String,
    #[serde(rename = "clientdata")]
    pub client_data: String,
    #[serde(rename = "signaturedata")]
    pub signature_data: String,
    #[serde(rename = "authenticatordata")]
    pub authenticator_data: String,
    #[serde(rename = "userhandle", default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
    #[serde(
        rename = "assertionclientextensions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assertion_client_extensions: Option<String>,
}

/// Phase 1: ask the authority for a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChallengeRequest {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    /// The token PIN. Never empty in this phase.
    pub pass: String,
}

/// Phase 2: answer a challenge with a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChallengeAnswer {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    /// Always empty: this phase authenticates by signature.
    pub pass: String,
    pub transaction_id: String,
    #[serde(flatten)]
    pub signature: SignatureResponse,
}

/// Body of a `POST /validate/check` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AuthenticationRequest {
    Answer(ChallengeAnswer),
    Challenge(ChallengeRequest),
}

impl AuthenticationRequest {
    /// The `user` field of either phase.
    pub fn user(&self) -> &str {
        match self {
            Self::Challenge(r) => &r.user,
            Self::Answer(r) => &r.user,
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Challenge(_) => None,
            Self::Answer(r) => Some(&r.transaction_id),
        }
    }
}

// =============================================================================
// Authority responses
// =============================================================================

/// The authority sends `null` for absent objects (`"detail": null`).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorityError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorityResult {
    /// Whether the request was processed at all.
    pub status: bool,
    /// Whether the user is authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AuthorityError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChallengeAttributes {
    #[serde(
        rename = "webAuthnSignRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<Object>)]
    pub sign_request: Option<SignRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorityDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ChallengeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

/// What the authority answers on `/validate/check`, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorityResponse {
    pub result: AuthorityResult,
    #[serde(default, deserialize_with = "null_as_default")]
    pub detail: AuthorityDetail,
}

impl AuthorityResponse {
    /// Read a reply body, keeping `result` even when the rest is malformed.
    ///
    /// `None` only when there is no boolean `result.status` to go on.
    pub fn from_body(body: Value) -> Option<Self> {
        if let Ok(response) = serde_json::from_value::<Self>(body.clone()) {
            return Some(response);
        }

        let status = body.pointer("/result/status")?.as_bool()?;
        let error = body.pointer("/result/error").map(|_| AuthorityError {
            message: body
                .pointer("/result/error/message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            code: body.pointer("/result/error/code").and_then(Value::as_i64),
        });
        Some(Self {
            result: AuthorityResult {
                status,
                value: body.pointer("/result/value").and_then(Value::as_bool),
                error,
            },
            detail: body
                .pointer("/detail/message")
                .and_then(Value::as_str)
                .map(|message| AuthorityDetail {
                    message: Some(message.to_string()),
                    ..AuthorityDetail::default()
                })
                .unwrap_or_default(),
        })
    }

    /// `result.error.message`, when present and non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.result
            .error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// A phase-1 challenge, ready for the signature ceremony.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Prompt to show the user, e.g. "Please confirm with your WebAuthn token".
    pub message: String,
    pub transaction_id: String,
    pub sign_request: SignRequest,
}

// =============================================================================
// Outcome
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

/// Terminal result of one login attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationOutcome {
    pub success: bool,
    pub detail: OutcomeDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthenticationOutcome {
    pub fn succeeded(detail: AuthorityDetail) -> Self {
        Self {
            success: true,
            detail: OutcomeDetail {
                message: detail.message.unwrap_or_default(),
                serial: detail.serial,
                user: detail.user,
            },
            error: None,
        }
    }

    /// `detail.user.id`, if the authority reported one.
    pub fn user_id(&self) -> Option<&str> {
        self.detail
            .user
            .as_ref()
            .and_then(|u| u.get("id"))
            .and_then(Value::as_str)
    }
}
