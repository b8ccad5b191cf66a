// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error as _;

use reqwest::StatusCode;

use super::{ceremony::CeremonyError, transport::TransportError};
use crate::models::UNSUPPORTED_CREDENTIAL_MESSAGE;

/// Why a login attempt (or the flow itself) failed.
///
/// Everything except the two capability errors is recoverable: the form is
/// unlocked again and the user may resubmit.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// No signature ceremony adapter was supplied.
    #[error("missing client capability")]
    CapabilityMissing,

    /// The adapter exists but cannot run here.
    #[error("capability unavailable")]
    CapabilityUnsupported,

    /// The relay or authority answered with a server error, or with a client
    /// error that carries no `result` object.
    #[error("{message}")]
    UpstreamServer { status: StatusCode, message: String },

    /// `result.status` or `result.value` is false.
    #[error("{0}")]
    AuthenticationRejected(String),

    /// No challenge was issued: unknown user or wrong PIN.
    #[error("{0}")]
    ChallengeUnavailable(String),

    /// A challenge was issued, but not a WebAuthn one.
    #[error("{}", UNSUPPORTED_CREDENTIAL_MESSAGE)]
    UnsupportedCredentialType,

    #[error("a PIN is required to request a challenge")]
    EmptyPin,

    #[error("invalid authority response: {0}")]
    InvalidResponse(String),

    #[error("could not reach the relay")]
    Transport(#[from] TransportError),

    #[error("signature ceremony failed")]
    Ceremony(#[from] CeremonyError),

    #[error("already authenticated")]
    AlreadyAuthenticated,
}

impl LoginError {
    /// Capability errors end the session; nothing can be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LoginError::CapabilityMissing | LoginError::CapabilityUnsupported
        )
    }

    /// Detail shown under the error headline: an explanation for the
    /// capability errors, the cause chain for everything else.
    pub fn trace(&self) -> String {
        match self {
            LoginError::CapabilityMissing => {
                "No signature ceremony adapter was provided to the login flow.".to_string()
            }
            LoginError::CapabilityUnsupported => {
                "Cannot access the WebAuthn API. Make sure WebAuthn is supported and HTTPS is used."
                    .to_string()
            }
            _ => {
                let mut lines = vec![format!("LoginError: {self}")];
                let mut source = self.source();
                while let Some(cause) = source {
                    lines.push(format!("  caused by: {cause}"));
                    source = cause.source();
                }
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_credential_has_fixed_message() {
        assert_eq!(
            LoginError::UnsupportedCredentialType.to_string(),
            "The given PIN is either incorrect, or does not correspond to a WebAuthn token."
        );
    }

    #[test]
    fn only_capability_errors_are_fatal() {
        assert!(LoginError::CapabilityMissing.is_fatal());
        assert!(LoginError::CapabilityUnsupported.is_fatal());
        assert!(!LoginError::EmptyPin.is_fatal());
        assert!(!LoginError::AuthenticationRejected("no".into()).is_fatal());
    }

    #[test]
    fn trace_walks_the_cause_chain() {
        let err = LoginError::from(TransportError::Request("connection refused".into()));
        let trace = err.trace();
        assert!(trace.starts_with("LoginError: could not reach the relay"));
        assert!(trace.contains("caused by: request to relay failed: connection refused"));
    }
}
