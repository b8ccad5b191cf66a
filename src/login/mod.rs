// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Challenge-Response Login Flow
//!
//! Client side of the WebAuthn login. One [`LoginFlow`] drives one login
//! form through the three protocol steps:
//!
//! 1. Post `{user, realm, pass}` to the relay and receive a challenge.
//! 2. Have the [`SignatureCeremony`] sign the challenge's sign request.
//! 3. Post the assertion together with the challenge's transaction id.
//!
//! The form is locked for the whole attempt and unlocked exactly once when
//! the attempt ends, whatever the outcome.
//!
//! ## Collaborators
//!
//! Everything the flow touches is injected at construction: the
//! [`RelayTransport`], an optional [`SignatureCeremony`], and the
//! [`LoginView`] standing in for the page. A missing or unusable ceremony is
//! detected in [`LoginFlow::new`], before any submission can happen.

pub mod ceremony;
pub mod error;
pub mod transaction;
pub mod transport;
pub mod view;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub use ceremony::{CeremonyError, SignatureCeremony};
pub use error::LoginError;
pub use transaction::PendingTransaction;
pub use transport::{HttpRelayTransport, RelayReply, RelayTransport, TransportError};
pub use view::LoginView;

use crate::models::{
    AuthenticationOutcome, AuthenticationRequest, AuthorityResponse, Challenge, ChallengeRequest,
    CredentialIdentity,
};

/// Shown when the authority issues no challenge and gives no reason.
const NO_CHALLENGE_MESSAGE: &str = "The authority did not issue a challenge.";

/// Shown when the authority rejects a signed answer without a message.
const REJECTED_MESSAGE: &str = "Authentication failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Form unlocked, waiting for a submission.
    Idle,
    /// Waiting for the challenge.
    Requesting,
    /// Waiting for the authenticator.
    Signing,
    /// Waiting for the authority to verify the assertion.
    Confirming,
    /// Terminal. The form has been replaced by the success view.
    Succeeded,
}

pub struct LoginFlow<T, C, V> {
    transport: T,
    ceremony: C,
    view: V,
    state: FlowState,
}

impl<T, C, V> LoginFlow<T, C, V>
where
    T: RelayTransport,
    C: SignatureCeremony,
    V: LoginView,
{
    /// Wire up a login form.
    ///
    /// Fails with [`LoginError::CapabilityMissing`] when `ceremony` is `None`
    /// and [`LoginError::CapabilityUnsupported`] when it cannot run here. In
    /// both cases the error is shown on `view` and no flow exists to submit to.
    pub fn new(transport: T, ceremony: Option<C>, mut view: V) -> Result<Self, LoginError> {
        let ceremony = match ceremony {
            None => Err(LoginError::CapabilityMissing),
            Some(c) if !c.is_available() => Err(LoginError::CapabilityUnsupported),
            Some(c) => Ok(c),
        };

        match ceremony {
            Ok(ceremony) => Ok(Self {
                transport,
                ceremony,
                view,
                state: FlowState::Idle,
            }),
            Err(e) => {
                tracing::error!(error = %e, "Signature ceremony not usable, login disabled");
                view.show_error(&e.to_string(), &e.trace());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Run one login attempt for `login` (`user` or `user@realm`) and `pin`.
    ///
    /// Any failure is also displayed on the view; the form is unlocked again
    /// afterwards. Once an attempt has succeeded every further call returns
    /// [`LoginError::AlreadyAuthenticated`] without touching the view.
    pub async fn submit(
        &mut self,
        login: &str,
        pin: &str,
    ) -> Result<AuthenticationOutcome, LoginError> {
        if self.state == FlowState::Succeeded {
            return Err(LoginError::AlreadyAuthenticated);
        }

        self.view.set_submit_enabled(false);
        self.view.set_processing(true);
        self.view.clear_error();

        let span = info_span!("login_attempt", attempt = %Uuid::new_v4());
        let result = self.attempt(login, pin).instrument(span).await;

        match &result {
            Ok(outcome) => {
                self.state = FlowState::Succeeded;
                info!(
                    user_id = outcome.user_id().unwrap_or_default(),
                    serial = outcome.detail.serial.as_deref().unwrap_or_default(),
                    "Login succeeded"
                );
                self.view.show_success(outcome);
            }
            Err(e) => {
                self.state = FlowState::Idle;
                warn!(error = %e, "Login attempt failed");
                self.view.show_error(&e.to_string(), &e.trace());
            }
        }

        self.view.set_submit_enabled(true);
        self.view.set_processing(false);
        result
    }

    async fn attempt(
        &mut self,
        login: &str,
        pin: &str,
    ) -> Result<AuthenticationOutcome, LoginError> {
        if pin.is_empty() {
            return Err(LoginError::EmptyPin);
        }
        let identity = CredentialIdentity::parse(login);

        self.state = FlowState::Requesting;
        debug!(user = %identity.user, realm = ?identity.realm, "Requesting challenge");
        let request = AuthenticationRequest::Challenge(ChallengeRequest {
            user: identity.user.clone(),
            realm: identity.realm.clone(),
            pass: pin.to_string(),
        });
        let response = accept(self.transport.send(&request).await?)?;
        let challenge = challenge_from(response)?;
        let pending = PendingTransaction::open(identity, &challenge);

        self.state = FlowState::Signing;
        debug!(transaction_id = %pending.transaction_id(), "Challenge issued, signing");
        self.view.show_prompt(&challenge.message);
        let signature = self.ceremony.sign(&challenge.sign_request).await?;

        self.state = FlowState::Confirming;
        let response = accept(self.transport.send(&pending.into_answer(signature)).await?)?;

        if response.result.value == Some(true) {
            Ok(AuthenticationOutcome::succeeded(response.detail))
        } else {
            Err(LoginError::AuthenticationRejected(
                response
                    .detail
                    .message
                    .unwrap_or_else(|| REJECTED_MESSAGE.to_string()),
            ))
        }
    }
}

/// Turn a relay reply into an authority response the protocol may proceed on.
fn accept(reply: RelayReply) -> Result<AuthorityResponse, LoginError> {
    let status = reply.status;
    let reason = status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string();
    let parsed = reply
        .body
        .and_then(AuthorityResponse::from_body);

    if status.is_server_error() {
        let message = parsed
            .as_ref()
            .and_then(AuthorityResponse::error_message)
            .map(str::to_string)
            .unwrap_or(reason);
        return Err(LoginError::UpstreamServer { status, message });
    }

    let Some(response) = parsed else {
        if status.is_client_error() {
            return Err(LoginError::UpstreamServer {
                status,
                message: reason,
            });
        }
        return Err(LoginError::InvalidResponse(format!(
            "{status} reply carries no result object"
        )));
    };

    if !response.result.status {
        let message = response
            .error_message()
            .map(str::to_string)
            .unwrap_or(reason);
        return Err(LoginError::AuthenticationRejected(message));
    }

    Ok(response)
}

/// Pull the WebAuthn challenge out of a phase-1 response.
fn challenge_from(response: AuthorityResponse) -> Result<Challenge, LoginError> {
    let detail = response.detail;
    let message = detail.message.unwrap_or_default();

    let Some(attributes) = detail.attributes else {
        let reason = if message.is_empty() {
            NO_CHALLENGE_MESSAGE.to_string()
        } else {
            message
        };
        return Err(LoginError::ChallengeUnavailable(reason));
    };
    let sign_request = attributes
        .sign_request
        .ok_or(LoginError::UnsupportedCredentialType)?;
    let transaction_id = detail.transaction_id.ok_or_else(|| {
        LoginError::InvalidResponse("challenge carries no transaction_id".to_string())
    })?;

    Ok(Challenge {
        message,
        transaction_id,
        sign_request,
    })
}
