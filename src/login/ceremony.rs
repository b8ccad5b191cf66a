// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract of the signature ceremony adapter.
//!
//! The adapter wraps whatever talks to the authenticator (a browser's
//! `navigator.credentials`, a platform API, a soft token). The login flow
//! only relies on the two operations below.

use std::future::Future;

use crate::models::{SignRequest, SignatureResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CeremonyError {
    #[error("the user cancelled the signature ceremony: {0}")]
    Cancelled(String),

    #[error("no registered credential matches the sign request")]
    NoMatchingCredential,

    #[error("authenticator error: {0}")]
    Authenticator(String),
}

/// Produces a device-backed signature over an authority-issued challenge.
pub trait SignatureCeremony {
    /// Whether the ceremony can run in this context at all.
    ///
    /// `false` stands for an insecure context or a platform without
    /// WebAuthn support.
    fn is_available(&self) -> bool;

    /// Run the ceremony for one sign request. Resolves once the user has
    /// interacted with the authenticator.
    fn sign(
        &self,
        request: &SignRequest,
    ) -> impl Future<Output = Result<SignatureResponse, CeremonyError>> + Send;
}
