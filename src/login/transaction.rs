// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Binds the challenge answer to the challenge it answers.

use crate::models::{
    AuthenticationRequest, Challenge, ChallengeAnswer, CredentialIdentity, SignatureResponse,
};

/// An issued challenge awaiting its signed answer.
///
/// Lives for exactly one attempt. [`into_answer`](Self::into_answer) consumes
/// it, so a transaction id can be echoed once and never reused.
#[derive(Debug)]
pub struct PendingTransaction {
    identity: CredentialIdentity,
    transaction_id: String,
}

impl PendingTransaction {
    pub fn open(identity: CredentialIdentity, challenge: &Challenge) -> Self {
        Self {
            identity,
            transaction_id: challenge.transaction_id.clone(),
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// The phase-2 request: same identity, empty PIN, the issued
    /// transaction id and the ceremony's assertion.
    pub fn into_answer(self, signature: SignatureResponse) -> AuthenticationRequest {
        AuthenticationRequest::Answer(ChallengeAnswer {
            user: self.identity.user,
            realm: self.identity.realm,
            pass: String::new(),
            transaction_id: self.transaction_id,
            signature,
        })
    }
}
