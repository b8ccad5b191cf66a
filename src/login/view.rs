// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::models::AuthenticationOutcome;

/// The page surface a [`LoginFlow`](super::LoginFlow) drives.
///
/// Stands in for the login form and its container. Implementations must not
/// block: [`show_prompt`](LoginView::show_prompt) in particular is called
/// right before the signature ceremony starts.
pub trait LoginView {
    /// Enable or disable the submit control.
    fn set_submit_enabled(&mut self, enabled: bool);

    /// Toggle the "processing" indicator on the form.
    fn set_processing(&mut self, processing: bool);

    /// Remove a previously displayed error.
    fn clear_error(&mut self);

    /// Display an error headline with its detail (cause chain).
    fn show_error(&mut self, message: &str, trace: &str);

    /// Tell the user to interact with their authenticator.
    fn show_prompt(&mut self, message: &str);

    /// Replace the form with the success view. Irreversible.
    fn show_success(&mut self, outcome: &AuthenticationOutcome);
}
