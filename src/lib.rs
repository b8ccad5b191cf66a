// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! WebAuthn Relay - Challenge-Response Login
//!
//! This crate implements a WebAuthn challenge-response login against a
//! privacyIDEA-style identity authority: a thin HTTP relay in front of the
//! authority's `/validate/check`, and the client-side flow that requests a
//! challenge, has it signed, and submits the signed answer.
//!
//! ## Modules
//!
//! - `api` - HTTP routes (Axum)
//! - `upstream` - Forwarding client for the identity authority
//! - `login` - Client-side challenge-response state machine
//! - `models` - Wire types shared by both sides

pub mod api;
pub mod config;
pub mod error;
pub mod login;
pub mod models;
pub mod state;
pub mod upstream;
