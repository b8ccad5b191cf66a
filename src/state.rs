// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::upstream::UpstreamClient;

/// Shared, immutable handler state. Requests never mutate it.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }
}
