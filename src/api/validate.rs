// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `POST /validate/check`: the relay endpoint.
//!
//! Serves both protocol phases. Which phase a body belongs to is the
//! authority's business; this handler only forwards it and relays the answer.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::ORIGIN, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, state::AppState};

/// Forward a challenge request or a signed challenge answer to the authority.
///
/// The authority's status code and JSON body are relayed unmodified. If its
/// reply is missing, truncated or not JSON, the caller gets `502` with the
/// plain-text body `Bad Gateway`.
#[utoipa::path(
    post,
    path = "/validate/check",
    tag = "Validate",
    request_body = crate::models::AuthenticationRequest,
    responses(
        (status = 200, description = "Authority reply, relayed verbatim", body = crate::models::AuthorityResponse),
        (status = 400, description = "Request body is not JSON"),
        (status = 502, description = "Authority reply was missing or incomplete", body = String, content_type = "text/plain")
    )
)]
pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let user = body.get("user").and_then(Value::as_str).unwrap_or_default();
    info!(user = %user, "User is trying to authenticate");

    match state.upstream.forward(&body, headers.get(ORIGIN)).await {
        Ok(reply) => reply.into_response(),
        Err(e) => e.into_response(),
    }
}
