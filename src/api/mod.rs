// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error,
    models::{
        AuthenticationRequest, AuthorityDetail, AuthorityError, AuthorityResponse,
        AuthorityResult, ChallengeAnswer, ChallengeAttributes, ChallengeRequest,
        SignatureResponse,
    },
    state::AppState,
};

pub mod health;
pub mod validate;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let routes = Router::new()
        .route("/validate/check", post(validate::check))
        .route("/validate/check/", post(validate::check))
        .route("/health", get(health::health))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(error::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(validate::check, health::health),
    components(
        schemas(
            AuthenticationRequest,
            ChallengeRequest,
            ChallengeAnswer,
            SignatureResponse,
            AuthorityResponse,
            AuthorityResult,
            AuthorityError,
            AuthorityDetail,
            ChallengeAttributes,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Validate", description = "Challenge-response relay to the identity authority"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
