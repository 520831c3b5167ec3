//! HTTP surface for the reaction operation
//!
//! One logical inbound operation: react to a record. Listing, creation, and
//! content generation live elsewhere; this service only counts reactions
//! and enforces moderation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::model::validate_reaction_name;
use crate::reaction::{ReactionOutcome, ReactionService};
use crate::types::ReactionError;

/// Shared handler state
pub type SharedService = Arc<ReactionService>;

/// Create the reaction router
pub fn create_router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/messages/:id/reactions/:reaction", post(react))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind and serve until shutdown
pub async fn run(listen: SocketAddr, service: SharedService) -> anyhow::Result<()> {
    let app = create_router(service);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("HTTP server listening on {}", listen);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    "OK"
}

/// POST /messages/{id}/reactions/{reaction}
async fn react(
    State(service): State<SharedService>,
    Path((id, reaction)): Path<(String, String)>,
) -> Response {
    if let Err(reason) = validate_reaction_name(&reaction) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response();
    }

    match service.process(&id, &reaction).await {
        Ok(ReactionOutcome::Updated(counters)) => (
            StatusCode::OK,
            Json(json!({ "id": id, "counters": counters })),
        )
            .into_response(),
        Ok(ReactionOutcome::Deleted) => (
            StatusCode::OK,
            Json(json!({ "id": id, "deleted": true })),
        )
            .into_response(),
        Err(ReactionError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such record" })),
        )
            .into_response(),
        Err(e) => {
            error!("Reaction update failed for record '{}': {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to update reactions" })),
            )
                .into_response()
        }
    }
}
