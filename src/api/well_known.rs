/// Well-known endpoints
/// Handles /.well-known/atproto-did for HTTPS handle verification
use crate::{
    context::AppContext,
    identity::{Handle, Resolution},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};

/// Build well-known routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/.well-known/atproto-did", get(atproto_did))
}

/// /.well-known/atproto-did
///
/// Returns the DID of the request's handle in plain text
pub async fn atproto_did(
    Extension(handle): Extension<Handle>,
    Extension(resolution): Extension<Resolution>,
) -> Response {
    match resolution {
        Resolution::Resolved(did) => (StatusCode::OK, did.0).into_response(),
        Resolution::Unresolved => (
            StatusCode::NOT_FOUND,
            format!("Decentralized ID not found for {}", handle),
        )
            .into_response(),
    }
}
