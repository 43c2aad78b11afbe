/// Diagnostics endpoints
///
/// - `/healthz`: liveness of the DID provider
/// - `/domainz`: whether a domain is served by this server
///
/// Neither route goes through handle resolution, so probes work whatever
/// host they are sent to.
use crate::{context::AppContext, error::HandlesResult, identity::Domain};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::time::Instant;

/// Build diagnostics routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/healthz", get(check_server_is_healthy))
        .route("/domainz", get(check_server_provides_for_domain))
}

/// Liveness probe
///
/// Returns 200 with the provider's detail when healthy, 500 otherwise.
pub async fn check_server_is_healthy(State(ctx): State<AppContext>) -> (StatusCode, String) {
    let start = Instant::now();
    let health = ctx.provider.health_check().await;

    if health.healthy {
        tracing::debug!(
            provider = ctx.provider.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "health_check_completed"
        );
        (StatusCode::OK, health.detail)
    } else {
        tracing::warn!(
            provider = ctx.provider.name(),
            detail = %health.detail,
            "health_check_failed"
        );
        (StatusCode::INTERNAL_SERVER_ERROR, health.detail)
    }
}

/// Domain coverage probe
pub async fn check_server_provides_for_domain(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlesResult<(StatusCode, String)> {
    let domain = Domain::new(
        params
            .get(&ctx.config.service.check_domain_parameter)
            .map(|d| d.trim().to_lowercase())
            .unwrap_or_default(),
    );

    if ctx.provider.can_resolve(&domain).await? {
        Ok((
            StatusCode::OK,
            format!("Decentralized IDs are provided for {} by this server.", domain),
        ))
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            format!("Decentralized IDs are not provided for {} by this server.", domain),
        ))
    }
}
