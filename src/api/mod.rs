/// API routes and handlers
pub mod health;
pub mod middleware;
pub mod redirect;
pub mod well_known;

use crate::context::AppContext;
use axum::Router;

/// Build the routes that answer for the request's handle
///
/// The verify route and the redirect fallback both sit behind hostname
/// parsing and handle resolution.
pub fn resolution_routes(ctx: AppContext) -> Router<AppContext> {
    Router::new()
        .merge(well_known::routes())
        .fallback(redirect::redirect_unmatched_route)
        .layer(axum::middleware::from_fn_with_state(
            ctx,
            middleware::resolve_handle,
        ))
        .layer(axum::middleware::from_fn(middleware::parse_handle))
}

/// Build API routes
pub fn routes(ctx: AppContext) -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(resolution_routes(ctx))
}
