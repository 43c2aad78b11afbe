/// Redirect fallback for every unmatched route
use crate::{
    context::AppContext,
    error::{HandlesError, HandlesResult},
    identity::{Handle, Resolution},
    template::RequestContext,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension,
};
use tracing::debug;

/// Redirect to the profile of a resolved handle, or to the fallback
/// destination of an unresolved one
pub async fn redirect_unmatched_route(
    State(ctx): State<AppContext>,
    Extension(handle): Extension<Handle>,
    Extension(resolution): Extension<Resolution>,
    uri: Uri,
    headers: HeaderMap,
) -> HandlesResult<Response> {
    let request = RequestContext::new(&uri, &headers);
    let redirect = &ctx.config.redirect;

    let destination = match resolution.did() {
        Some(did) => redirect.did_template.render(&request, &handle, Some(did)),
        None => redirect.handle_template.render(&request, &handle, None),
    };

    debug!(
        handle = %handle,
        resolved = resolution.is_resolved(),
        destination = %destination,
        "redirecting_unmatched_route"
    );

    let location = HeaderValue::from_str(&destination).map_err(|_| {
        HandlesError::Internal(format!("Redirect destination is not a valid URL: {}", destination))
    })?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
