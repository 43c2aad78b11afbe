/// Handle resolution middleware
///
/// Runs in two steps ahead of the verify and redirect handlers: the request
/// hostname is parsed into a `Handle`, then the provider resolves it into a
/// `Resolution`. Both are stored in the request extensions.
use crate::{
    context::AppContext,
    error::HandlesError,
    identity::{hostname_from_authority, Handle, Resolution},
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Read the host of a request, preferring the `Host` header
pub fn request_host(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host())
}

/// Parse the request hostname into a handle and add it to extensions
pub async fn parse_handle(mut req: Request, next: Next) -> Result<Response, HandlesError> {
    let host = request_host(&req).unwrap_or_default();

    let handle = Handle::parse(hostname_from_authority(host)).map_err(|e| {
        debug!(host = %host, "rejected_unparsable_hostname");
        e
    })?;

    req.extensions_mut().insert(handle);

    Ok(next.run(req).await)
}

/// Resolve the parsed handle and add the outcome to extensions
///
/// An unknown handle on a served domain is not an error here; the terminal
/// handler decides how to answer it.
pub async fn resolve_handle(
    State(ctx): State<AppContext>,
    mut req: Request,
    next: Next,
) -> Result<Response, HandlesError> {
    let handle = req
        .extensions()
        .get::<Handle>()
        .cloned()
        .ok_or_else(|| HandlesError::Internal("Handle missing from request".to_string()))?;

    let resolution = match ctx.provider.resolve(&handle).await {
        Ok(did) => {
            debug!(handle = %handle, did = %did, "resolved_handle");
            Resolution::Resolved(did)
        }
        Err(HandlesError::DidNotFound(_)) => {
            debug!(handle = %handle, "handle_not_found");
            Resolution::Unresolved
        }
        Err(e @ HandlesError::DomainNotServed(_)) => {
            debug!(handle = %handle, domain = %handle.domain, "domain_not_served");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    req.extensions_mut().insert(resolution);

    Ok(next.run(req).await)
}
