/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{HandlesError, HandlesResult},
};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .merge(crate::api::routes(ctx.clone()))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
///
/// Serves until Ctrl-C or SIGTERM, then drains the provider.
pub async fn serve(ctx: AppContext) -> HandlesResult<()> {
    let addr = ctx.config.bind_address();
    let provider = ctx.provider.clone();

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HandlesError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(
        address = %addr,
        provider = provider.name(),
        "Handles server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HandlesError::Internal(format!("Server error: {}", e)))?;

    info!("Shutting down DID provider");
    provider.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{
            LogFormat, LoggingConfig, ProviderConfig, RedirectConfig, ServerConfig, ServiceConfig,
        },
        identity::{Did, DidProvider, Domain, Handle, MemoryProvider, ProviderHealth},
        template::UrlTemplate,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                host: "localhost".to_string(),
                port: 8080,
                check_domain_parameter: "domain".to_string(),
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Text,
            },
            redirect: RedirectConfig {
                did_template: UrlTemplate::new("https://example.com/profile/{did}"),
                handle_template: UrlTemplate::new("https://example.com/register?handle={handle}"),
            },
            provider: ProviderConfig::Memory {
                dids: vec![],
                domains: vec![],
            },
        }
    }

    fn create_test_app() -> (Router, Arc<MemoryProvider>) {
        let provider = Arc::new(MemoryProvider::new(
            [
                ("alice.example.com".to_string(), Did::new("did:plc:example001")),
                ("bob.example.com".to_string(), Did::new("did:plc:example002")),
            ],
            ["example.com".to_string()],
        ));
        let ctx = AppContext::with_provider(
            create_test_config(),
            provider.clone() as Arc<dyn DidProvider>,
        );

        (build_router(ctx), provider)
    }

    async fn send(app: Router, host: &str, uri: &str) -> (StatusCode, String, Option<String>) {
        let request = Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, String::from_utf8(body.to_vec()).unwrap(), location)
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_healthy() {
        let (app, _) = create_test_app();

        let (status, body, _) = send(app, "localhost", "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Available with 2 handles for 1 domains");
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_unhealthy() {
        let (app, provider) = create_test_app();
        provider.set_healthy(false);

        let (status, body, _) = send(app, "localhost", "/healthz").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Not healthy");
    }

    #[tokio::test]
    async fn test_domain_endpoint() {
        let (app, _) = create_test_app();
        let (status, _, _) = send(app, "localhost", "/domainz?domain=Example.com").await;
        assert_eq!(status, StatusCode::OK);

        let (app, _) = create_test_app();
        let (status, body, _) = send(app, "localhost", "/domainz?domain=unprovided.test").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            "Decentralized IDs are not provided for unprovided.test by this server."
        );
    }

    #[tokio::test]
    async fn test_did_endpoint_returns_did() {
        let (app, _) = create_test_app();

        let (status, body, _) =
            send(app, "alice.example.com", "/.well-known/atproto-did").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "did:plc:example001");
    }

    #[tokio::test]
    async fn test_did_endpoint_ignores_port() {
        let (app, _) = create_test_app();

        let (status, body, _) =
            send(app, "Bob.Example.com:8080", "/.well-known/atproto-did").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "did:plc:example002");
    }

    #[tokio::test]
    async fn test_did_endpoint_unknown_handle() {
        let (app, _) = create_test_app();

        let (status, body, _) =
            send(app, "unknown.example.com", "/.well-known/atproto-did").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Decentralized ID not found for unknown.example.com");
    }

    #[tokio::test]
    async fn test_did_endpoint_unknown_domain() {
        let (app, _) = create_test_app();

        let (status, _, _) =
            send(app, "username.unprovided.test", "/.well-known/atproto-did").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_host_is_rejected() {
        let (app, _) = create_test_app();

        let (status, _, _) = send(app, "localhost", "/.well-known/atproto-did").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_known_handle_redirects_to_profile() {
        let (app, _) = create_test_app();

        let (status, _, location) = send(app, "alice.example.com", "/").await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location.as_deref(),
            Some("https://example.com/profile/did:plc:example001")
        );
    }

    #[tokio::test]
    async fn test_unknown_handle_redirects_to_fallback() {
        let (app, _) = create_test_app();

        let (status, _, location) = send(app, "carol.example.com", "/some/page").await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location.as_deref(),
            Some("https://example.com/register?handle=carol.example.com")
        );
    }

    struct UnreachableProvider;

    #[async_trait::async_trait]
    impl DidProvider for UnreachableProvider {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn can_resolve(&self, _domain: &Domain) -> HandlesResult<bool> {
            Err(HandlesError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn resolve(&self, _handle: &Handle) -> HandlesResult<Did> {
            Err(HandlesError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn health_check(&self) -> ProviderHealth {
            ProviderHealth::unhealthy("pool timed out")
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_a_server_error() {
        let ctx = AppContext::with_provider(create_test_config(), Arc::new(UnreachableProvider));

        let (status, body, location) =
            send(build_router(ctx.clone()), "alice.example.com", "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(location.is_none());
        assert!(!body.contains("pool timed out"));

        let (status, _, _) =
            send(build_router(ctx), "localhost", "/domainz?domain=example.com").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unknown_domain_does_not_redirect() {
        let (app, _) = create_test_app();

        let (status, _, location) = send(app, "alice.example.org", "/").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(location.is_none());
    }
}
