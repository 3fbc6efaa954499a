//! HTTP surface: router construction and server bootstrap.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, patch, post},
    Router,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::auth::{AuthConfig, AuthService};
use crate::cache::RedisCache;
use crate::email::LogNotifier;
use crate::store::PgStore;
use crate::token::TokenService;

pub mod error;
pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Everything the server action needs to boot.
#[derive(Debug)]
pub struct ServerArgs {
    pub port: u16,
    pub dsn: String,
    pub redis_url: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub base_url: String,
}

/// Build the application router around a fully wired auth service.
///
/// Kept separate from [`new`] so tests can drive the exact same routes with
/// in-memory collaborators.
#[must_use]
pub fn router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi::serve))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/reset-password", post(handlers::auth::request_reset))
        .route(
            "/auth/reset-password/:ticket",
            post(handlers::auth::consume_reset),
        )
        .route(
            "/auth/permissions/:user_id",
            patch(handlers::auth::update_permissions),
        )
        .layer(Extension(service))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(args: ServerArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .acquire_timeout(Duration::from_secs(5))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let cache = RedisCache::connect(&args.redis_url)
        .await
        .context("Failed to connect to session cache")?;

    let tokens = TokenService::new(
        Arc::new(cache),
        &args.token_secret,
        Duration::from_secs(args.token_ttl_seconds),
    );

    let service = Arc::new(AuthService::new(
        Arc::new(PgStore::new(pool)),
        tokens,
        Arc::new(LogNotifier),
        AuthConfig::new(args.base_url),
    ));

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_origin(Any);

    let app = router(service).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{}", args.port)).await?;

    info!("Listening on [::]:{}", args.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or("none", MatchedPath::as_str);

    info_span!(
        "http.request",
        method = %request.method(),
        path = matched_path,
        request_id = request_id,
    )
}
