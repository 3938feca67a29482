//! authgate API server - credential issuance over HTTP
//!
//! Provides REST endpoints for:
//! - Account registration (`POST /register`)
//! - Login and access token issuance (`POST /login`)
//! - A bearer-protected route (`GET /protected`)
//! - Health reporting (`GET /health`)
//!
//! ## Architecture
//!
//! All authentication logic lives in `authgate-core`. This binary adds the
//! SQLite credential store, the HTTP surface and the bearer middleware.

use std::sync::Arc;

use anyhow::{bail, Result};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod state;
mod store;

use config::Args;
use state::AppState;

/// Build the application router around shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/protected", get(handlers::protected))
        .route_layer(from_fn_with_state(
            Arc::clone(&state),
            middleware::require_bearer,
        ));

    // CORS configuration for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over the built-in directives
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_directives())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.secret_key().is_none() {
        bail!("JWT_SECRET_KEY is not set; refusing to start without a signing secret");
    }

    info!("Initializing authgate API...");
    let state = Arc::new(AppState::new(&args).await?);

    let app = build_router(state);

    let addr = args.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Credential store timeout: {}ms", args.store_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
