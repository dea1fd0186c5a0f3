//! # Food Donation API
//!
//! Donors list surplus food, recipients claim it.
//!
//! The whole service is one layer over a storage adapter:
//! - **Listing store**: donation records behind the [`store::Store`] trait
//!   (Postgres in production, in-memory for dev and tests).
//! - **Claim processor**: [`claims::attempt_claim`], the only code path that
//!   mutates a listing, serialized by an atomic status transition.
//! - **Query surface**: available-and-unexpired listings plus dashboard
//!   counts, recomputed per call.
//!
//! Identity is an opaque collaborator: requests carry a bearer token and we
//! only ever resolve it to a user. No sessions, no issuance.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod claims;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

use routes::{claim_donation, create_donation, donation_stats, health, list_donations, not_found};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/donations", get(list_donations).post(create_donation))
        .route("/donations/stats", get(donation_stats))
        .route("/donations/{id}/claim", post(claim_donation))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
