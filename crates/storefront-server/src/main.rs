//! Lead Storefront HTTP Server
//!
//! Axum-based server providing the payment API the storefront frontend
//! talks to, plus the static catalog and the Stripe webhook.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_payments::StripeClient;

use crate::handlers::{
    create_payment_intent, health_check, list_catalog, list_currencies, list_purchases,
    save_payment, stripe_webhook,
};
use crate::state::AppState;

/// Build the router for a given state
fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());

    Router::new()
        // Health & catalog
        .route("/health", get(health_check))
        .route("/api/catalog", get(list_catalog))
        .route("/api/currencies", get(list_currencies))

        // Payments
        .route("/api/v1/payment/payment-intent", post(create_payment_intent))
        .route("/api/v1/payment/save-payment", post(save_payment))
        .route("/api/v1/payment/purchases/{transaction_id}", get(list_purchases))
        .route("/webhook/stripe", post(stripe_webhook))

        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(static_dir))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize payments
    let stripe = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            Some(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "⚠ Stripe not configured - payments disabled");
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
            None
        }
    };

    let state = AppState::new(stripe);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 storefront server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                              - Health check");
    tracing::info!("  GET  /api/catalog                         - Lead packages");
    tracing::info!("  GET  /api/currencies                      - Display currencies");
    tracing::info!("  POST /api/v1/payment/payment-intent       - Create payment intent");
    tracing::info!("  POST /api/v1/payment/save-payment         - Record a purchase");
    tracing::info!("  GET  /api/v1/payment/purchases/{{id}}       - Purchases for a charge");
    tracing::info!("  POST /webhook/stripe                      - Stripe events");
    tracing::info!("");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
