//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use storefront_core::{Catalog, CatalogItem, CurrencyRate, IntentRequest, IntentResponse, PurchaseRecord, money};
use storefront_payments::{PaymentError, StoredPurchase, WebhookHandler, amount_to_cents};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn payments_disabled() -> ApiError {
    api_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "Payments not configured",
        "PAYMENTS_DISABLED",
    )
}

/// Map a payment error onto a status code and body
fn payment_error(e: &PaymentError) -> ApiError {
    match e {
        PaymentError::InvalidRequest(msg) => {
            api_error(StatusCode::BAD_REQUEST, msg.clone(), "INVALID_REQUEST")
        }
        PaymentError::Config(_) => api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            e.user_message(),
            "PAYMENTS_DISABLED",
        ),
        PaymentError::Stripe(_) => {
            api_error(StatusCode::BAD_GATEWAY, e.user_message(), "STRIPE_ERROR")
        }
        PaymentError::WebhookSignature(_) | PaymentError::WebhookParse(_) => {
            api_error(StatusCode::BAD_REQUEST, e.user_message(), "INVALID_WEBHOOK")
        }
        PaymentError::Storage(_) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.user_message(),
            "STORAGE_ERROR",
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.stripe_configured(),
    })
}

/// Every package, in display order
pub async fn list_catalog() -> Json<Vec<CatalogItem>> {
    Json(Catalog.items().to_vec())
}

/// Supported display currencies
pub async fn list_currencies() -> Json<Vec<CurrencyRate>> {
    Json(money::currencies().to_vec())
}

/// Create a payment intent for the cart total
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<IntentRequest>,
) -> Result<Json<IntentResponse>, ApiError> {
    let amount_cents = amount_to_cents(payload.total_price).map_err(|e| payment_error(&e))?;
    let intents = state.intents.as_ref().ok_or_else(payments_disabled)?;

    let intent = intents
        .create_payment_intent(amount_cents)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, amount_cents, "Payment intent error");
            payment_error(&e)
        })?;

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Store one purchased cart line
pub async fn save_payment(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseRecord>,
) -> Result<(StatusCode, Json<StoredPurchase>), ApiError> {
    let stored = state.purchases.save(payload).await.map_err(|e| {
        tracing::warn!(error = %e, "Purchase record rejected");
        payment_error(&e)
    })?;

    tracing::info!(
        transaction_id = %stored.record.transaction_id,
        product_id = %stored.record.product_id,
        quantity = stored.record.quantity,
        "Saved purchase"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Records for one charge
pub async fn list_purchases(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Vec<StoredPurchase>>, ApiError> {
    let purchases = state
        .purchases
        .by_transaction(&transaction_id)
        .await
        .map_err(|e| payment_error(&e))?;

    if purchases.is_empty() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "No purchases for this transaction",
            "NOT_FOUND",
        ));
    }
    Ok(Json(purchases))
}

/// Stripe webhook handler
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ApiError> {
    let secret = state.webhook_secret.as_deref().ok_or_else(payments_disabled)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "Missing Stripe signature",
                "MISSING_SIGNATURE",
            )
        })?;

    let handler = WebhookHandler::new(state.purchases.clone());

    let event = handler.parse_event(&body, signature, secret).map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature failed");
        api_error(StatusCode::BAD_REQUEST, "Invalid signature", "INVALID_SIGNATURE")
    })?;

    handler.handle(&event).await.map_err(|e| {
        tracing::error!(error = %e, "Webhook processing error");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Webhook processing failed",
            "WEBHOOK_ERROR",
        )
    })?;

    Ok(StatusCode::OK)
}
