//! Stripe Payment Intents
//!
//! Server half of the embedded card flow: the storefront asks for an intent
//! for the cart total, and the browser confirms it with the returned client
//! secret.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use stripe::{Client, CreatePaymentIntent, Currency, PaymentIntent};

use crate::error::{PaymentError, Result};

/// A freshly created payment intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedIntent {
    /// Stripe intent id (`pi_...`)
    pub id: String,

    /// Secret the browser confirms with
    pub client_secret: String,

    /// Charged amount in USD cents
    pub amount_cents: i64,
}

/// Creates payment intents
#[async_trait]
pub trait IntentIssuer: Send + Sync {
    /// Create a USD card intent for `amount_cents`
    async fn create_payment_intent(&self, amount_cents: i64) -> Result<IssuedIntent>;
}

/// Convert a major-unit total into cents, rejecting non-positive amounts
pub fn amount_to_cents(total_price: Decimal) -> Result<i64> {
    let cents = (total_price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| PaymentError::InvalidRequest("totalPrice is out of range".into()))?;

    if cents <= 0 {
        return Err(PaymentError::InvalidRequest(
            "totalPrice must be greater than zero".into(),
        ));
    }
    Ok(cents)
}

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }
}

#[async_trait]
impl IntentIssuer for StripeClient {
    async fn create_payment_intent(&self, amount_cents: i64) -> Result<IssuedIntent> {
        if amount_cents <= 0 {
            return Err(PaymentError::InvalidRequest(
                "amount must be greater than zero".into(),
            ));
        }

        let mut params = CreatePaymentIntent::new(amount_cents, Currency::USD);
        params.payment_method_types = Some(vec!["card".to_string()]);
        params.description = Some("Lead package purchase");

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Stripe("No client secret returned".into()))?;

        tracing::info!(
            intent_id = %intent.id,
            amount_cents,
            "Created payment intent"
        );

        Ok(IssuedIntent {
            id: intent.id.to_string(),
            client_secret,
            amount_cents,
        })
    }
}
