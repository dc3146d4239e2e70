//! Application State

use std::sync::Arc;

use storefront_payments::{IntentIssuer, MemoryPurchaseStore, PurchaseStore, StripeClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment intent creation (None if Stripe is not configured)
    pub intents: Option<Arc<dyn IntentIssuer>>,

    /// Purchase records saved after each charge
    pub purchases: Arc<dyn PurchaseStore>,

    /// Secret for verifying Stripe webhook signatures
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// Build from a Stripe client, if one could be configured
    pub fn new(stripe: Option<StripeClient>) -> Self {
        let webhook_secret = stripe.as_ref().map(|s| s.webhook_secret().to_string());
        Self {
            intents: stripe.map(|s| Arc::new(s) as Arc<dyn IntentIssuer>),
            purchases: Arc::new(MemoryPurchaseStore::new()),
            webhook_secret,
        }
    }

    pub fn stripe_configured(&self) -> bool {
        self.intents.is_some()
    }
}
