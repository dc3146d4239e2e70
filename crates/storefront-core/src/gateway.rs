//! Payment Gateway Strategy Pattern
//!
//! The payment flow talks to the outside world through two seams:
//!
//! - [`PaymentBackend`]: the storefront's own API (payment intents and
//!   purchase bookkeeping)
//! - [`PaymentProvider`]: the card processor that confirms a charge
//!
//! Both are consumed generically so their futures need not be `Send`; the
//! same flow runs on the browser's single thread and on a tokio runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_runtime::{HttpBackend, StripeConfirmer, TokioTimer};
//!
//! let flow = PaymentFlow::new(backend, provider, TokioTimer, cart, FlowConfig::default());
//! let receipt = flow.submit(billing, card).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BillingDetails, CardInput, CartLine};
use crate::money::cents_to_major;

/// Body of the payment-intent request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntentRequest {
    /// Order total in USD major units
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl IntentRequest {
    pub fn from_cents(total_cents: i64) -> Self {
        Self {
            total_price: cents_to_major(total_cents),
        }
    }
}

/// Body of the payment-intent response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// Provider-issued token scoping one charge
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The payment intent id embedded in the secret (`pi_x_secret_y` → `pi_x`)
    pub fn intent_id(&self) -> &str {
        self.0
            .split_once("_secret_")
            .map_or(self.0.as_str(), |(id, _)| id)
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientSecret({}_secret_***)", self.intent_id())
    }
}

/// Bookkeeping row sent once per cart line after a successful charge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseRecord {
    pub product_id: String,
    pub quantity: u32,

    /// Unit price in USD major units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub transaction_id: String,
    pub full_name: String,
    pub email: String,
    pub method: String,
}

impl PurchaseRecord {
    pub fn for_line(
        line: &CartLine,
        transaction_id: &str,
        billing: &BillingDetails,
        method: &str,
    ) -> Self {
        Self {
            product_id: line.item_id.clone(),
            quantity: line.quantity,
            price: cents_to_major(line.unit_price_cents),
            transaction_id: transaction_id.into(),
            full_name: billing.name.clone(),
            email: billing.email.clone(),
            method: method.into(),
        }
    }
}

/// Outcome of confirming a card payment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Charge captured
    Succeeded { provider_payment_id: String },

    /// Card declined or the provider refused the charge
    Declined { message: String },
}

/// The storefront backend
pub trait PaymentBackend {
    /// Request a client secret for a charge of `total_cents`
    async fn create_payment_intent(&self, total_cents: i64) -> Result<ClientSecret>;

    /// Store one purchased line
    async fn record_purchase(&self, record: &PurchaseRecord) -> Result<()>;
}

/// The card processor
pub trait PaymentProvider {
    /// Confirm the charge scoped by `secret`
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
        billing: &BillingDetails,
    ) -> Result<Confirmation>;
}

/// Source of the success-screen display delay
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Timer that returns immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl Timer for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_intent_request_wire_format() {
        let body = serde_json::to_value(IntentRequest::from_cents(3900)).unwrap();
        assert_eq!(body, serde_json::json!({ "totalPrice": 39.0 }));
    }

    #[test]
    fn test_intent_request_rejects_unknown_fields() {
        let parsed: std::result::Result<IntentRequest, _> =
            serde_json::from_str(r#"{"totalPrice": 39, "coupon": "FREE"}"#);
        assert!(parsed.is_err());

        let parsed: IntentRequest = serde_json::from_str(r#"{"totalPrice": 39.5}"#).unwrap();
        assert_eq!(parsed.total_price, dec!(39.5));
    }

    #[test]
    fn test_client_secret_intent_id() {
        let secret = ClientSecret::new("pi_123_secret_abc");
        assert_eq!(secret.intent_id(), "pi_123");
        assert!(!format!("{secret:?}").contains("abc"));
    }

    #[test]
    fn test_purchase_record_wire_format() {
        let line = CartLine {
            item_id: "coaches".into(),
            title: "Coaches and Consultants".into(),
            unit_price_cents: 3900,
            quantity: 2,
            lead_count: "~500K".into(),
        };
        let billing = BillingDetails::new("Jane Doe", "jane@example.com");
        let record = PurchaseRecord::for_line(&line, "pi_1", &billing, "card");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["productId"], "coaches");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["price"], 39.0);
        assert_eq!(json["transactionId"], "pi_1");
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["method"], "card");
    }
}
