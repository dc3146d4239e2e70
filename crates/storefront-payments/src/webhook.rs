//! Stripe Webhook Handling
//!
//! Reconciles captured charges against the purchase records the browser
//! saved. A charge with no records means the post-payment bookkeeping was
//! lost; that case is logged loudly but never rolled back.

use std::sync::Arc;

use stripe::{Event, EventObject, EventType, Webhook};

use crate::error::{PaymentError, Result};
use crate::purchase::PurchaseStore;

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Charge captured - settle its purchase records
    PaymentSucceeded {
        payment_intent_id: String,
        amount_cents: i64,
    },

    /// Charge failed
    PaymentFailed {
        payment_intent_id: String,
        message: Option<String>,
    },

    /// Unhandled event type
    Other { event_type: String },
}

/// What reconciliation did for one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Records for the charge were settled
    Settled { records: usize },

    /// A captured charge has no stored records
    Unrecorded,

    /// Nothing to reconcile
    Ignored,
}

/// Webhook handler
pub struct WebhookHandler<S: PurchaseStore + ?Sized> {
    purchase_store: Arc<S>,
}

impl<S: PurchaseStore + ?Sized> WebhookHandler<S> {
    pub const fn new(purchase_store: Arc<S>) -> Self {
        Self { purchase_store }
    }

    /// Verify webhook signature and parse event
    pub fn parse_event(&self, payload: &str, signature: &str, secret: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, secret)
            .map_err(|e| PaymentError::WebhookSignature(e.to_string()))
    }

    /// Process a verified Stripe event
    pub async fn handle(&self, event: &Event) -> Result<(WebhookEvent, Reconciliation)> {
        tracing::info!(event_type = ?event.type_, "Processing Stripe webhook");

        let parsed = parse_webhook_event(event)?;
        let outcome = self.apply(&parsed).await?;
        Ok((parsed, outcome))
    }

    /// Apply a parsed event to the purchase store
    pub async fn apply(&self, event: &WebhookEvent) -> Result<Reconciliation> {
        match event {
            WebhookEvent::PaymentSucceeded {
                payment_intent_id,
                amount_cents,
            } => {
                let records = self.purchase_store.mark_settled(payment_intent_id).await?;
                if records > 0 {
                    tracing::info!(
                        payment_intent_id = %payment_intent_id,
                        records,
                        "Settled purchase records"
                    );
                    return Ok(Reconciliation::Settled { records });
                }

                let existing = self.purchase_store.by_transaction(payment_intent_id).await?;
                if existing.is_empty() {
                    tracing::warn!(
                        payment_intent_id = %payment_intent_id,
                        amount_cents,
                        "Captured charge has no purchase records"
                    );
                    Ok(Reconciliation::Unrecorded)
                } else {
                    tracing::debug!(payment_intent_id = %payment_intent_id, "Records already settled");
                    Ok(Reconciliation::Settled { records: 0 })
                }
            }

            WebhookEvent::PaymentFailed {
                payment_intent_id,
                message,
            } => {
                tracing::warn!(
                    payment_intent_id = %payment_intent_id,
                    message = ?message,
                    "Payment failed"
                );
                Ok(Reconciliation::Ignored)
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
                Ok(Reconciliation::Ignored)
            }
        }
    }
}

/// Parse Stripe event into our event type
fn parse_webhook_event(event: &Event) -> Result<WebhookEvent> {
    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(intent) = &event.data.object {
                Ok(WebhookEvent::PaymentSucceeded {
                    payment_intent_id: intent.id.to_string(),
                    amount_cents: intent.amount,
                })
            } else {
                Err(PaymentError::WebhookParse("Invalid payment intent data".into()))
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(intent) = &event.data.object {
                Ok(WebhookEvent::PaymentFailed {
                    payment_intent_id: intent.id.to_string(),
                    message: intent
                        .last_payment_error
                        .as_ref()
                        .and_then(|e| e.message.clone()),
                })
            } else {
                Err(PaymentError::WebhookParse("Invalid payment intent data".into()))
            }
        }

        _ => Ok(WebhookEvent::Other {
            event_type: format!("{:?}", event.type_),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::MemoryPurchaseStore;
    use rust_decimal_macros::dec;
    use storefront_core::PurchaseRecord;

    fn handler() -> (WebhookHandler<MemoryPurchaseStore>, Arc<MemoryPurchaseStore>) {
        let store = Arc::new(MemoryPurchaseStore::new());
        (WebhookHandler::new(store.clone()), store)
    }

    async fn seed(store: &MemoryPurchaseStore, transaction_id: &str) {
        store
            .save(PurchaseRecord {
                product_id: "coaches".into(),
                quantity: 1,
                price: dec!(39),
                transaction_id: transaction_id.into(),
                full_name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                method: "card".into(),
            })
            .await
            .unwrap();
    }

    fn succeeded(id: &str) -> WebhookEvent {
        WebhookEvent::PaymentSucceeded {
            payment_intent_id: id.into(),
            amount_cents: 3900,
        }
    }

    #[tokio::test]
    async fn test_success_settles_records() {
        let (handler, store) = handler();
        seed(&store, "pi_1").await;

        let outcome = handler.apply(&succeeded("pi_1")).await.unwrap();
        assert_eq!(outcome, Reconciliation::Settled { records: 1 });
        assert!(store.by_transaction("pi_1").await.unwrap()[0].settled);

        // Stripe retries deliveries
        let outcome = handler.apply(&succeeded("pi_1")).await.unwrap();
        assert_eq!(outcome, Reconciliation::Settled { records: 0 });
    }

    #[tokio::test]
    async fn test_charge_without_records_is_flagged() {
        let (handler, _store) = handler();
        let outcome = handler.apply(&succeeded("pi_lost")).await.unwrap();
        assert_eq!(outcome, Reconciliation::Unrecorded);
    }

    #[tokio::test]
    async fn test_failures_and_other_events_are_ignored() {
        let (handler, store) = handler();
        seed(&store, "pi_2").await;

        let failed = WebhookEvent::PaymentFailed {
            payment_intent_id: "pi_2".into(),
            message: Some("Your card was declined.".into()),
        };
        assert_eq!(handler.apply(&failed).await.unwrap(), Reconciliation::Ignored);
        assert!(!store.by_transaction("pi_2").await.unwrap()[0].settled);

        let other = WebhookEvent::Other {
            event_type: "charge.refunded".into(),
        };
        assert_eq!(handler.apply(&other).await.unwrap(), Reconciliation::Ignored);
    }

    #[test]
    fn test_bad_signature_rejected() {
        let (handler, _store) = handler();
        let err = handler
            .parse_event(r#"{"id":"evt_1"}"#, "t=1,v1=deadbeef", "whsec_test")
            .unwrap_err();
        assert!(matches!(err, PaymentError::WebhookSignature(_)));
    }
}
