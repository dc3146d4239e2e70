//! Stripe Card Confirmation
//!
//! Implementation of `PaymentProvider` that confirms a payment intent with
//! raw card details, the way Stripe's browser library does: a form-encoded
//! `POST /v1/payment_intents/{id}/confirm` authorized by the publishable key
//! and scoped by the client secret.

use serde::Deserialize;
use storefront_core::{
    error::{CheckoutError, Result},
    gateway::{ClientSecret, Confirmation, PaymentProvider},
    model::{BillingDetails, CardInput},
};

use crate::config::RuntimeConfig;

/// Card confirmation against the Stripe REST API
#[derive(Clone)]
pub struct StripeConfirmer {
    client: reqwest::Client,
    publishable_key: String,
    api_base: String,
}

impl StripeConfirmer {
    /// Create a confirmer for `publishable_key` against the live API
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self::with_api_base(publishable_key, crate::config::STRIPE_API_BASE)
    }

    /// Create a confirmer against a custom API root
    pub fn with_api_base(publishable_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            publishable_key: publishable_key.into(),
            api_base: api_base.into(),
        }
    }

    /// Create from configuration, if a publishable key is set
    pub fn from_config(config: &RuntimeConfig) -> Option<Self> {
        config
            .publishable_key
            .as_ref()
            .map(|key| Self::with_api_base(key.clone(), config.stripe_api_base.clone()))
    }

    fn confirm_url(&self, secret: &ClientSecret) -> String {
        format!(
            "{}/payment_intents/{}/confirm",
            self.api_base.trim_end_matches('/'),
            secret.intent_id()
        )
    }
}

impl std::fmt::Debug for StripeConfirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfirmer")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// Form fields for the confirm call
fn confirm_form(secret: &ClientSecret, card: &CardInput, billing: &BillingDetails) -> Vec<(&'static str, String)> {
    vec![
        ("client_secret", secret.as_str().to_string()),
        ("payment_method_data[type]", "card".into()),
        (
            "payment_method_data[card][number]",
            card.number.chars().filter(char::is_ascii_digit).collect(),
        ),
        ("payment_method_data[card][exp_month]", card.exp_month.to_string()),
        ("payment_method_data[card][exp_year]", card.exp_year.to_string()),
        ("payment_method_data[card][cvc]", card.cvc.clone()),
        ("payment_method_data[billing_details][name]", billing.name.trim().to_string()),
        ("payment_method_data[billing_details][email]", billing.email.trim().to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct ConfirmBody {
    id: Option<String>,
    status: Option<String>,
    error: Option<StripeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Map a confirm response onto a confirmation outcome
fn interpret(body: ConfirmBody) -> Result<Confirmation> {
    if let Some(error) = body.error {
        tracing::debug!(code = ?error.code, "Stripe refused confirmation");
        return Ok(Confirmation::Declined {
            message: error.message.unwrap_or_else(|| "Payment failed. Try again.".into()),
        });
    }

    match (body.id, body.status.as_deref()) {
        (Some(id), Some("succeeded")) => Ok(Confirmation::Succeeded {
            provider_payment_id: id,
        }),
        (Some(_), Some(status)) => Ok(Confirmation::Declined {
            message: format!("Payment was not completed (status: {status})."),
        }),
        _ => Err(CheckoutError::Confirmation(
            "Unexpected response from payment provider.".into(),
        )),
    }
}

impl PaymentProvider for StripeConfirmer {
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
        billing: &BillingDetails,
    ) -> Result<Confirmation> {
        let response = self
            .client
            .post(self.confirm_url(secret))
            .bearer_auth(&self.publishable_key)
            .form(&confirm_form(secret, card, billing))
            .send()
            .await
            .map_err(|e| CheckoutError::Http(e.to_string()))?;

        let status = response.status();
        let body: ConfirmBody = response
            .json()
            .await
            .map_err(|e| CheckoutError::Confirmation(format!("Unreadable provider response: {e}")))?;

        tracing::debug!(status = %status, intent_status = ?body.status, "Stripe confirm response");
        interpret(body)
    }
}
