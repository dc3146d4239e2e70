//! Checkout Records
//!
//! Typed records passed between the cart, the payment flow and the
//! presenters. Attempts and receipts hold copies of cart lines, never
//! references into the live cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// One package pending purchase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id, unique within a cart
    pub item_id: String,

    /// Display title
    pub title: String,

    /// Unit price in USD cents
    pub unit_price_cents: i64,

    /// Quantity (callers keep this at 1 or above)
    pub quantity: u32,

    /// Lead count label (e.g., "500K")
    pub lead_count: String,
}

impl CartLine {
    /// Quantity-one line for a catalog package
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            quantity: 1,
            lead_count: item.lead_count.clone(),
        }
    }

    /// Unit price × quantity
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Billing fields collected by the payment form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
}

impl BillingDetails {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Raw card input handed straight to the payment provider
#[derive(Clone, PartialEq, Eq)]
pub struct CardInput {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

impl CardInput {
    pub fn new(number: impl Into<String>, exp_month: u8, exp_year: u16, cvc: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            exp_month,
            exp_year,
            cvc: cvc.into(),
        }
    }

    /// Last four digits of the card number
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

// Never print the PAN or CVC
impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("last4", &self.last4())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish_non_exhaustive()
    }
}

/// Payment attempt status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Idle,
    Submitting,
    Succeeded { provider_payment_id: String },
    Failed { reason: String },
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single submission of the payment form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// Billing name and email as submitted
    pub billing: BillingDetails,

    /// Copy of the cart at submit time
    pub cart_snapshot: Vec<CartLine>,

    /// Charged amount in USD cents
    pub total_cents: i64,

    /// Where the attempt is in the state machine
    pub status: PaymentStatus,
}

impl PaymentAttempt {
    /// No attempt in progress
    pub const fn idle() -> Self {
        Self {
            billing: BillingDetails {
                name: String::new(),
                email: String::new(),
            },
            cart_snapshot: Vec::new(),
            total_cents: 0,
            status: PaymentStatus::Idle,
        }
    }

    /// A fresh attempt entering `submitting`
    pub fn submitting(billing: BillingDetails, cart_snapshot: Vec<CartLine>, total_cents: i64) -> Self {
        Self {
            billing,
            cart_snapshot,
            total_cents,
            status: PaymentStatus::Submitting,
        }
    }

    /// Whether the processing guard is up
    pub const fn is_processing(&self) -> bool {
        matches!(self.status, PaymentStatus::Submitting)
    }

    /// Reason text, present only when failed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            PaymentStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Provider payment id, present only when succeeded
    pub fn provider_payment_id(&self) -> Option<&str> {
        match &self.status {
            PaymentStatus::Succeeded { provider_payment_id } => Some(provider_payment_id),
            _ => None,
        }
    }
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::idle()
    }
}

/// Record of a completed purchase, shown on the success screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Lines as they were when the charge was made
    pub cart_snapshot: Vec<CartLine>,

    /// Charged amount in USD cents
    pub total_cents: i64,

    /// Provider transaction id
    pub provider_payment_id: String,

    /// When the charge was confirmed
    pub completed_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn new(cart_snapshot: Vec<CartLine>, total_cents: i64, provider_payment_id: impl Into<String>) -> Self {
        Self {
            cart_snapshot,
            total_cents,
            provider_payment_id: provider_payment_id.into(),
            completed_at: Utc::now(),
        }
    }
}
