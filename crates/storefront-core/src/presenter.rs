//! Presenters
//!
//! View-models for the checkout drawer and the success screen. They hold no
//! markup; the web crate renders them.

use std::sync::Arc;

use serde::Serialize;

use crate::cart::{CartStore, cart_total_cents, total_lead_units};
use crate::model::{CartLine, OrderReceipt};
use crate::money::CurrencyRate;

/// Where purchased lead files are delivered
pub const DOWNLOAD_LINK: &str = "https://drive.google.com/drive/folders/example-leads-folder";

/// One row in the checkout drawer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub item_id: String,
    pub title: String,
    pub lead_count: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Rendered state of the checkout drawer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub lines: Vec<SummaryLine>,

    /// "1 item" / "N items"
    pub item_count: String,

    /// Total leads, e.g. "1500K"
    pub total_leads: String,

    /// Order total in the display currency
    pub total: String,

    /// Order total in USD cents
    pub total_cents: i64,
}

impl CheckoutSummary {
    pub fn from_lines(lines: &[CartLine], currency: &CurrencyRate) -> Self {
        let total_cents = cart_total_cents(lines);
        let leads = total_lead_units(lines) / 1000.0;

        Self {
            lines: lines
                .iter()
                .map(|line| SummaryLine {
                    item_id: line.item_id.clone(),
                    title: line.title.clone(),
                    lead_count: line.lead_count.clone(),
                    quantity: line.quantity,
                    unit_price: currency.display(line.unit_price_cents),
                    line_total: currency.display(line.line_total_cents()),
                })
                .collect(),
            item_count: item_count_label(lines.len()),
            total_leads: format!("{leads}K"),
            total: currency.display(total_cents),
            total_cents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What the drawer hands to the payment form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProceedRequest {
    pub cart_snapshot: Vec<CartLine>,
    pub total_cents: i64,
}

/// Checkout drawer logic over the shared cart
#[derive(Clone, Debug)]
pub struct CheckoutPresenter {
    cart: Arc<CartStore>,
    currency: &'static CurrencyRate,
}

impl CheckoutPresenter {
    pub fn new(cart: Arc<CartStore>, currency: &'static CurrencyRate) -> Self {
        Self { cart, currency }
    }

    /// Switch the display currency
    pub fn set_currency(&mut self, currency: &'static CurrencyRate) {
        self.currency = currency;
    }

    pub const fn currency(&self) -> &'static CurrencyRate {
        self.currency
    }

    /// Current drawer contents
    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::from_lines(&self.cart.snapshot(), self.currency)
    }

    pub fn remove(&self, item_id: &str) {
        self.cart.remove_item(item_id);
    }

    pub fn increase(&self, item_id: &str) {
        if let Some(quantity) = self.cart.quantity_of(item_id) {
            self.cart.set_quantity(item_id, quantity.saturating_add(1));
        }
    }

    /// Decrement, never below one
    pub fn decrease(&self, item_id: &str) {
        if let Some(quantity) = self.cart.quantity_of(item_id) {
            self.cart.set_quantity(item_id, quantity.saturating_sub(1).max(1));
        }
    }

    /// Snapshot for the payment form, or `None` when there is nothing to pay for
    pub fn proceed(&self) -> Option<ProceedRequest> {
        let cart_snapshot = self.cart.snapshot();
        if cart_snapshot.is_empty() {
            return None;
        }

        let total_cents = cart_total_cents(&cart_snapshot);
        tracing::debug!(lines = cart_snapshot.len(), total_cents, "Proceeding to payment");
        Some(ProceedRequest {
            cart_snapshot,
            total_cents,
        })
    }
}

/// One purchased row on the success screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    /// "title (lead leads) xqty"
    pub label: String,
    pub line_total: String,
}

/// Rendered state of the success screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuccessView {
    pub lines: Vec<ReceiptLine>,
    pub total: String,
    pub payment_id: String,
    pub download_link: &'static str,
    pub completed_at: String,
}

impl SuccessView {
    pub fn new(receipt: &OrderReceipt, currency: &CurrencyRate) -> Self {
        Self {
            lines: receipt
                .cart_snapshot
                .iter()
                .map(|line| ReceiptLine {
                    label: format!("{} ({} leads) x{}", line.title, line.lead_count, line.quantity),
                    line_total: currency.display(line.line_total_cents()),
                })
                .collect(),
            total: currency.display(receipt.total_cents),
            payment_id: receipt.provider_payment_id.clone(),
            download_link: DOWNLOAD_LINK,
            completed_at: receipt.completed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

fn item_count_label(count: usize) -> String {
    if count == 1 {
        "1 item".into()
    } else {
        format!("{count} items")
    }
}
