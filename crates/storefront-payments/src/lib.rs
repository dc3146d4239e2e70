//! # storefront-payments
//!
//! Server-side payment handling for the lead storefront.
//!
//! ## Embedded card flow
//!
//! ```text
//! ┌──────────┐  totalPrice   ┌──────────────┐  PaymentIntent  ┌──────────┐
//! │ Browser  │──────────────▶│  storefront  │────────────────▶│  Stripe  │
//! │          │◀──────────────│    server    │◀────────────────│          │
//! │          │ clientSecret  └──────────────┘                 │          │
//! │          │────────────── confirm (card, publishable key) ─▶│          │
//! │          │  save-payment ┌──────────────┐   webhook        │          │
//! │          │──────────────▶│ PurchaseStore│◀────────────────│          │
//! └──────────┘               └──────────────┘                 └──────────┘
//! ```
//!
//! Card details never touch the server. The browser saves one purchase
//! record per cart line after confirmation; the `payment_intent.succeeded`
//! webhook settles those records, or flags a captured charge that has none.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_payments::{IntentIssuer, StripeClient};
//!
//! let client = StripeClient::from_env()?;
//! let intent = client.create_payment_intent(3900).await?;
//!
//! // Return intent.client_secret to the browser
//! ```

mod error;
mod intent;
mod purchase;
mod webhook;

pub use error::{PaymentError, Result};
pub use intent::{IntentIssuer, IssuedIntent, StripeClient, amount_to_cents};
pub use purchase::{MemoryPurchaseStore, PurchaseStore, StoredPurchase, validate_record};
pub use webhook::{Reconciliation, WebhookEvent, WebhookHandler};
