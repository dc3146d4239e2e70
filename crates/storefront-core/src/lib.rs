//! # storefront-core
//!
//! Catalog, cart store and payment flow for the lead-package storefront.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ Catalog  │──▶│ CartStore │──▶│ CheckoutPresenter │──▶│ PaymentFlow  │──▶│  SuccessView   │
//! └──────────┘   └───────────┘   └───────────────────┘   └──────┬───────┘   └────────────────┘
//!                                                               │
//!                                          ┌────────────────────┼───────────────────┐
//!                                          ▼                    ▼                   ▼
//!                                   PaymentBackend       PaymentProvider          Timer
//!                                     (Strategy)           (Strategy)
//! ```
//!
//! The gateway traits let the same flow run against the HTTP backend and
//! Stripe in the browser, or against fakes in tests.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod model;
pub mod money;
pub mod presenter;

pub use cart::CartStore;
pub use catalog::{Catalog, CatalogItem, Category};
pub use error::{CheckoutError, Result};
pub use flow::{FlowConfig, PaymentFlow};
pub use gateway::{
    ClientSecret, Confirmation, IntentRequest, IntentResponse, NoDelay, PaymentBackend,
    PaymentProvider, PurchaseRecord, Timer,
};
pub use model::{BillingDetails, CardInput, CartLine, OrderReceipt, PaymentAttempt, PaymentStatus};
pub use money::{CurrencyRate, display_price};
pub use presenter::{CheckoutPresenter, CheckoutSummary, SuccessView};
