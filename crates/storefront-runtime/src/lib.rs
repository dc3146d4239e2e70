//! # storefront-runtime
//!
//! Concrete gateways for the storefront payment flow.
//!
//! ## Gateways
//!
//! - **HttpBackend**: the storefront's `payment-intent` / `save-payment` API
//! - **StripeConfirmer**: card confirmation over Stripe's REST API
//! - **TokioTimer** (default feature `tokio-timer`): success-screen delay
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_runtime::{HttpBackend, RuntimeConfig, StripeConfirmer, TokioTimer};
//!
//! let config = RuntimeConfig::from_env();
//! let provider = StripeConfirmer::from_config(&config).ok_or("STRIPE_PUBLISHABLE_KEY not set")?;
//! let flow = PaymentFlow::with_defaults(HttpBackend::from_config(&config), provider, TokioTimer, cart);
//! ```

pub mod config;
pub mod http;
pub mod stripe;

#[cfg(feature = "tokio-timer")]
pub mod timer;

pub use config::RuntimeConfig;
pub use http::HttpBackend;
pub use stripe::StripeConfirmer;

#[cfg(feature = "tokio-timer")]
pub use timer::TokioTimer;

// Re-export core types for convenience
pub use storefront_core::{
    CartStore, CheckoutError, FlowConfig, PaymentBackend, PaymentFlow, PaymentProvider, Result,
    Timer,
};
