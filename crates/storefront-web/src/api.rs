//! Gateway Wiring
//!
//! Builds the payment flow from compile-time configuration and bridges the
//! core's `watch` channels into Leptos signals.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use leptos::prelude::*;
use storefront_core::{CartStore, PaymentFlow, Timer};
use storefront_runtime::{HttpBackend, RuntimeConfig, StripeConfirmer};
use tokio::sync::watch;

/// `Timer` backed by `setTimeout`
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}

/// The browser's payment flow
pub type WebFlow = PaymentFlow<HttpBackend, StripeConfirmer, GlooTimer>;

/// Gateway configuration baked in at build time
pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig::from_parts(
        option_env!("STOREFRONT_BACKEND_URL"),
        option_env!("STRIPE_PUBLISHABLE_KEY"),
    )
}

/// Build the payment flow, or `None` when no publishable key was configured
pub fn build_flow(cart: Arc<CartStore>) -> Option<Rc<WebFlow>> {
    let config = runtime_config();
    let Some(provider) = StripeConfirmer::from_config(&config) else {
        leptos::logging::warn!("STRIPE_PUBLISHABLE_KEY was not set at build time; payments disabled");
        return None;
    };

    let backend = HttpBackend::from_config(&config);
    Some(Rc::new(PaymentFlow::with_defaults(backend, provider, GlooTimer, cart)))
}

/// Mirror a `watch` channel into a signal until the sender is dropped
pub fn bridge<T>(mut rx: watch::Receiver<T>, set: WriteSignal<T>)
where
    T: Clone + Send + Sync + 'static,
{
    set.set(rx.borrow_and_update().clone());
    leptos::task::spawn_local(async move {
        while rx.changed().await.is_ok() {
            set.set(rx.borrow_and_update().clone());
        }
    });
}
