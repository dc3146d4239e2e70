//! Main App Component

use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::{components::*, path};
use storefront_core::{CartLine, CartStore, CheckoutPresenter, CurrencyRate, OrderReceipt, PaymentAttempt};

use crate::api::{self, WebFlow};
use crate::pages::HomePage;

/// Handles to the application-wide state, cheap to copy into closures
#[derive(Clone, Copy)]
pub struct Shop {
    /// The one cart, owned here and shared with the payment flow
    pub cart: StoredValue<Arc<CartStore>>,

    /// Payment flow (None when payments are not configured)
    pub flow: StoredValue<Option<Rc<WebFlow>>, LocalStorage>,

    /// Live cart lines
    pub lines: ReadSignal<Vec<CartLine>>,

    /// Live payment attempt
    pub attempt: ReadSignal<PaymentAttempt>,

    /// Display currency
    pub currency: RwSignal<&'static CurrencyRate>,

    pub drawer_open: RwSignal<bool>,
    pub payment_open: RwSignal<bool>,

    /// Receipt of the last completed purchase
    pub receipt: RwSignal<Option<OrderReceipt>>,
}

impl Shop {
    fn new() -> Self {
        let cart = Arc::new(CartStore::new());
        let flow = api::build_flow(cart.clone());

        let (lines, set_lines) = signal(Vec::new());
        api::bridge(cart.subscribe(), set_lines);

        let (attempt, set_attempt) = signal(PaymentAttempt::idle());
        if let Some(flow) = &flow {
            api::bridge(flow.subscribe(), set_attempt);
        }

        Self {
            cart: StoredValue::new(cart),
            flow: StoredValue::new_local(flow),
            lines,
            attempt,
            currency: RwSignal::new(CurrencyRate::usd()),
            drawer_open: RwSignal::new(false),
            payment_open: RwSignal::new(false),
            receipt: RwSignal::new(None),
        }
    }

    /// Checkout presenter for the current display currency
    pub fn presenter(&self) -> CheckoutPresenter {
        CheckoutPresenter::new(self.cart.get_value(), self.currency.get_untracked())
    }

    /// Close the payment form, discarding any outstanding attempt
    pub fn close_payment(&self) {
        if let Some(flow) = self.flow.get_value() {
            flow.close();
        }
        self.payment_open.set(false);
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let shop = Shop::new();

    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=move || view! { <HomePage shop=shop /> } />
                </Routes>
            </main>
        </Router>
    }
}
