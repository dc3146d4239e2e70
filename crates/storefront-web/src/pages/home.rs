//! Home Page

use leptos::prelude::*;
use storefront_core::Catalog;

use crate::app::Shop;
use crate::components::{CartDrawer, CurrencySelector, PackageCard, PaymentModal, SuccessModal};

#[component]
pub fn HomePage(shop: Shop) -> impl IntoView {
    let cart_count = move || shop.lines.with(Vec::len);

    view! {
        <div class="home">
            <nav class="topbar">
                <span class="brand">"LeadVault"</span>
                <CurrencySelector shop=shop />
                <button class="cart-button" on:click=move |_| shop.drawer_open.update(|open| *open = !*open)>
                    "🛒 " {cart_count}
                </button>
            </nav>

            <header class="hero">
                <h1>"Verified U.S. B2B & B2C Leads"</h1>
                <p class="tagline">"Segmented lead packages, delivered instantly after checkout"</p>
            </header>

            <section class="packages">
                {Catalog
                    .grid()
                    .map(|item| view! { <PackageCard shop=shop item=item /> })
                    .collect_view()}
            </section>

            {Catalog.full_access().map(|item| view! {
                <section class="full-access">
                    <PackageCard shop=shop item=item />
                </section>
            })}

            <CartDrawer shop=shop />
            <PaymentModal shop=shop />
            <SuccessModal shop=shop />
        </div>
    }
}
