//! UI Components

use leptos::prelude::*;
use storefront_core::{
    BillingDetails, CardInput, CatalogItem, CheckoutError, CheckoutSummary, SuccessView,
    money::currencies,
};

use crate::app::Shop;

/// One package in the grid
#[component]
pub fn PackageCard(shop: Shop, item: &'static CatalogItem) -> impl IntoView {
    let in_cart = move || shop.lines.with(|lines| lines.iter().any(|l| l.item_id == item.id));
    let price = move || shop.currency.get().display(item.unit_price_cents);

    let add = move |_: leptos::ev::MouseEvent| {
        shop.cart.with_value(|cart| cart.add_catalog_item(item));
        shop.drawer_open.set(true);
    };

    view! {
        <div class=format!("package package-{}", item.category)>
            <h3>{item.name.clone()}</h3>
            <p class="leads">{format!("{} leads", item.lead_count)}</p>
            <p class="description">{item.description.clone()}</p>
            <div class="price">{price}</div>
            <button class="btn btn-primary" on:click=add disabled=in_cart>
                {move || if in_cart() { "In cart" } else { "Add to cart" }}
            </button>
        </div>
    }
}

/// Display currency picker
#[component]
pub fn CurrencySelector(shop: Shop) -> impl IntoView {
    let change = move |ev: leptos::ev::Event| {
        let code = event_target_value(&ev);
        if let Some(currency) = storefront_core::CurrencyRate::find(&code) {
            shop.currency.set(currency);
        }
    };

    view! {
        <select class="currency" on:change=change prop:value=move || shop.currency.get().code.clone()>
            {currencies()
                .iter()
                .map(|c| view! { <option value=c.code.clone()>{format!("{} {}", c.symbol, c.code)}</option> })
                .collect_view()}
        </select>
    }
}

/// Slide-out cart with quantity controls
#[component]
pub fn CartDrawer(shop: Shop) -> impl IntoView {
    let summary = move || {
        shop.lines.track();
        shop.currency.track();
        shop.presenter().summary()
    };

    let proceed = move |_: leptos::ev::MouseEvent| {
        if shop.presenter().proceed().is_some() {
            shop.drawer_open.set(false);
            shop.payment_open.set(true);
        }
    };

    view! {
        <Show when=move || shop.drawer_open.get()>
            <aside class="drawer">
                <header>
                    <h2>"Your cart"</h2>
                    <span class="count">{move || summary().item_count}</span>
                    <button class="close" on:click=move |_| shop.drawer_open.set(false)>"×"</button>
                </header>

                <Show
                    when=move || !summary().is_empty()
                    fallback=|| view! { <p class="empty">"Your cart is empty"</p> }
                >
                    <ul class="lines">
                        <For
                            each=move || summary().lines
                            key=|line| (line.item_id.clone(), line.quantity)
                            children=move |line| {
                                let id = line.item_id.clone();
                                let (dec_id, inc_id, rm_id) = (id.clone(), id.clone(), id);
                                view! {
                                    <li class="line">
                                        <div>
                                            <strong>{line.title}</strong>
                                            <span class="leads">{line.lead_count}</span>
                                            <span class="unit">{line.unit_price}</span>
                                        </div>
                                        <div class="qty">
                                            <button on:click=move |_| shop.presenter().decrease(&dec_id)>"−"</button>
                                            <span>{line.quantity}</span>
                                            <button on:click=move |_| shop.presenter().increase(&inc_id)>"+"</button>
                                        </div>
                                        <span class="line-total">{line.line_total}</span>
                                        <button class="remove" on:click=move |_| shop.presenter().remove(&rm_id)>"Remove"</button>
                                    </li>
                                }
                            }
                        />
                    </ul>

                    <footer>
                        <p>"Total leads: " {move || summary().total_leads}</p>
                        <p class="total">"Total: " {move || summary().total}</p>
                        <button class="btn btn-primary" on:click=proceed>"Proceed to payment"</button>
                    </footer>
                </Show>
            </aside>
        </Show>
    }
}

/// Payment form inputs and the last error raised by the form itself
#[derive(Clone, Copy)]
struct PaymentForm {
    name: RwSignal<String>,
    email: RwSignal<String>,
    number: RwSignal<String>,
    expiry: RwSignal<String>,
    cvc: RwSignal<String>,
    error: RwSignal<Option<String>>,
}

impl PaymentForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            number: RwSignal::new(String::new()),
            expiry: RwSignal::new(String::new()),
            cvc: RwSignal::new(String::new()),
            error: RwSignal::new(None),
        }
    }

    /// Drop the message left over from the previous opening; inputs stay
    fn reopen(&self) {
        self.error.set(None);
    }
}

/// Card payment form
#[component]
pub fn PaymentModal(shop: Shop) -> impl IntoView {
    let form = PaymentForm::new();
    let PaymentForm { name, email, number, expiry, cvc, error } = form;

    Effect::new(move |_| {
        if shop.payment_open.get() {
            form.reopen();
        }
    });

    let processing = move || shop.attempt.get().is_processing();
    let failure = move || {
        error
            .get()
            .or_else(|| shop.attempt.get().failure_reason().map(ToString::to_string))
    };
    let summary = move || CheckoutSummary::from_lines(&shop.lines.get(), shop.currency.get());

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let Some(flow) = shop.flow.get_value() else {
            error.set(Some("Payments are not available right now.".into()));
            return;
        };
        let Some((exp_month, exp_year)) = parse_expiry(&expiry.get_untracked()) else {
            error.set(Some("Enter the card expiry as MM/YY.".into()));
            return;
        };

        let billing = BillingDetails::new(name.get_untracked(), email.get_untracked());
        let card = CardInput::new(number.get_untracked(), exp_month, exp_year, cvc.get_untracked());

        leptos::task::spawn_local(async move {
            match flow.submit(billing, card).await {
                Ok(receipt) => {
                    flow.close();
                    shop.payment_open.set(false);
                    shop.receipt.set(Some(receipt));
                }
                Err(CheckoutError::Abandoned) => {}
                Err(e) => error.set(Some(e.user_message())),
            }
        });
    };

    let field = move |label: &'static str, placeholder: &'static str, value: RwSignal<String>| {
        view! {
            <div class="field">
                <label>{label}</label>
                <input
                    placeholder=placeholder
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                    disabled=processing
                />
            </div>
        }
    };

    view! {
        <Show when=move || shop.payment_open.get()>
            <div class="modal-backdrop">
                <form class="modal payment" on:submit=submit>
                    <header>
                        <h2>"Payment"</h2>
                        <button type="button" class="close" on:click=move |_| shop.close_payment()>"×"</button>
                    </header>

                    <p class="total">"Order total: " {move || summary().total}</p>

                    {field("Full Name", "John Doe", name)}
                    {field("Email", "john@example.com", email)}
                    {field("Card Number", "4242 4242 4242 4242", number)}
                    <div class="row">
                        {field("Expiry", "MM/YY", expiry)}
                        {field("CVC", "123", cvc)}
                    </div>

                    {move || failure().map(|msg| view! { <p class="error">{msg}</p> })}

                    <Show when=move || shop.attempt.with(|a| a.provider_payment_id().is_some())>
                        <p class="success">"Payment successful!"</p>
                    </Show>

                    <button type="submit" class="btn btn-primary" disabled=processing>
                        {move || if processing() { "Processing..." } else { "Pay now" }}
                    </button>
                </form>
            </div>
        </Show>
    }
}

/// Receipt and download link after a purchase
#[component]
pub fn SuccessModal(shop: Shop) -> impl IntoView {
    let view_model = move || {
        shop.receipt
            .get()
            .map(|receipt| SuccessView::new(&receipt, shop.currency.get()))
    };

    move || {
        view_model().map(|success| {
            view! {
                <div class="modal-backdrop">
                    <div class="modal success">
                        <h2>"🎉 Purchase complete"</h2>
                        <ul>
                            {success
                                .lines
                                .into_iter()
                                .map(|line| view! { <li>{line.label}" · "{line.line_total}</li> })
                                .collect_view()}
                        </ul>
                        <p class="total">"Total paid: " {success.total}</p>
                        <p class="payment-id">"Payment ID: " {success.payment_id}</p>
                        <p class="date">{success.completed_at}</p>
                        <a class="btn btn-primary" href=success.download_link target="_blank" rel="noopener">
                            "Download your leads"
                        </a>
                        <button class="btn" on:click=move |_| shop.receipt.set(None)>"Close"</button>
                    </div>
                </div>
            }
        })
    }
}

/// "MM/YY" or "MM/YYYY" into month and four-digit year
fn parse_expiry(input: &str) -> Option<(u8, u16)> {
    let (month, year) = input.trim().split_once('/')?;
    let month: u8 = month.trim().parse().ok().filter(|m| (1..=12).contains(m))?;
    let year = year.trim();
    let year: u16 = match year.len() {
        2 => 2000 + year.parse::<u16>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };
    Some((month, year))
}
