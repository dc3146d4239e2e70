//! Payment Flow
//!
//! Drives one payment attempt through `idle → submitting → succeeded | failed`:
//!
//! 1. Validate billing input and the cart (no network on failure)
//! 2. Ask the backend for a payment-intent client secret
//! 3. Confirm the card with the provider using that secret
//! 4. Record every cart line with the backend, concurrently, ignoring failures
//! 5. Mark the attempt succeeded, wait out the success animation, clear the
//!    cart and hand back an [`OrderReceipt`]
//!
//! Every attempt carries a generation stamp. [`PaymentFlow::close`] bumps
//! the generation, so a response that lands after the form was closed is
//! dropped instead of applied. Once an attempt has succeeded, `close` has no
//! effect until the cart has been cleared.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;

use crate::cart::{CartStore, cart_total_cents};
use crate::error::{CheckoutError, Result};
use crate::gateway::{Confirmation, PaymentBackend, PaymentProvider, PurchaseRecord, Timer};
use crate::model::{BillingDetails, CardInput, CartLine, OrderReceipt, PaymentAttempt, PaymentStatus};

/// Payment flow configuration
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Pause between success and hand-off, for the success animation
    pub display_delay: Duration,

    /// Method label sent with each purchase record
    pub payment_method: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            display_delay: Duration::from_millis(1200),
            payment_method: "card".into(),
        }
    }
}

/// The checkout state machine
pub struct PaymentFlow<B, P, T> {
    backend: B,
    provider: P,
    timer: T,
    cart: Arc<CartStore>,
    config: FlowConfig,
    attempt: watch::Sender<PaymentAttempt>,
    generation: AtomicU64,
    finalizing: AtomicBool,
}

/// Clears the finalizing flag when hand-off ends, even if `submit` is dropped
struct Finalizing<'a>(&'a AtomicBool);

impl Drop for Finalizing<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<B, P, T> PaymentFlow<B, P, T>
where
    B: PaymentBackend,
    P: PaymentProvider,
    T: Timer,
{
    /// Create a flow bound to the application's cart
    pub fn new(backend: B, provider: P, timer: T, cart: Arc<CartStore>, config: FlowConfig) -> Self {
        Self {
            backend,
            provider,
            timer,
            cart,
            config,
            attempt: watch::Sender::new(PaymentAttempt::idle()),
            generation: AtomicU64::new(0),
            finalizing: AtomicBool::new(false),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(backend: B, provider: P, timer: T, cart: Arc<CartStore>) -> Self {
        Self::new(backend, provider, timer, cart, FlowConfig::default())
    }

    /// The cart this flow charges for
    pub const fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    /// Copy of the current attempt
    pub fn attempt(&self) -> PaymentAttempt {
        self.attempt.borrow().clone()
    }

    /// Current status
    pub fn status(&self) -> PaymentStatus {
        self.attempt.borrow().status.clone()
    }

    /// Whether a submission is in flight
    pub fn is_processing(&self) -> bool {
        self.attempt.borrow().is_processing()
    }

    /// Receive the attempt after every transition
    pub fn subscribe(&self) -> watch::Receiver<PaymentAttempt> {
        self.attempt.subscribe()
    }

    /// Discard the current attempt, e.g. when the payment form closes.
    ///
    /// Any request still outstanding for it will be ignored when it resolves.
    /// A succeeded attempt that has not yet cleared the cart is left alone.
    pub fn close(&self) {
        self.attempt.send_if_modified(|attempt| {
            if self.finalizing.load(Ordering::SeqCst) {
                return false;
            }
            self.generation.fetch_add(1, Ordering::SeqCst);
            *attempt = PaymentAttempt::idle();
            true
        });
    }

    /// Submit the payment form
    pub async fn submit(&self, billing: BillingDetails, card: CardInput) -> Result<OrderReceipt> {
        validate_billing(&billing)?;

        let snapshot = self.cart.snapshot();
        let total_cents = cart_total_cents(&snapshot);
        validate_cart(&snapshot, total_cents)?;

        let stamp = self.begin(billing.clone(), snapshot.clone(), total_cents)?;
        tracing::info!(
            total_cents,
            lines = snapshot.len(),
            "Submitting payment"
        );

        let secret = match self.backend.create_payment_intent(total_cents).await {
            Ok(secret) => secret,
            Err(e) => return Err(self.fail(stamp, CheckoutError::Initialization(e.to_string()))),
        };
        self.ensure_current(stamp)?;

        let confirmation = match self.provider.confirm_card_payment(&secret, &card, &billing).await {
            Ok(confirmation) => confirmation,
            Err(CheckoutError::Confirmation(message)) => {
                return Err(self.fail(stamp, CheckoutError::Confirmation(message)));
            }
            Err(e) => return Err(self.fail(stamp, CheckoutError::Confirmation(e.to_string()))),
        };
        self.ensure_current(stamp)?;

        let provider_payment_id = match confirmation {
            Confirmation::Succeeded { provider_payment_id } => provider_payment_id,
            Confirmation::Declined { message } => {
                return Err(self.fail(stamp, CheckoutError::Confirmation(message)));
            }
        };

        let unrecorded = self.record_purchases(&snapshot, &provider_payment_id, &billing).await;

        let committed = self.commit(stamp, |attempt| {
            self.finalizing.store(true, Ordering::SeqCst);
            attempt.status = PaymentStatus::Succeeded {
                provider_payment_id: provider_payment_id.clone(),
            };
        });
        if !committed {
            tracing::warn!(payment_id = %provider_payment_id, "Payment form closed before completion");
            return Err(CheckoutError::Abandoned);
        }

        tracing::info!(
            payment_id = %provider_payment_id,
            total_cents,
            unrecorded,
            "Payment succeeded"
        );

        let _finalizing = Finalizing(&self.finalizing);
        let receipt = OrderReceipt::new(snapshot, total_cents, provider_payment_id);

        self.timer.sleep(self.config.display_delay).await;
        self.cart.clear();

        Ok(receipt)
    }

    /// Move into `submitting`, returning the attempt's generation stamp
    fn begin(&self, billing: BillingDetails, snapshot: Vec<CartLine>, total_cents: i64) -> Result<u64> {
        let mut outcome = Err(CheckoutError::InProgress);

        self.attempt.send_if_modified(|attempt| match attempt.status {
            PaymentStatus::Submitting => false,
            PaymentStatus::Succeeded { .. } => {
                outcome = Err(CheckoutError::AlreadyCompleted);
                false
            }
            PaymentStatus::Idle | PaymentStatus::Failed { .. } => {
                let stamp = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                *attempt = PaymentAttempt::submitting(billing, snapshot, total_cents);
                outcome = Ok(stamp);
                true
            }
        });

        outcome
    }

    /// Apply `update` only if the attempt is still the current one
    fn commit(&self, stamp: u64, update: impl FnOnce(&mut PaymentAttempt)) -> bool {
        self.attempt.send_if_modified(|attempt| {
            if self.generation.load(Ordering::SeqCst) != stamp {
                return false;
            }
            update(attempt);
            true
        })
    }

    fn ensure_current(&self, stamp: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) == stamp {
            Ok(())
        } else {
            Err(CheckoutError::Abandoned)
        }
    }

    /// Record the failure on the attempt and return the error to surface
    fn fail(&self, stamp: u64, error: CheckoutError) -> CheckoutError {
        let reason = error.user_message();
        let committed = self.commit(stamp, |attempt| {
            attempt.status = PaymentStatus::Failed { reason };
        });

        if committed {
            tracing::warn!(error = %error, "Payment failed");
            error
        } else {
            CheckoutError::Abandoned
        }
    }

    /// Fire one record call per line and wait for all of them.
    ///
    /// Returns how many records were not saved. Failures are only logged:
    /// the charge has already been captured.
    async fn record_purchases(&self, lines: &[CartLine], payment_id: &str, billing: &BillingDetails) -> usize {
        let records: Vec<PurchaseRecord> = lines
            .iter()
            .map(|line| PurchaseRecord::for_line(line, payment_id, billing, &self.config.payment_method))
            .collect();

        let results = join_all(records.iter().map(|r| self.backend.record_purchase(r))).await;

        let mut unrecorded = 0;
        for (record, result) in records.iter().zip(results) {
            if let Err(e) = result {
                unrecorded += 1;
                let error = CheckoutError::Recording(e.to_string());
                tracing::warn!(
                    product_id = %record.product_id,
                    transaction_id = %record.transaction_id,
                    error = %error,
                    "Purchase record not saved"
                );
            }
        }
        unrecorded
    }
}

/// Presence checks on the billing form
pub fn validate_billing(billing: &BillingDetails) -> Result<()> {
    if billing.name.trim().is_empty() {
        return Err(CheckoutError::Validation("Full name is required.".into()));
    }

    let email = billing.email.trim();
    if email.is_empty() {
        return Err(CheckoutError::Validation("Email is required.".into()));
    }

    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        });
    if !well_formed {
        return Err(CheckoutError::Validation("Enter a valid email address.".into()));
    }

    Ok(())
}

fn validate_cart(lines: &[CartLine], total_cents: i64) -> Result<()> {
    if lines.is_empty() {
        return Err(CheckoutError::Validation("Your cart is empty.".into()));
    }
    if total_cents <= 0 {
        return Err(CheckoutError::Validation("Order total must be greater than zero.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::gateway::{ClientSecret, NoDelay};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeBackend {
        fail_intent: bool,
        fail_records: bool,
        gate: Option<Arc<Notify>>,
        intent_calls: AtomicUsize,
        recorded: Mutex<Vec<PurchaseRecord>>,
    }

    impl PaymentBackend for FakeBackend {
        async fn create_payment_intent(&self, total_cents: i64) -> Result<ClientSecret> {
            self.intent_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_intent {
                return Err(CheckoutError::Http("connection refused".into()));
            }
            Ok(ClientSecret::new(format!("pi_{total_cents}_secret_test")))
        }

        async fn record_purchase(&self, record: &PurchaseRecord) -> Result<()> {
            self.recorded.lock().unwrap().push(record.clone());
            if self.fail_records {
                return Err(CheckoutError::Http("HTTP 500".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeProvider {
        declines_remaining: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn declining(times: usize) -> Self {
            Self {
                declines_remaining: AtomicUsize::new(times),
                ..Default::default()
            }
        }
    }

    impl PaymentProvider for FakeProvider {
        async fn confirm_card_payment(
            &self,
            secret: &ClientSecret,
            _card: &CardInput,
            _billing: &BillingDetails,
        ) -> Result<Confirmation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let declined = self
                .declines_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if declined {
                return Ok(Confirmation::Declined {
                    message: "Your card was declined.".into(),
                });
            }
            Ok(Confirmation::Succeeded {
                provider_payment_id: secret.intent_id().to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingTimer {
        requested: Mutex<Vec<Duration>>,
    }

    impl Timer for RecordingTimer {
        async fn sleep(&self, duration: Duration) {
            self.requested.lock().unwrap().push(duration);
        }
    }

    #[derive(Default)]
    struct GatedTimer {
        gate: Notify,
    }

    impl Timer for GatedTimer {
        async fn sleep(&self, _duration: Duration) {
            self.gate.notified().await;
        }
    }

    fn coaches_cart() -> Arc<CartStore> {
        let cart = Arc::new(CartStore::new());
        cart.add_catalog_item(Catalog.get("coaches").unwrap());
        cart
    }

    fn flow_with(
        backend: FakeBackend,
        provider: FakeProvider,
    ) -> PaymentFlow<FakeBackend, FakeProvider, NoDelay> {
        PaymentFlow::with_defaults(backend, provider, NoDelay, coaches_cart())
    }

    fn billing() -> BillingDetails {
        BillingDetails::new("John Doe", "john@example.com")
    }

    fn card() -> CardInput {
        CardInput::new("4242424242424242", 12, 2030, "123")
    }

    #[tokio::test]
    async fn test_successful_payment_produces_receipt_and_clears_cart() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::default());
        let pre_clear_total = flow.cart().total_cents();

        let receipt = flow.submit(billing(), card()).await.unwrap();

        assert_eq!(receipt.total_cents, pre_clear_total);
        assert_eq!(receipt.total_cents, 3900);
        assert_eq!(receipt.provider_payment_id, "pi_3900");
        assert_eq!(receipt.cart_snapshot.len(), 1);
        assert_eq!(
            flow.status(),
            PaymentStatus::Succeeded {
                provider_payment_id: "pi_3900".into()
            }
        );
        assert!(flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_one_record_per_line() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::default());
        flow.cart().add_catalog_item(Catalog.get("legal").unwrap());
        flow.cart().set_quantity("legal", 2);

        flow.submit(billing(), card()).await.unwrap();

        let recorded = flow.backend.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert!(recorded.iter().all(|r| r.transaction_id == "pi_15700"));
        assert!(recorded.iter().all(|r| r.method == "card" && r.full_name == "John Doe"));
        let legal = recorded.iter().find(|r| r.product_id == "legal").unwrap();
        assert_eq!(legal.quantity, 2);
    }

    #[tokio::test]
    async fn test_record_failures_do_not_block_success() {
        let backend = FakeBackend {
            fail_records: true,
            ..Default::default()
        };
        let flow = flow_with(backend, FakeProvider::default());

        let receipt = flow.submit(billing(), card()).await.unwrap();

        assert_eq!(receipt.provider_payment_id, "pi_3900");
        assert!(matches!(flow.status(), PaymentStatus::Succeeded { .. }));
        assert!(flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_intent_failure_skips_confirmation() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend {
            fail_intent: true,
            gate: Some(gate.clone()),
            ..Default::default()
        };
        let flow = flow_with(backend, FakeProvider::default());

        let (result, seen_while_pending) = tokio::join!(flow.submit(billing(), card()), async {
            tokio::task::yield_now().await;
            let status = flow.status();
            gate.notify_one();
            status
        });

        assert_eq!(seen_while_pending, PaymentStatus::Submitting);
        assert!(matches!(result, Err(CheckoutError::Initialization(_))));
        assert_eq!(flow.provider.calls.load(Ordering::SeqCst), 0);

        let attempt = flow.attempt();
        assert!(!attempt.failure_reason().unwrap().is_empty());
        assert_eq!(flow.cart().len(), 1);
        assert_eq!(flow.cart().total_cents(), 3900);
    }

    #[tokio::test]
    async fn test_decline_keeps_cart_and_allows_retry() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::declining(1));

        let err = flow.submit(billing(), card()).await.unwrap_err();
        assert_eq!(err.user_message(), "Your card was declined.");
        assert_eq!(flow.attempt().failure_reason(), Some("Your card was declined."));
        assert_eq!(flow.cart().len(), 1);
        assert!(flow.backend.recorded.lock().unwrap().is_empty());

        // failed → submitting → succeeded
        let receipt = flow.submit(billing(), card()).await.unwrap();
        assert_eq!(receipt.total_cents, 3900);
        assert_eq!(flow.provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(flow.backend.intent_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::default());

        let err = flow
            .submit(BillingDetails::new("  ", "john@example.com"), card())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));

        let err = flow
            .submit(BillingDetails::new("John", "not-an-email"), card())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));

        flow.cart().clear();
        let err = flow.submit(billing(), card()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));

        assert_eq!(flow.backend.intent_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.status(), PaymentStatus::Idle);
    }

    #[tokio::test]
    async fn test_resubmission_while_submitting_is_rejected() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend {
            gate: Some(gate.clone()),
            ..Default::default()
        };
        let flow = flow_with(backend, FakeProvider::default());

        let (first, second) = tokio::join!(flow.submit(billing(), card()), async {
            tokio::task::yield_now().await;
            let second = flow.submit(billing(), card()).await;
            gate.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(CheckoutError::InProgress)));
        assert_eq!(flow.backend.intent_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closing_discards_late_response() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend {
            gate: Some(gate.clone()),
            ..Default::default()
        };
        let flow = flow_with(backend, FakeProvider::default());

        let (result, ()) = tokio::join!(flow.submit(billing(), card()), async {
            tokio::task::yield_now().await;
            flow.close();
            gate.notify_one();
        });

        assert!(matches!(result, Err(CheckoutError::Abandoned)));
        assert_eq!(flow.provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.status(), PaymentStatus::Idle);
        assert_eq!(flow.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_attempt_must_be_closed() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::default());
        flow.submit(billing(), card()).await.unwrap();

        flow.cart().add_catalog_item(Catalog.get("legal").unwrap());
        let err = flow.submit(billing(), card()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadyCompleted));

        flow.close();
        let receipt = flow.submit(billing(), card()).await.unwrap();
        assert_eq!(receipt.total_cents, 5900);
    }

    #[tokio::test]
    async fn test_display_delay_is_requested() {
        let config = FlowConfig {
            display_delay: Duration::from_millis(250),
            ..Default::default()
        };
        let flow = PaymentFlow::new(
            FakeBackend::default(),
            FakeProvider::default(),
            RecordingTimer::default(),
            coaches_cart(),
            config,
        );

        flow.submit(billing(), card()).await.unwrap();

        assert_eq!(
            *flow.timer.requested.lock().unwrap(),
            vec![Duration::from_millis(250)]
        );
    }

    #[tokio::test]
    async fn test_cart_cleared_only_after_display_delay() {
        let flow = PaymentFlow::with_defaults(
            FakeBackend::default(),
            FakeProvider::default(),
            GatedTimer::default(),
            coaches_cart(),
        );
        let mut rx = flow.subscribe();

        let (result, during_delay) = tokio::join!(flow.submit(billing(), card()), async {
            let _ = rx.wait_for(|a| a.provider_payment_id().is_some()).await;
            let len = flow.cart().len();
            flow.timer.gate.notify_one();
            len
        });

        assert_eq!(during_delay, 1);
        assert_eq!(result.unwrap().provider_payment_id, "pi_3900");
        assert!(flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_close_during_display_delay_cannot_recharge() {
        let flow = PaymentFlow::with_defaults(
            FakeBackend::default(),
            FakeProvider::default(),
            GatedTimer::default(),
            coaches_cart(),
        );
        let mut rx = flow.subscribe();

        let (first, (second, status_after_close)) = tokio::join!(flow.submit(billing(), card()), async {
            let _ = rx.wait_for(|a| a.provider_payment_id().is_some()).await;
            flow.close();
            let status = flow.status();
            let second = flow.submit(billing(), card()).await;
            flow.timer.gate.notify_one();
            (second, status)
        });

        assert!(matches!(status_after_close, PaymentStatus::Succeeded { .. }));
        assert!(matches!(second, Err(CheckoutError::AlreadyCompleted)));
        assert_eq!(first.unwrap().total_cents, 3900);
        assert_eq!(flow.backend.intent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.provider.calls.load(Ordering::SeqCst), 1);
        assert!(flow.cart().is_empty());

        // Hand-off finished: closing works again
        flow.close();
        assert_eq!(flow.status(), PaymentStatus::Idle);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let flow = flow_with(FakeBackend::default(), FakeProvider::declining(1));
        let mut rx = flow.subscribe();

        let _ = flow.submit(billing(), card()).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status.as_str(), "failed");
    }

    #[test]
    fn test_email_presence_check() {
        assert!(validate_billing(&BillingDetails::new("A", "a@b.co")).is_ok());
        assert!(validate_billing(&BillingDetails::new("A", "@b.co")).is_err());
        assert!(validate_billing(&BillingDetails::new("A", "a@")).is_err());
        assert!(validate_billing(&BillingDetails::new("A", "a b@c.d")).is_err());
        assert!(validate_billing(&BillingDetails::new("A", "a@b@c")).is_err());
    }
}
