//! Purchase Records
//!
//! One stored row per purchased cart line, keyed by the Stripe transaction
//! id. Rows start unsettled; webhook reconciliation settles them once Stripe
//! reports the charge as captured.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::{Catalog, PurchaseRecord};
use uuid::Uuid;

use crate::error::{PaymentError, Result};

/// A purchase record as stored by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPurchase {
    /// Server-assigned id
    pub id: Uuid,

    /// The record as submitted
    #[serde(flatten)]
    pub record: PurchaseRecord,

    /// When the record was saved
    pub recorded_at: DateTime<Utc>,

    /// Whether Stripe has confirmed the charge
    pub settled: bool,
}

impl StoredPurchase {
    pub fn new(record: PurchaseRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
            recorded_at: Utc::now(),
            settled: false,
        }
    }
}

/// Check a submitted record before storing it
pub fn validate_record(record: &PurchaseRecord) -> Result<()> {
    let invalid = |msg: &str| -> Result<()> { Err(PaymentError::InvalidRequest(msg.into())) };

    if Catalog.get(&record.product_id).is_none() {
        return invalid("unknown productId");
    }
    if record.quantity == 0 {
        return invalid("quantity must be at least 1");
    }
    if record.price <= Decimal::ZERO {
        return invalid("price must be greater than zero");
    }
    if record.transaction_id.trim().is_empty() {
        return invalid("transactionId is required");
    }
    if record.full_name.trim().is_empty() {
        return invalid("fullName is required");
    }
    if !record.email.contains('@') {
        return invalid("email is invalid");
    }
    Ok(())
}

/// Purchase storage trait
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Store a validated record
    async fn save(&self, record: PurchaseRecord) -> Result<StoredPurchase>;

    /// All records for one charge
    async fn by_transaction(&self, transaction_id: &str) -> Result<Vec<StoredPurchase>>;

    /// Settle every record for a charge, returning how many were settled
    async fn mark_settled(&self, transaction_id: &str) -> Result<usize>;
}

/// In-memory purchase store (for development)
#[derive(Debug, Default)]
pub struct MemoryPurchaseStore {
    by_transaction: RwLock<HashMap<String, Vec<StoredPurchase>>>,
}

impl MemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> PaymentError {
    PaymentError::Storage("purchase store lock poisoned".into())
}

#[async_trait]
impl PurchaseStore for MemoryPurchaseStore {
    async fn save(&self, record: PurchaseRecord) -> Result<StoredPurchase> {
        validate_record(&record)?;

        let stored = StoredPurchase::new(record);
        let mut rows = self.by_transaction.write().map_err(poisoned)?;
        rows.entry(stored.record.transaction_id.clone())
            .or_default()
            .push(stored.clone());

        Ok(stored)
    }

    async fn by_transaction(&self, transaction_id: &str) -> Result<Vec<StoredPurchase>> {
        let rows = self.by_transaction.read().map_err(poisoned)?;
        Ok(rows.get(transaction_id).cloned().unwrap_or_default())
    }

    async fn mark_settled(&self, transaction_id: &str) -> Result<usize> {
        let mut rows = self.by_transaction.write().map_err(poisoned)?;
        let Some(purchases) = rows.get_mut(transaction_id) else {
            return Ok(0);
        };

        let mut settled = 0;
        for purchase in purchases.iter_mut().filter(|p| !p.settled) {
            purchase.settled = true;
            settled += 1;
        }
        Ok(settled)
    }
}
