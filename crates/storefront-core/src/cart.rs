//! Cart Store
//!
//! Single source of truth for what the user intends to buy. The store is
//! owned by the application root and handed out as `Arc<CartStore>`;
//! presenters subscribe through a `watch` channel and re-render on change.

use tokio::sync::watch;

use crate::catalog::CatalogItem;
use crate::model::CartLine;

/// In-memory cart with change notification
#[derive(Debug)]
pub struct CartStore {
    lines: watch::Sender<Vec<CartLine>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart
    pub fn new() -> Self {
        Self {
            lines: watch::Sender::new(Vec::new()),
        }
    }

    /// Insert a line unless one with the same id is already present.
    ///
    /// Adding a package twice leaves the cart unchanged; it does not bump
    /// the quantity.
    pub fn add_item(&self, line: CartLine) {
        let item_id = line.item_id.clone();
        let added = self.lines.send_if_modified(|lines| {
            if lines.iter().any(|l| l.item_id == line.item_id) {
                return false;
            }
            lines.push(line);
            true
        });

        if added {
            tracing::debug!(item_id = %item_id, "Added cart line");
        }
    }

    /// Add a catalog package with quantity one
    pub fn add_catalog_item(&self, item: &CatalogItem) {
        self.add_item(CartLine::from_item(item));
    }

    /// Delete the line with this id, if any
    pub fn remove_item(&self, item_id: &str) {
        let removed = self.lines.send_if_modified(|lines| {
            let before = lines.len();
            lines.retain(|l| l.item_id != item_id);
            lines.len() != before
        });

        if removed {
            tracing::debug!(item_id = %item_id, "Removed cart line");
        }
    }

    /// Replace the quantity of a line.
    ///
    /// Callers clamp to at least one; the store stores what it is given.
    pub fn set_quantity(&self, item_id: &str, quantity: u32) {
        self.lines.send_if_modified(|lines| {
            match lines.iter_mut().find(|l| l.item_id == item_id) {
                Some(line) if line.quantity != quantity => {
                    line.quantity = quantity;
                    true
                }
                _ => false,
            }
        });
    }

    /// Empty the cart
    pub fn clear(&self) {
        self.lines.send_if_modified(|lines| {
            let had_lines = !lines.is_empty();
            lines.clear();
            had_lines
        });
    }

    /// Copy of the current lines
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.borrow().clone()
    }

    /// Current quantity for a line
    pub fn quantity_of(&self, item_id: &str) -> Option<u32> {
        self.lines
            .borrow()
            .iter()
            .find(|l| l.item_id == item_id)
            .map(|l| l.quantity)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Σ unit price × quantity, in cents
    pub fn total_cents(&self) -> i64 {
        cart_total_cents(&self.lines.borrow())
    }

    /// Σ parsed lead count × 1000 × quantity
    pub fn total_lead_units(&self) -> f64 {
        total_lead_units(&self.lines.borrow())
    }

    /// Receive a fresh snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.lines.subscribe()
    }
}

/// Σ unit price × quantity over a set of lines
pub fn cart_total_cents(lines: &[CartLine]) -> i64 {
    lines.iter().map(CartLine::line_total_cents).sum()
}

/// Σ parsed lead count × 1000 × quantity over a set of lines
pub fn total_lead_units(lines: &[CartLine]) -> f64 {
    lines
        .iter()
        .map(|l| parse_lead_count(&l.lead_count) * 1000.0 * f64::from(l.quantity))
        .sum()
}

/// Numeric value of a lead label such as "500K" (→ 500).
///
/// Removes the first `K`/`k`, then reads the longest numeric prefix after
/// leading whitespace. Anything unparseable, including approximate labels
/// like "~500K", counts as zero.
pub fn parse_lead_count(label: &str) -> f64 {
    let mut cleaned = label.to_owned();
    if let Some(idx) = cleaned.find(['K', 'k']) {
        cleaned.remove(idx);
    }

    let rest = cleaned.trim_start();

    rest.get(..numeric_prefix_len(rest))
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if seen_digit { end } else { 0 }
}
