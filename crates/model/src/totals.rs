//! Pricing engine.
//!
//! Derived amounts are recomputed from the current draft on every call.
//! No caching, no incremental update: the input is a handful of rows, and
//! recomputation removes staleness bugs outright.

use serde::{Deserialize, Serialize};

use crate::invoice::Invoice;

/// Derived amounts for one draft snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub taxable_base: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl Totals {
    /// Compute totals from a draft snapshot.
    ///
    /// Sign-agnostic: negative quantities or prices flow through the
    /// arithmetic unchallenged. An empty item list yields all zeros.
    pub fn compute(invoice: &Invoice) -> Self {
        let subtotal: f64 = invoice.items.iter().map(|item| item.line_total()).sum();
        let discount_amount = subtotal * invoice.discount / 100.0;
        let taxable_base = subtotal - discount_amount;
        let tax_amount = taxable_base * invoice.tax_rate / 100.0;
        let total = taxable_base + tax_amount;
        Self {
            subtotal,
            discount_amount,
            taxable_base,
            tax_amount,
            total,
        }
    }
}
