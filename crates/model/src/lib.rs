//! `factura-model` — invoice drafting domain.
//!
//! This crate contains **pure domain** types and computations (no I/O):
//! the invoice data model, the edit reducer, the pricing engine, and the
//! session invoice number.

pub mod edit;
pub mod invoice;
pub mod number;
pub mod totals;

pub use edit::{ClientField, Edit, ItemField, MetaField, apply};
pub use invoice::{Client, Currency, Invoice, LineItem, LineItemId};
pub use number::InvoiceNumber;
pub use totals::Totals;
