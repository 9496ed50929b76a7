//! Invoice draft data model.
//!
//! Everything here is a plain value: drafts are edited through the reducer
//! in [`crate::edit`], which always returns a new `Invoice` rather than
//! mutating in place.

use chrono::NaiveDate;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a line item within a draft.
///
/// Opaque, used only to address edits and removals; it carries no
/// persisted significance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    /// Create a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for LineItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

/// The party being billed. Ephemeral per draft; no stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub email: Option<String>,
    /// RUT or other fiscal identifier.
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// One billable row of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    /// A fresh item with default field values (quantity 1, price 0).
    pub fn empty() -> Self {
        Self {
            id: LineItemId::new(),
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
        }
    }

    /// Always recomputed from the current fields, never stored.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Display currency for the draft. A label only; no conversion happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Clp,
    Usd,
    Eur,
}

impl Currency {
    /// ISO 4217 code, as entered/displayed in the form.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Clp => "CLP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Symbol prefixed to amounts in the preview.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Clp => "$",
            Currency::Usd => "US$",
            Currency::Eur => "€",
        }
    }

    /// Parse a currency code; `None` for anything unknown.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CLP" => Some(Currency::Clp),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            _ => None,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// The complete draft being edited.
///
/// Item order is insertion order and doubles as display/print order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub client: Client,
    pub items: Vec<LineItem>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub currency: Currency,
    /// Free text, newlines preserved verbatim.
    pub notes: Option<String>,
    /// Percentage, default 19 (IVA).
    pub tax_rate: f64,
    /// Global discount percentage, default 0.
    pub discount: f64,
}

impl Invoice {
    /// A new draft, pre-populated with one empty line item.
    pub fn draft(issue_date: NaiveDate) -> Self {
        Self {
            client: Client::default(),
            items: vec![LineItem::empty()],
            issue_date,
            due_date: None,
            currency: Currency::Clp,
            notes: None,
            tax_rate: 19.0,
            discount: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_starts_with_one_empty_item() {
        let invoice = Invoice::draft(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].description, "");
        assert_eq!(invoice.items[0].quantity, 1.0);
        assert_eq!(invoice.items[0].unit_price, 0.0);
        assert_eq!(invoice.currency, Currency::Clp);
        assert_eq!(invoice.tax_rate, 19.0);
        assert_eq!(invoice.discount, 0.0);
    }

    #[test]
    fn line_total_tracks_current_fields() {
        let mut item = LineItem::empty();
        item.quantity = 3.0;
        item.unit_price = 1500.0;
        assert_eq!(item.line_total(), 4500.0);
        item.unit_price = 0.0;
        assert_eq!(item.line_total(), 0.0);
    }

    #[test]
    fn currency_symbols_match_display_contract() {
        assert_eq!(Currency::Clp.symbol(), "$");
        assert_eq!(Currency::Usd.symbol(), "US$");
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::from_code("EUR"), Some(Currency::Eur));
        assert_eq!(Currency::from_code("GBP"), None);
    }
}
