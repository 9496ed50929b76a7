//! Edit reducer: `(Invoice, Edit) -> Invoice`.
//!
//! Every field change coming from the form is expressed as an [`Edit`] and
//! applied through [`apply`], which returns a new draft value. None of the
//! operations fail: numeric text that does not parse degrades to `0`,
//! edits addressing an unknown item id are no-ops, and unparseable dates
//! or currency codes leave the field unchanged. Strict validation, if any,
//! belongs to a collaborator at the submission boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::invoice::{Currency, Invoice, LineItem, LineItemId};

/// Client fields addressable by the form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    Name,
    Email,
    TaxId,
    Address,
}

/// Line-item fields addressable by the form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

/// Invoice-level fields addressable by the form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaField {
    IssueDate,
    DueDate,
    Currency,
    Notes,
    TaxRate,
    Discount,
}

/// One user edit, as routed by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    Client(ClientField, String),
    Item(LineItemId, ItemField, String),
    AddItem,
    RemoveItem(LineItemId),
    Meta(MetaField, String),
}

/// Coerce raw textual input to a number.
///
/// Empty, non-numeric, and NaN inputs all become `0.0`; this mirrors the
/// form contract where a half-typed field must never poison the draft.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Apply one edit, producing a new draft.
pub fn apply(invoice: &Invoice, edit: &Edit) -> Invoice {
    let mut next = invoice.clone();
    match edit {
        Edit::Client(field, value) => apply_client(&mut next, *field, value),
        Edit::Item(id, field, value) => apply_item(&mut next, *id, *field, value),
        Edit::AddItem => next.items.push(LineItem::empty()),
        Edit::RemoveItem(id) => next.items.retain(|item| item.id != *id),
        Edit::Meta(field, value) => apply_meta(&mut next, *field, value),
    }
    next
}

fn apply_client(invoice: &mut Invoice, field: ClientField, value: &str) {
    let client = &mut invoice.client;
    match field {
        ClientField::Name => client.name = value.to_string(),
        ClientField::Email => client.email = optional(value),
        ClientField::TaxId => client.tax_id = optional(value),
        ClientField::Address => client.address = optional(value),
    }
}

fn apply_item(invoice: &mut Invoice, id: LineItemId, field: ItemField, value: &str) {
    // Unknown id: no-op, the draft stays as it was.
    let Some(item) = invoice.items.iter_mut().find(|item| item.id == id) else {
        return;
    };
    match field {
        ItemField::Description => item.description = value.to_string(),
        ItemField::Quantity => item.quantity = coerce_number(value),
        ItemField::UnitPrice => item.unit_price = coerce_number(value),
    }
}

fn apply_meta(invoice: &mut Invoice, field: MetaField, value: &str) {
    match field {
        MetaField::IssueDate => {
            if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                invoice.issue_date = date;
            }
        }
        MetaField::DueDate => {
            // Empty input clears the optional field; unparseable non-empty
            // input leaves it unchanged, as for the issue date.
            if value.is_empty() {
                invoice.due_date = None;
            } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                invoice.due_date = Some(date);
            }
        }
        MetaField::Currency => {
            if let Some(currency) = Currency::from_code(value) {
                invoice.currency = currency;
            }
        }
        MetaField::Notes => invoice.notes = optional(value),
        MetaField::TaxRate => invoice.tax_rate = coerce_number(value),
        MetaField::Discount => invoice.discount = coerce_number(value),
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> Invoice {
        Invoice::draft(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn client_edits_replace_only_the_named_field() {
        let a = draft();
        let b = apply(&a, &Edit::Client(ClientField::Name, "ACME Ltda.".into()));
        let c = apply(&b, &Edit::Client(ClientField::TaxId, "76.543.210-K".into()));
        assert_eq!(c.client.name, "ACME Ltda.");
        assert_eq!(c.client.tax_id.as_deref(), Some("76.543.210-K"));
        assert_eq!(c.client.email, None);
        // The originals were not touched.
        assert_eq!(a.client.name, "");
        assert_eq!(b.client.tax_id, None);
    }

    #[test]
    fn numeric_coercion_falls_back_to_zero() {
        assert_eq!(coerce_number("12.5"), 12.5);
        assert_eq!(coerce_number("  7 "), 7.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("-3"), -3.0);
    }

    #[test]
    fn item_quantity_with_garbage_input_becomes_zero_not_stale() {
        let a = draft();
        let id = a.items[0].id;
        let b = apply(&a, &Edit::Item(id, ItemField::Quantity, "4".into()));
        assert_eq!(b.items[0].quantity, 4.0);
        let c = apply(&b, &Edit::Item(id, ItemField::Quantity, "4x".into()));
        assert_eq!(c.items[0].quantity, 0.0);
    }

    #[test]
    fn editing_unknown_item_id_is_a_noop() {
        let a = draft();
        let b = apply(
            &a,
            &Edit::Item(LineItemId::new(), ItemField::UnitPrice, "999".into()),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn add_item_appends_with_defaults() {
        let a = draft();
        let b = apply(&a, &Edit::AddItem);
        assert_eq!(b.items.len(), 2);
        assert_eq!(b.items[1].quantity, 1.0);
        assert_eq!(b.items[1].unit_price, 0.0);
        assert_ne!(b.items[0].id, b.items[1].id);
    }

    #[test]
    fn remove_item_removes_exactly_the_match_and_keeps_order() {
        let mut a = draft();
        a.items = vec![LineItem::empty(), LineItem::empty(), LineItem::empty()];
        let ids: Vec<_> = a.items.iter().map(|i| i.id).collect();
        let b = apply(&a, &Edit::RemoveItem(ids[1]));
        assert_eq!(b.items.len(), 2);
        assert_eq!(b.items[0].id, ids[0]);
        assert_eq!(b.items[1].id, ids[2]);
    }

    #[test]
    fn remove_unknown_item_leaves_list_unchanged() {
        let a = draft();
        let b = apply(&a, &Edit::RemoveItem(LineItemId::new()));
        assert_eq!(a.items, b.items);
    }

    #[test]
    fn removing_the_last_item_yields_an_empty_list() {
        let a = draft();
        let id = a.items[0].id;
        let b = apply(&a, &Edit::RemoveItem(id));
        assert!(b.items.is_empty());
    }

    #[test]
    fn meta_edits_route_and_coerce() {
        let a = draft();
        let b = apply(&a, &Edit::Meta(MetaField::Discount, "10".into()));
        let c = apply(&b, &Edit::Meta(MetaField::TaxRate, "bad".into()));
        let d = apply(&c, &Edit::Meta(MetaField::Currency, "USD".into()));
        let e = apply(&d, &Edit::Meta(MetaField::Currency, "XXX".into()));
        let f = apply(&e, &Edit::Meta(MetaField::IssueDate, "2024-07-15".into()));
        assert_eq!(f.discount, 10.0);
        assert_eq!(f.tax_rate, 0.0);
        assert_eq!(f.currency, Currency::Usd);
        assert_eq!(
            f.issue_date,
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
        );
    }

    #[test]
    fn notes_preserve_newlines_verbatim() {
        let a = draft();
        let b = apply(&a, &Edit::Meta(MetaField::Notes, "línea 1\nlínea 2".into()));
        assert_eq!(b.notes.as_deref(), Some("línea 1\nlínea 2"));
    }

    #[test]
    fn due_date_edits_set_clear_and_ignore_garbage() {
        let a = draft();
        let b = apply(&a, &Edit::Meta(MetaField::DueDate, "2024-07-01".into()));
        assert_eq!(b.due_date, NaiveDate::from_ymd_opt(2024, 7, 1));
        // Unparseable non-empty input leaves the field unchanged.
        let c = apply(&b, &Edit::Meta(MetaField::DueDate, "31/07/2024".into()));
        assert_eq!(c.due_date, b.due_date);
        // Empty input clears the optional field.
        let d = apply(&c, &Edit::Meta(MetaField::DueDate, "".into()));
        assert_eq!(d.due_date, None);
    }

    #[test]
    fn unparseable_issue_date_leaves_field_unchanged() {
        let a = draft();
        let b = apply(&a, &Edit::Meta(MetaField::IssueDate, "15/07/2024".into()));
        assert_eq!(a.issue_date, b.issue_date);
    }
}
