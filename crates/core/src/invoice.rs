//! Invoice creation payloads.
//!
//! Both the store checkout and the manual invoice form end in the same
//! [`InvoicePayload`]. They differ only in the [`InvoicePolicy`] applied:
//! due-date offset, initial status, terms, and which item rules apply.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::line_item::{
    Catalog, ItemRules, LineItem, LineItemError, RawLineItem, normalize_all, validate_items,
};
use crate::totals::{OrderTotals, TotalsError, calculate};
use crate::types::{ClientId, InvoiceStatus, PaymentTerms};

/// Defaults applied when an invoice is created by a particular flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoicePolicy {
    pub due_in_days: u32,
    pub status: InvoiceStatus,
    pub terms: PaymentTerms,
    pub item_rules: ItemRules,
}

impl InvoicePolicy {
    /// Store checkout: sent immediately, due in a week.
    pub const STORE_CHECKOUT: Self = Self {
        due_in_days: 7,
        status: InvoiceStatus::Sent,
        terms: PaymentTerms::DueOnReceipt,
        item_rules: ItemRules::STORE,
    };

    /// Manual invoice form: starts as a draft on Net 30.
    pub const MANUAL_INVOICE: Self = Self {
        due_in_days: 30,
        status: InvoiceStatus::Draft,
        terms: PaymentTerms::Net30,
        item_rules: ItemRules::MANUAL_INVOICE,
    };

    /// Same policy with a different due-date offset.
    #[must_use]
    pub const fn with_due_in_days(self, due_in_days: u32) -> Self {
        Self {
            due_in_days,
            ..self
        }
    }

    /// Due date for an invoice issued on `issue_date`.
    #[must_use]
    pub fn due_date(&self, issue_date: NaiveDate) -> NaiveDate {
        issue_date
            .checked_add_days(Days::new(u64::from(self.due_in_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Body of the billing API's create-invoice call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePayload {
    pub client_id: ClientId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub terms: PaymentTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl InvoicePayload {
    /// Package `items` under `policy`, computing totals from the items.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError`] if the totals do not fit in a decimal.
    pub fn new(
        policy: &InvoicePolicy,
        client_id: ClientId,
        issue_date: NaiveDate,
        items: Vec<LineItem>,
    ) -> Result<Self, TotalsError> {
        let totals = calculate(&items)?;
        Ok(Self {
            client_id,
            issue_date,
            due_date: policy.due_date(issue_date),
            status: policy.status,
            terms: policy.terms,
            notes: None,
            items,
            totals,
        })
    }

    /// The store checkout order for `cart`, billed to `client_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError`] if the cart's totals do not fit in a decimal.
    pub fn from_cart(
        cart: &Cart,
        client_id: ClientId,
        today: NaiveDate,
        policy: &InvoicePolicy,
    ) -> Result<Self, TotalsError> {
        Self::new(policy, client_id, today, cart.to_line_items())
    }
}

/// The manual invoice form.
///
/// Dates, status and terms are optional; missing ones come from the policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub terms: Option<PaymentTerms>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
}

/// Normalized rows and their totals, for showing a draft as it is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoicePreview {
    pub items: Vec<LineItem>,
    pub totals: OrderTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceDraftError {
    #[error("Please select a client")]
    MissingClient,

    #[error("Due date cannot be before the issue date")]
    DueBeforeIssue,

    #[error("Please ensure all invoice items have a description, quantity, and price")]
    InvalidItems(Vec<LineItemError>),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

impl InvoiceDraft {
    /// Normalize the rows and compute totals without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceDraftError::Totals`] if the totals do not fit in a
    /// decimal.
    pub fn preview(&self, catalog: Option<&Catalog>) -> Result<InvoicePreview, InvoiceDraftError> {
        let items = normalize_all(&self.items, catalog);
        let totals = calculate(&items)?;
        Ok(InvoicePreview { items, totals })
    }

    /// Turn the form into a create-invoice payload.
    ///
    /// Totals are recomputed from the normalized items; anything the form
    /// claimed for them is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceDraftError`] when the client is missing, the dates
    /// are inverted, any row fails `policy.item_rules`, or the totals
    /// overflow.
    pub fn into_payload(
        self,
        catalog: Option<&Catalog>,
        policy: &InvoicePolicy,
        today: NaiveDate,
    ) -> Result<InvoicePayload, InvoiceDraftError> {
        let client_id = self.client_id.trim();
        if client_id.is_empty() {
            return Err(InvoiceDraftError::MissingClient);
        }

        let items = normalize_all(&self.items, catalog);
        validate_items(&items, policy.item_rules).map_err(InvoiceDraftError::InvalidItems)?;

        let issue_date = self.issue_date.unwrap_or(today);
        let mut payload = InvoicePayload::new(policy, ClientId::new(client_id), issue_date, items)?;
        if let Some(due_date) = self.due_date {
            if due_date < issue_date {
                return Err(InvoiceDraftError::DueBeforeIssue);
            }
            payload.due_date = due_date;
        }
        if let Some(status) = self.status {
            payload.status = status;
        }
        if let Some(terms) = self.terms {
            payload.terms = terms;
        }
        payload.notes = self.notes.filter(|n| !n.trim().is_empty());
        Ok(payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::line_item::CatalogProduct;
    use crate::types::ProductId;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn product(id: &str, price: u32, tax: u32) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            tax_rate: Decimal::from(tax),
            is_active: true,
        }
    }

    #[test]
    fn test_policy_due_dates() {
        let today = date("2024-02-25");
        assert_eq!(
            InvoicePolicy::STORE_CHECKOUT.due_date(today),
            date("2024-03-03")
        );
        assert_eq!(
            InvoicePolicy::MANUAL_INVOICE.due_date(today),
            date("2024-03-26")
        );
        assert_eq!(
            InvoicePolicy::MANUAL_INVOICE
                .with_due_in_days(15)
                .due_date(today),
            date("2024-03-11")
        );
    }

    #[test]
    fn test_cart_payload() {
        let mut cart = Cart::new();
        let widget = product("p1", 10, 10);
        cart.add_product(&widget);
        cart.add_product(&widget);
        cart.add_product(&product("p2", 5, 0));

        let payload = InvoicePayload::from_cart(
            &cart,
            ClientId::new("c1"),
            date("2024-05-01"),
            &InvoicePolicy::STORE_CHECKOUT,
        )
        .unwrap();

        assert_eq!(payload.status, InvoiceStatus::Sent);
        assert_eq!(payload.terms, PaymentTerms::DueOnReceipt);
        assert_eq!(payload.due_date, date("2024-05-08"));
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.totals.grand_total, Decimal::from(27));

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body,
            json!({
                "client_id": "c1",
                "issue_date": "2024-05-01",
                "due_date": "2024-05-08",
                "status": "sent",
                "terms": "Due on Receipt",
                "items": [
                    {"product_id": "p1", "description": "Product p1", "quantity": 2, "unit_price": 10.0, "tax_rate": 10.0},
                    {"product_id": "p2", "description": "Product p2", "quantity": 1, "unit_price": 5.0, "tax_rate": 0.0}
                ],
                "subtotal": 25.0,
                "tax_total": 2.0,
                "total": 27.0
            })
        );
    }

    #[test]
    fn test_draft_defaults_from_policy() {
        let draft: InvoiceDraft = serde_json::from_value(json!({
            "client_id": "c1",
            "items": [{"description": "Consulting", "quantity": "2", "unit_price": "150", "tax_rate": "10"}]
        }))
        .unwrap();

        let payload = draft
            .into_payload(None, &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01"))
            .unwrap();

        assert_eq!(payload.issue_date, date("2024-01-01"));
        assert_eq!(payload.due_date, date("2024-01-31"));
        assert_eq!(payload.status, InvoiceStatus::Draft);
        assert_eq!(payload.terms, PaymentTerms::Net30);
        assert_eq!(payload.totals.subtotal, Decimal::from(300));
        assert_eq!(payload.totals.tax_total, Decimal::from(30));
        assert_eq!(payload.notes, None);
    }

    #[test]
    fn test_draft_overrides_and_catalog() {
        let catalog = Catalog::new([product("p1", 40, 5)]);
        let draft = InvoiceDraft {
            client_id: "c9".to_string(),
            issue_date: Some(date("2024-06-01")),
            due_date: Some(date("2024-06-15")),
            status: Some(InvoiceStatus::Sent),
            terms: Some(PaymentTerms::Net15),
            notes: Some("Thanks".to_string()),
            items: vec![RawLineItem {
                product_id: Some("p1".to_string()),
                quantity: Some(json!(3)),
                ..RawLineItem::default()
            }],
        };

        let payload = draft
            .into_payload(Some(&catalog), &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01"))
            .unwrap();

        assert_eq!(payload.due_date, date("2024-06-15"));
        assert_eq!(payload.status, InvoiceStatus::Sent);
        assert_eq!(payload.terms, PaymentTerms::Net15);
        assert_eq!(payload.notes.as_deref(), Some("Thanks"));
        assert_eq!(payload.items[0].description, "Product p1");
        assert_eq!(payload.totals.grand_total, Decimal::from(126));
    }

    #[test]
    fn test_draft_rejections() {
        let draft = InvoiceDraft {
            items: vec![RawLineItem::default()],
            ..InvoiceDraft::default()
        };
        assert_eq!(
            draft.into_payload(None, &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01")),
            Err(InvoiceDraftError::MissingClient)
        );

        let draft = InvoiceDraft {
            client_id: "c1".to_string(),
            items: vec![RawLineItem {
                description: Some("Hours".to_string()),
                unit_price: Some(json!("0")),
                ..RawLineItem::default()
            }],
            ..InvoiceDraft::default()
        };
        let err = draft
            .into_payload(None, &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please ensure all invoice items have a description, quantity, and price"
        );

        let draft = InvoiceDraft {
            client_id: "c1".to_string(),
            issue_date: Some(date("2024-02-01")),
            due_date: Some(date("2024-01-01")),
            items: vec![RawLineItem {
                description: Some("Hours".to_string()),
                unit_price: Some(json!(10)),
                ..RawLineItem::default()
            }],
            ..InvoiceDraft::default()
        };
        assert_eq!(
            draft.into_payload(None, &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01")),
            Err(InvoiceDraftError::DueBeforeIssue)
        );
    }

    #[test]
    fn test_preview_does_not_validate() {
        let draft = InvoiceDraft {
            items: vec![RawLineItem {
                quantity: Some(json!("abc")),
                unit_price: Some(json!("2.5")),
                ..RawLineItem::default()
            }],
            ..InvoiceDraft::default()
        };
        let preview = draft.preview(None).unwrap();
        assert_eq!(preview.items[0].quantity, 1);
        assert_eq!(
            preview.totals.grand_total,
            Decimal::from_str("2.5").unwrap()
        );
    }

    #[test]
    fn test_oversized_rows_are_rejected_not_panicking() {
        let draft = InvoiceDraft {
            client_id: "c1".to_string(),
            items: vec![RawLineItem {
                description: Some("Bolts".to_string()),
                quantity: Some(json!("9223372036854775807")),
                unit_price: Some(json!("100000000000")),
                ..RawLineItem::default()
            }],
            ..InvoiceDraft::default()
        };

        let err = draft.preview(None).unwrap_err();
        assert_eq!(err, InvoiceDraftError::Totals(TotalsError));
        assert_eq!(err.to_string(), "Order total is too large");

        assert!(matches!(
            draft.into_payload(None, &InvoicePolicy::MANUAL_INVOICE, date("2024-01-01")),
            Err(InvoiceDraftError::InvalidItems(_))
        ));
    }
}
