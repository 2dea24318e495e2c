//! Billing API types.
//!
//! The API is loose about shapes: collections come back either as a bare
//! array or wrapped in `{ data, meta }`, single records either bare or as
//! `{ data }`, and numbers are sometimes strings. [`ListResponse`] and
//! [`ItemResponse`] absorb the envelope differences; the `lenient` helpers
//! absorb the scalar ones.

use chrono::NaiveDate;
use invoice_desk_core::{
    CatalogProduct, ClientId, InvoiceId, InvoiceStatus, PaymentId, ProductId, Receivable,
    RecurringFrequency, RecurringInvoiceId, RecurringStatus, format_currency,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Envelopes
// =============================================================================

/// List metadata. Counts live either at `meta.total` or
/// `meta.pagination.total` depending on the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination block inside [`Meta`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

impl Meta {
    /// Total number of records on the server, if reported.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
            .or_else(|| self.pagination.as_ref().and_then(|p| p.total))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Envelope {
        data: Vec<T>,
        #[serde(default)]
        meta: Option<Meta>,
    },
    Bare(Vec<T>),
}

/// A collection response, whichever shape the API used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ListResponse<T> {
    /// Server-side total, falling back to 0 when the API did not say.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.meta.as_ref().and_then(Meta::total).unwrap_or(0)
    }

    /// Convert every record, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ListResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ListBody::deserialize(deserializer)? {
            ListBody::Envelope { data, meta } => Self { data, meta },
            ListBody::Bare(data) => Self { data, meta: None },
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemBody<T> {
    Envelope { data: T },
    Bare(T),
}

/// A single-record response, whichever shape the API used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResponse<T>(pub T);

impl<T> ItemResponse<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ItemResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ItemBody::deserialize(deserializer)? {
            ItemBody::Envelope { data } | ItemBody::Bare(data) => Self(data),
        })
    }
}

// =============================================================================
// Lenient scalars
// =============================================================================

pub(crate) mod lenient {
    use chrono::NaiveDate;
    use invoice_desk_core::numeric::{decimal_from_json, integer_from_json};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number, numeric string, or null (→ 0).
    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(decimal_from_json(&value).unwrap_or_default())
    }

    /// Integer from a number or numeric string; null stays absent.
    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(integer_from_json(&value))
    }

    /// `YYYY-MM-DD`, with empty strings and null treated as absent.
    pub fn date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => {
                // Some endpoints return full timestamps.
                let day = s.get(..10).unwrap_or(s);
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }

    /// Empty strings become `None`.
    pub fn string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Records
// =============================================================================

/// A billing client (customer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub custom_value1: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub custom_value2: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A product in the billing catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub tax_rate: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub inventory_quantity: Option<i64>,
}

impl Product {
    /// The pricing view used for line items and the cart.
    #[must_use]
    pub fn to_catalog(&self) -> CatalogProduct {
        CatalogProduct {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            tax_rate: self.tax_rate,
            is_active: self.is_active,
        }
    }
}

/// One row of an invoice as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub quantity: Decimal,
    #[serde(
        default,
        alias = "cost",
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub unit_price: Decimal,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub tax_rate: Decimal,
}

/// An invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub amount: Decimal,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub balance: Decimal,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, alias = "line_items")]
    pub items: Vec<InvoiceLine>,
}

impl Receivable for Invoice {
    fn status(&self) -> Option<InvoiceStatus> {
        self.status
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn balance(&self) -> Decimal {
        self.balance
    }
}

/// A recurring invoice schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringInvoice {
    pub id: RecurringInvoiceId,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub frequency: Option<RecurringFrequency>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub next_send_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<RecurringStatus>,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub amount: Decimal,
    #[serde(default, alias = "line_items")]
    pub items: Vec<InvoiceLine>,
}

impl RecurringInvoice {
    /// Display label for the schedule frequency.
    #[must_use]
    pub fn frequency_label(&self) -> &'static str {
        self.frequency.map_or("Custom", RecurringFrequency::label)
    }
}

/// A recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,
    #[serde(
        default,
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Views
// =============================================================================

/// An invoice as the dashboard shows it: the record plus whether it can be
/// paid online, whether it is partly paid, and formatted amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub payable: bool,
    pub partially_paid: bool,
    pub amount_display: String,
    pub balance_display: String,
}

impl From<Invoice> for InvoiceView {
    fn from(invoice: Invoice) -> Self {
        Self {
            payable: invoice.is_payable(),
            partially_paid: invoice.is_partially_paid(),
            amount_display: format_currency(invoice.amount),
            balance_display: format_currency(invoice.balance),
            invoice,
        }
    }
}

/// A recurring invoice with its frequency spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringInvoiceView {
    #[serde(flatten)]
    pub recurring: RecurringInvoice,
    pub frequency_label: &'static str,
    pub amount_display: String,
}

impl From<RecurringInvoice> for RecurringInvoiceView {
    fn from(recurring: RecurringInvoice) -> Self {
        Self {
            frequency_label: recurring.frequency_label(),
            amount_display: format_currency(recurring.amount),
            recurring,
        }
    }
}

// =============================================================================
// Query parameters
// =============================================================================

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl ListParams {
    /// One page of `per_page` records.
    #[must_use]
    pub fn per_page(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Lookup by email address.
    #[must_use]
    pub fn by_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Self::default()
        }
    }

    /// Sort newest first by `field`.
    #[must_use]
    pub fn newest_first(mut self, field: &str) -> Self {
        self.sort = Some(field.to_string());
        self.sort_dir = Some("desc".to_string());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_and_bare_lists_decode_the_same() {
        let enveloped: ListResponse<Client> = serde_json::from_value(json!({
            "data": [{"id": "c1", "name": "Acme"}],
            "meta": {"pagination": {"total": 41}}
        }))
        .unwrap();
        let bare: ListResponse<Client> =
            serde_json::from_value(json!([{"id": "c1", "name": "Acme"}])).unwrap();

        assert_eq!(enveloped.data, bare.data);
        assert_eq!(enveloped.total(), 41);
        assert_eq!(bare.total(), 0);
    }

    #[test]
    fn test_empty_bare_list() {
        let list: ListResponse<Client> = serde_json::from_value(json!([])).unwrap();
        assert!(list.data.is_empty());
    }

    #[test]
    fn test_meta_total_forms() {
        let flat: Meta = serde_json::from_value(json!({"total": 7})).unwrap();
        assert_eq!(flat.total(), Some(7));
        let nested: Meta = serde_json::from_value(json!({"pagination": {"total": 9}})).unwrap();
        assert_eq!(nested.total(), Some(9));
        assert_eq!(Meta::default().total(), None);
    }

    #[test]
    fn test_item_envelope_and_bare() {
        let wrapped: ItemResponse<Client> =
            serde_json::from_value(json!({"data": {"id": "c1", "name": "Acme"}})).unwrap();
        let bare: ItemResponse<Client> =
            serde_json::from_value(json!({"id": "c1", "name": "Acme"})).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(bare.into_inner().id, ClientId::new("c1"));
    }

    #[test]
    fn test_lenient_scalars() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "i1",
            "status": "partial",
            "amount": "100.00",
            "balance": 40,
            "date": "2024-03-01",
            "due_date": "",
            "terms": "",
            "items": [{"description": "Hours", "quantity": "2", "cost": "50"}]
        }))
        .unwrap();

        assert_eq!(invoice.amount, Decimal::ONE_HUNDRED);
        assert_eq!(invoice.balance, Decimal::from(40));
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(invoice.due_date, None);
        assert_eq!(invoice.terms, None);
        assert_eq!(invoice.items[0].unit_price, Decimal::from(50));
        assert!(invoice.is_payable());
        assert!(invoice.is_partially_paid());
    }

    #[test]
    fn test_timestamp_dates_are_truncated() {
        let payment: Payment = serde_json::from_value(json!({
            "id": "p1",
            "amount": null,
            "date": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(payment.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(payment.amount, Decimal::ZERO);
    }

    #[test]
    fn test_client_defaults_active() {
        let client: Client = serde_json::from_value(json!({"id": "c1"})).unwrap();
        assert!(client.is_active);
        assert_eq!(client.email, None);
    }

    #[test]
    fn test_product_to_catalog() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1", "name": "Mug", "price": "7.50", "tax_rate": 8
        }))
        .unwrap();
        let catalog = product.to_catalog();
        assert_eq!(catalog.price, Decimal::new(750, 2));
        assert_eq!(catalog.line_description(), "Mug");
    }

    #[test]
    fn test_recurring_frequency_label() {
        let recurring: RecurringInvoice = serde_json::from_value(json!({
            "id": "r1", "frequency": "TWO_WEEKS", "status": "active", "amount": 99
        }))
        .unwrap();
        assert_eq!(recurring.frequency_label(), "Every 2 Weeks");
        assert_eq!(recurring.status, Some(RecurringStatus::Active));
    }

    #[test]
    fn test_invoice_view_fields() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "i1", "status": "partial", "amount": "1234.5", "balance": 40
        }))
        .unwrap();
        let view = serde_json::to_value(InvoiceView::from(invoice)).unwrap();

        assert_eq!(view["id"], "i1");
        assert_eq!(view["amount"], 1234.5);
        assert_eq!(view["payable"], true);
        assert_eq!(view["partially_paid"], true);
        assert_eq!(view["amount_display"], "$1,234.50");
        assert_eq!(view["balance_display"], "$40.00");
    }

    #[test]
    fn test_draft_invoice_view_is_not_payable() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "i2", "status": "draft", "amount": 100, "balance": 100
        }))
        .unwrap();
        let view = InvoiceView::from(invoice);
        assert!(!view.payable);
        assert!(!view.partially_paid);
    }

    #[test]
    fn test_recurring_view_fields() {
        let list: ListResponse<RecurringInvoice> = serde_json::from_value(json!({
            "data": [{"id": "r1", "status": "active", "amount": 99}],
            "meta": {"total": 1}
        }))
        .unwrap();
        let views = list.map(RecurringInvoiceView::from);
        assert_eq!(views.total(), 1);

        let view = serde_json::to_value(&views.data[0]).unwrap();
        assert_eq!(view["id"], "r1");
        assert_eq!(view["frequency_label"], "Custom");
        assert_eq!(view["amount_display"], "$99.00");
    }

    #[test]
    fn test_list_params_query() {
        let params = ListParams::per_page(5).newest_first("date");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"per_page": 5, "sort": "date", "sort_dir": "desc"}));
    }
}
