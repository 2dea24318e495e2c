//! Create/update bodies for billing records.
//!
//! Each `*Input` is what the dashboard accepts from its own callers. It is
//! checked and converted into the body sent to the billing API, mirroring
//! the required fields of the dashboard's forms.

use chrono::NaiveDate;
use invoice_desk_core::numeric::{decimal_from_json, integer_from_json};
use invoice_desk_core::{
    Catalog, ClientId, CustomerDetails, InvoiceId, ItemRules, LineItem, LineItemError,
    RawLineItem, RecurringFrequency, RecurringStatus, normalize_all, validate_items,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A create/update body that failed its required-field checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Client name is required")]
    MissingClientName,

    #[error("Please fill in all required fields")]
    MissingRequired,

    #[error("Please enter a valid {0}")]
    InvalidNumber(&'static str),

    #[error("Please ensure all invoice items have a description, quantity, and price")]
    InvalidItems(Vec<LineItemError>),
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn blank_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Clients
// =============================================================================

/// Client create/update body. Also sent to the API as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ClientInput {
    /// # Errors
    ///
    /// Returns [`FormError::MissingClientName`] when the name is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingClientName);
        }
        Ok(())
    }
}

impl From<&CustomerDetails> for ClientInput {
    fn from(customer: &CustomerDetails) -> Self {
        Self {
            name: customer.name.clone(),
            email: Some(customer.email.to_string()),
            address1: Some(customer.address.clone()),
            city: Some(customer.city.clone()),
            state: Some(customer.state.clone()),
            postal_code: Some(customer.zip.clone()),
            country: Some(customer.country.clone()),
            is_active: true,
            ..Self::default()
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product form. Numbers may arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub tax_rate: Option<Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default)]
    pub inventory_quantity: Option<Value>,
}

/// Product body sent to the billing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    pub is_active: bool,
    pub track_inventory: bool,
    /// Always present; `null` unless inventory is tracked.
    pub inventory_quantity: Option<i64>,
}

impl ProductInput {
    /// Check required fields and parse numbers.
    ///
    /// # Errors
    ///
    /// Name and price are required; the price must parse and not be negative.
    pub fn into_request(self) -> Result<ProductRequest, FormError> {
        if self.name.trim().is_empty() || blank_value(self.price.as_ref()) {
            return Err(FormError::MissingRequired);
        }
        let price = self
            .price
            .as_ref()
            .and_then(decimal_from_json)
            .filter(|p| !p.is_sign_negative())
            .ok_or(FormError::InvalidNumber("price"))?;
        let tax_rate = self
            .tax_rate
            .as_ref()
            .and_then(decimal_from_json)
            .unwrap_or_default();
        let inventory_quantity = self.track_inventory.then(|| {
            self.inventory_quantity
                .as_ref()
                .and_then(integer_from_json)
                .unwrap_or(0)
        });

        Ok(ProductRequest {
            name: self.name.trim().to_string(),
            description: self.description,
            price,
            sku: self.sku.filter(|s| !s.trim().is_empty()),
            tax_rate,
            is_active: self.is_active,
            track_inventory: self.track_inventory,
            inventory_quantity,
        })
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Payment form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub transaction_reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payment body sent to the billing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PaymentInput {
    /// Check required fields and parse the amount and date.
    ///
    /// # Errors
    ///
    /// Amount, date, client and payment method are required.
    pub fn into_request(self) -> Result<PaymentRequest, FormError> {
        if blank_value(self.amount.as_ref())
            || blank(self.date.as_deref())
            || blank(self.client_id.as_deref())
            || blank(self.payment_method.as_deref())
        {
            return Err(FormError::MissingRequired);
        }

        let amount = self
            .amount
            .as_ref()
            .and_then(decimal_from_json)
            .ok_or(FormError::InvalidNumber("amount"))?;
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .ok_or(FormError::InvalidNumber("date"))?;

        Ok(PaymentRequest {
            client_id: ClientId::new(self.client_id.unwrap_or_default().trim()),
            invoice_id: self
                .invoice_id
                .filter(|id| !id.trim().is_empty())
                .map(InvoiceId::from),
            amount,
            date,
            payment_method: self.payment_method.unwrap_or_default().trim().to_string(),
            transaction_reference: self.transaction_reference.filter(|s| !s.trim().is_empty()),
            notes: self.notes.filter(|s| !s.trim().is_empty()),
        })
    }
}

// =============================================================================
// Recurring invoices
// =============================================================================

/// Recurring invoice form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecurringInvoiceInput {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub frequency: Option<RecurringFrequency>,
    #[serde(default)]
    pub next_send_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<RecurringStatus>,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
}

/// Recurring invoice body sent to the billing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringInvoiceRequest {
    pub client_id: ClientId,
    pub frequency: RecurringFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_send_date: Option<NaiveDate>,
    pub status: RecurringStatus,
    pub items: Vec<LineItem>,
}

impl RecurringInvoiceInput {
    /// Normalize rows against the catalog and check required fields.
    ///
    /// # Errors
    ///
    /// Client and frequency are required; rows follow the manual invoice
    /// rules.
    pub fn into_request(self, catalog: Option<&Catalog>) -> Result<RecurringInvoiceRequest, FormError> {
        let client_id = self.client_id.trim();
        let Some(frequency) = self.frequency.filter(|_| !client_id.is_empty()) else {
            return Err(FormError::MissingRequired);
        };

        let items = normalize_all(&self.items, catalog);
        validate_items(&items, ItemRules::MANUAL_INVOICE).map_err(FormError::InvalidItems)?;

        Ok(RecurringInvoiceRequest {
            client_id: ClientId::new(client_id),
            frequency,
            next_send_date: self.next_send_date,
            status: self.status.unwrap_or_default(),
            items,
        })
    }
}
