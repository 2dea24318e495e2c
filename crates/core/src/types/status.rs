//! Status and enumeration types mirrored from the billing API.
//!
//! The API speaks lowercase strings for invoice and recurring statuses and
//! SCREAMING_SNAKE_CASE for recurring frequencies. Values this dashboard
//! does not know about deserialize into an `Unknown`/`Custom` variant
//! instead of failing the whole response.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Partial,
    Paid,
    Overdue,
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a recurring invoice schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
    #[serde(other)]
    Unknown,
}

/// How often a recurring invoice is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringFrequency {
    Weekly,
    TwoWeeks,
    FourWeeks,
    Monthly,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    Annually,
    TwoYears,
    #[serde(other)]
    Custom,
}

impl RecurringFrequency {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::TwoWeeks => "Every 2 Weeks",
            Self::FourWeeks => "Every 4 Weeks",
            Self::Monthly => "Monthly",
            Self::TwoMonths => "Every 2 Months",
            Self::ThreeMonths => "Quarterly",
            Self::SixMonths => "Every 6 Months",
            Self::Annually => "Annually",
            Self::TwoYears => "Every 2 Years",
            Self::Custom => "Custom",
        }
    }
}

/// Payment method chosen at store checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
}

impl PaymentMethod {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::Paypal),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Payment terms offered on the manual invoice form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentTerms {
    #[serde(rename = "Net 15")]
    Net15,
    #[serde(rename = "Net 30")]
    Net30,
    #[serde(rename = "Net 45")]
    Net45,
    #[serde(rename = "Net 60")]
    Net60,
    #[serde(rename = "Due on Receipt")]
    DueOnReceipt,
}

impl PaymentTerms {
    /// Label as it appears on the invoice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Net15 => "Net 15",
            Self::Net30 => "Net 30",
            Self::Net45 => "Net 45",
            Self::Net60 => "Net 60",
            Self::DueOnReceipt => "Due on Receipt",
        }
    }
}

impl std::fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
