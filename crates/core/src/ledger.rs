//! Invoice balance policies and dashboard figures.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::InvoiceStatus;

/// Something owed: an invoice as seen by the dashboard.
pub trait Receivable {
    fn status(&self) -> Option<InvoiceStatus>;
    /// Full invoice amount.
    fn amount(&self) -> Decimal;
    /// Amount still owed.
    fn balance(&self) -> Decimal;

    /// See [`is_payable`].
    fn is_payable(&self) -> bool {
        is_payable(self.status(), self.balance())
    }

    /// See [`is_partially_paid`].
    fn is_partially_paid(&self) -> bool {
        is_partially_paid(self.balance(), self.amount())
    }
}

/// Some but not all of the invoice has been paid.
///
/// Used to show the remaining amount next to the total.
#[must_use]
pub fn is_partially_paid(balance: Decimal, amount: Decimal) -> bool {
    balance > Decimal::ZERO && balance < amount
}

/// Whether an invoice can be paid online.
///
/// Requires a known status that is neither draft nor paid, and something
/// left to pay.
#[must_use]
pub fn is_payable(status: Option<InvoiceStatus>, balance: Decimal) -> bool {
    matches!(status, Some(s) if s != InvoiceStatus::Draft && s != InvoiceStatus::Paid)
        && balance > Decimal::ZERO
}

/// Sum of balances over invoices that are not paid.
///
/// Saturates at [`Decimal::MAX`] instead of overflowing.
#[must_use]
pub fn outstanding_total<'a, R>(invoices: impl IntoIterator<Item = &'a R>) -> Decimal
where
    R: Receivable + 'a,
{
    invoices
        .into_iter()
        .filter(|inv| inv.status() != Some(InvoiceStatus::Paid))
        .map(Receivable::balance)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Headline numbers on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
    pub client_count: u64,
    pub invoice_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_outstanding: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inv {
        status: Option<InvoiceStatus>,
        amount: Decimal,
        balance: Decimal,
    }

    impl Receivable for Inv {
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

    fn inv(status: InvoiceStatus, amount: i64, balance: i64) -> Inv {
        Inv {
            status: Some(status),
            amount: Decimal::from(amount),
            balance: Decimal::from(balance),
        }
    }

    #[test]
    fn test_partially_paid() {
        assert!(is_partially_paid(Decimal::from(40), Decimal::from(100)));
        assert!(!is_partially_paid(Decimal::from(100), Decimal::from(100)));
        assert!(!is_partially_paid(Decimal::ZERO, Decimal::from(100)));
    }

    #[test]
    fn test_payable() {
        let ten = Decimal::TEN;
        assert!(is_payable(Some(InvoiceStatus::Sent), ten));
        assert!(is_payable(Some(InvoiceStatus::Partial), ten));
        assert!(is_payable(Some(InvoiceStatus::Overdue), ten));
        assert!(!is_payable(Some(InvoiceStatus::Draft), ten));
        assert!(!is_payable(Some(InvoiceStatus::Paid), ten));
        assert!(!is_payable(Some(InvoiceStatus::Sent), Decimal::ZERO));
        assert!(!is_payable(None, ten));
    }

    #[test]
    fn test_outstanding_skips_paid() {
        let invoices = [
            inv(InvoiceStatus::Sent, 100, 100),
            inv(InvoiceStatus::Partial, 80, 30),
            inv(InvoiceStatus::Paid, 50, 0),
            Inv {
                status: None,
                amount: Decimal::from(5),
                balance: Decimal::from(5),
            },
        ];
        assert_eq!(outstanding_total(&invoices), Decimal::from(135));
    }

    #[test]
    fn test_receivable_policies() {
        let partial = inv(InvoiceStatus::Partial, 80, 30);
        assert!(partial.is_payable());
        assert!(partial.is_partially_paid());

        let unpaid = inv(InvoiceStatus::Sent, 80, 80);
        assert!(unpaid.is_payable());
        assert!(!unpaid.is_partially_paid());

        let paid = inv(InvoiceStatus::Paid, 80, 0);
        assert!(!paid.is_payable());
        assert!(!paid.is_partially_paid());
    }

    #[test]
    fn test_outstanding_saturates() {
        let invoices = [
            inv(InvoiceStatus::Sent, 1, 1),
            Inv {
                status: Some(InvoiceStatus::Sent),
                amount: Decimal::MAX,
                balance: Decimal::MAX,
            },
        ];
        assert_eq!(outstanding_total(&invoices), Decimal::MAX);
    }

    #[test]
    fn test_stats_serialize_as_numbers() {
        let stats = DashboardStats {
            client_count: 3,
            invoice_count: 12,
            total_outstanding: Decimal::new(12_550, 2),
            total_paid: Decimal::ZERO,
        };
        let json = serde_json::to_value(stats).unwrap_or_default();
        assert_eq!(json["total_outstanding"], 125.5);
        assert_eq!(json["client_count"], 3);
    }
}
