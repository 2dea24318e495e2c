//! Store checkout: form validation and the checkout state machine.
//!
//! Validation runs before any network call. Card details are checked for
//! shape only; they are never stored or forwarded, and the form's `Debug`
//! output redacts them.

use core::fmt;

use serde::Deserialize;

use crate::cart::Cart;
use crate::line_item::{ItemRules, LineItemError, validate_items};
use crate::totals::TotalsError;
use crate::types::{Email, EmailError, PaymentMethod};

fn default_country() -> String {
    "US".to_string()
}

fn default_payment_method() -> String {
    PaymentMethod::default().as_str().to_string()
}

/// Checkout form as submitted by the store front.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvv: String,
}

impl fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("zip", &self.zip)
            .field("country", &self.country)
            .field("payment_method", &self.payment_method)
            .field("card_number", &"[REDACTED]")
            .field("card_expiry", &"[REDACTED]")
            .field("card_cvv", &"[REDACTED]")
            .finish()
    }
}

/// Who is buying, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
}

/// Reasons a checkout form is rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutValidationError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Please enter a valid email address")]
    InvalidEmail(#[source] EmailError),

    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    #[error("Please fill in all credit card details")]
    MissingCardDetails,

    #[error("Please enter a valid 16-digit card number")]
    InvalidCardNumber,

    #[error("Please enter a valid expiry date (MM/YY)")]
    InvalidCardExpiry,

    #[error("Please enter a valid CVV code")]
    InvalidCardCvv,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please check the items in your cart: {}", join_errors(.0))]
    InvalidItems(Vec<LineItemError>),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

fn join_errors(errors: &[LineItemError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// 16 digits once whitespace is removed.
fn is_valid_card_number(number: &str) -> bool {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 16 && all_digits(&digits)
}

/// Exactly `MM/YY`.
fn is_valid_expiry(expiry: &str) -> bool {
    expiry
        .split_once('/')
        .is_some_and(|(mm, yy)| mm.len() == 2 && yy.len() == 2 && all_digits(mm) && all_digits(yy))
}

fn is_valid_cvv(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && all_digits(cvv)
}

impl CheckoutForm {
    /// Validate the form against the cart it is checking out.
    ///
    /// Checks run in the order the buyer would fix them: required fields,
    /// card details, then the cart itself.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutValidationError`] encountered.
    pub fn validate(&self, cart: &Cart) -> Result<ValidatedCheckout, CheckoutValidationError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
            ("payment_method", &self.payment_method),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| is_blank(value))
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutValidationError::MissingFields(missing));
        }

        let payment_method: PaymentMethod = self
            .payment_method
            .trim()
            .parse()
            .map_err(|_| CheckoutValidationError::UnsupportedPaymentMethod(self.payment_method.clone()))?;

        if payment_method == PaymentMethod::CreditCard {
            self.validate_card()?;
        }

        let email = Email::parse(&self.email).map_err(CheckoutValidationError::InvalidEmail)?;

        if cart.is_empty() {
            return Err(CheckoutValidationError::EmptyCart);
        }
        validate_items(&cart.to_line_items(), ItemRules::STORE)
            .map_err(CheckoutValidationError::InvalidItems)?;
        cart.totals()?;

        Ok(ValidatedCheckout {
            customer: CustomerDetails {
                name: self.name.trim().to_string(),
                email,
                address: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                zip: self.zip.trim().to_string(),
                country: self.country.trim().to_string(),
            },
            payment_method,
        })
    }

    fn validate_card(&self) -> Result<(), CheckoutValidationError> {
        if is_blank(&self.card_number) || is_blank(&self.card_expiry) || is_blank(&self.card_cvv) {
            return Err(CheckoutValidationError::MissingCardDetails);
        }
        if !is_valid_card_number(&self.card_number) {
            return Err(CheckoutValidationError::InvalidCardNumber);
        }
        if !is_valid_expiry(&self.card_expiry) {
            return Err(CheckoutValidationError::InvalidCardExpiry);
        }
        if !is_valid_cvv(&self.card_cvv) {
            return Err(CheckoutValidationError::InvalidCardCvv);
        }
        Ok(())
    }
}

/// The step a checkout was on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Submitting,
    ResolvingCustomer,
    CreatingInvoice,
}

impl CheckoutStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitting => "submitting",
            Self::ResolvingCustomer => "resolving_customer",
            Self::CreatingInvoice => "creating_invoice",
        }
    }
}

/// Where a checkout is.
///
/// ```text
/// EditingCart -> Submitting -> ResolvingCustomer -> CreatingInvoice -> Cleared
///                     \               |                  /
///                      +-----------> Failed <-----------+
/// Failed -> EditingCart
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    EditingCart,
    Submitting,
    ResolvingCustomer,
    CreatingInvoice,
    Cleared,
    Failed {
        stage: CheckoutStage,
        reason: String,
    },
}

/// Something that happened during checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    Submit,
    Validated,
    CustomerResolved,
    InvoiceCreated,
    Fail(String),
    ReturnToCart,
}

impl CheckoutEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Validated => "validated",
            Self::CustomerResolved => "customer_resolved",
            Self::InvoiceCreated => "invoice_created",
            Self::Fail(_) => "fail",
            Self::ReturnToCart => "return_to_cart",
        }
    }
}

/// An event that is not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply '{event}' while {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub event: &'static str,
}

impl CheckoutState {
    /// State name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EditingCart => "editing_cart",
            Self::Submitting => "submitting",
            Self::ResolvingCustomer => "resolving_customer",
            Self::CreatingInvoice => "creating_invoice",
            Self::Cleared => "cleared",
            Self::Failed { .. } => "failed",
        }
    }

    /// The stage currently in flight, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<CheckoutStage> {
        match self {
            Self::Submitting => Some(CheckoutStage::Submitting),
            Self::ResolvingCustomer => Some(CheckoutStage::ResolvingCustomer),
            Self::CreatingInvoice => Some(CheckoutStage::CreatingInvoice),
            _ => None,
        }
    }

    /// The error to show the buyer, when failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Move to the next state.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if `event` is not valid from here; the
    /// current state is left unchanged.
    pub fn apply(&mut self, event: CheckoutEvent) -> Result<(), TransitionError> {
        let next = match (&*self, event) {
            (Self::EditingCart, CheckoutEvent::Submit) => Self::Submitting,
            (Self::Submitting, CheckoutEvent::Validated) => Self::ResolvingCustomer,
            (Self::ResolvingCustomer, CheckoutEvent::CustomerResolved) => Self::CreatingInvoice,
            (Self::CreatingInvoice, CheckoutEvent::InvoiceCreated) => Self::Cleared,
            (Self::Failed { .. }, CheckoutEvent::ReturnToCart) => Self::EditingCart,
            (current, CheckoutEvent::Fail(reason)) => match current.stage() {
                Some(stage) => Self::Failed { stage, reason },
                None => {
                    return Err(TransitionError {
                        state: current.name(),
                        event: "fail",
                    });
                }
            },
            (current, event) => {
                return Err(TransitionError {
                    state: current.name(),
                    event: event.name(),
                });
            }
        };
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::line_item::CatalogProduct;
    use crate::types::ProductId;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_product(&CatalogProduct {
            id: ProductId::new("p1"),
            name: "Mug".to_string(),
            description: String::new(),
            price: Decimal::from(8),
            tax_rate: Decimal::ZERO,
            is_active: true,
        });
        cart
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Jane Buyer".to_string(),
            email: "jane@shop.test".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
            payment_method: "credit_card".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            card_expiry: "12/29".to_string(),
            card_cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let checkout = form().validate(&cart()).unwrap();
        assert_eq!(checkout.payment_method, PaymentMethod::CreditCard);
        assert_eq!(checkout.customer.email.as_str(), "jane@shop.test");
        assert_eq!(checkout.customer.zip, "62701");
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut f = form();
        f.name = String::new();
        f.zip = "  ".to_string();
        let err = f.validate(&cart()).unwrap_err();
        assert_eq!(
            err,
            CheckoutValidationError::MissingFields(vec!["name", "zip"])
        );
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: name, zip"
        );
    }

    #[test]
    fn test_card_checks() {
        let mut f = form();
        f.card_cvv = String::new();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::MissingCardDetails)
        );

        let mut f = form();
        f.card_number = "4242 4242".to_string();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::InvalidCardNumber)
        );

        let mut f = form();
        f.card_expiry = "1/29".to_string();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::InvalidCardExpiry)
        );

        let mut f = form();
        f.card_cvv = "12a".to_string();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::InvalidCardCvv)
        );

        let mut f = form();
        f.card_cvv = "1234".to_string();
        assert!(f.validate(&cart()).is_ok());
    }

    #[test]
    fn test_cart_too_large_to_total() {
        let mut cart = Cart::new();
        cart.add_product(&CatalogProduct {
            id: ProductId::new("gold"),
            name: "Gold bar".to_string(),
            description: String::new(),
            price: Decimal::MAX,
            tax_rate: Decimal::ZERO,
            is_active: true,
        });
        cart.set_quantity(&ProductId::new("gold"), 2).unwrap();

        let err = form().validate(&cart).unwrap_err();
        assert_eq!(err, CheckoutValidationError::Totals(TotalsError));
        assert_eq!(err.to_string(), "Order total is too large");
    }

    #[test]
    fn test_paypal_skips_card_checks() {
        let mut f = form();
        f.payment_method = "paypal".to_string();
        f.card_number = String::new();
        f.card_expiry = String::new();
        f.card_cvv = String::new();
        assert_eq!(
            f.validate(&cart()).unwrap().payment_method,
            PaymentMethod::Paypal
        );
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut f = form();
        f.payment_method = "cash".to_string();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::UnsupportedPaymentMethod(
                "cash".to_string()
            ))
        );
    }

    #[test]
    fn test_bad_email() {
        let mut f = form();
        f.email = "jane.shop.test".to_string();
        assert_eq!(
            f.validate(&cart()),
            Err(CheckoutValidationError::InvalidEmail(
                EmailError::MissingAtSymbol
            ))
        );
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(
            form().validate(&Cart::new()),
            Err(CheckoutValidationError::EmptyCart)
        );
    }

    #[test]
    fn test_defaults_when_deserializing() {
        let f: CheckoutForm = serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert_eq!(f.country, "US");
        assert_eq!(f.payment_method, "credit_card");
    }

    #[test]
    fn test_debug_redacts_card() {
        let debug = format!("{:?}", form());
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("12/29"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = CheckoutState::default();
        for event in [
            CheckoutEvent::Submit,
            CheckoutEvent::Validated,
            CheckoutEvent::CustomerResolved,
            CheckoutEvent::InvoiceCreated,
        ] {
            state.apply(event).unwrap();
        }
        assert_eq!(state, CheckoutState::Cleared);
    }

    #[test]
    fn test_failure_returns_to_cart() {
        let mut state = CheckoutState::default();
        state.apply(CheckoutEvent::Submit).unwrap();
        state.apply(CheckoutEvent::Validated).unwrap();
        state
            .apply(CheckoutEvent::Fail(
                "Failed to process customer information".to_string(),
            ))
            .unwrap();

        assert_eq!(
            state,
            CheckoutState::Failed {
                stage: CheckoutStage::ResolvingCustomer,
                reason: "Failed to process customer information".to_string(),
            }
        );
        assert_eq!(
            state.failure_reason(),
            Some("Failed to process customer information")
        );

        state.apply(CheckoutEvent::ReturnToCart).unwrap();
        assert_eq!(state, CheckoutState::EditingCart);
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut state = CheckoutState::EditingCart;
        let err = state.apply(CheckoutEvent::InvoiceCreated).unwrap_err();
        assert_eq!(err.state, "editing_cart");
        assert_eq!(err.event, "invoice_created");
        assert_eq!(state, CheckoutState::EditingCart);

        assert!(state.apply(CheckoutEvent::Fail("x".to_string())).is_err());

        let mut state = CheckoutState::Cleared;
        assert!(state.apply(CheckoutEvent::Fail("late".to_string())).is_err());
        assert!(state.apply(CheckoutEvent::Submit).is_err());
    }
}
