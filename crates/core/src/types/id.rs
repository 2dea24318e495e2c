//! Newtype IDs for type-safe references to billing API records.
//!
//! The billing API identifies every record with an opaque hashed string
//! (e.g. `"VolejRejNm"`), so the wrappers hold a `String` rather than a
//! number. Use the `define_id!` macro to create new wrappers.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>` and `From<String>`/`From<&str>`
///
/// # Example
///
/// ```rust
/// # use invoice_desk_core::define_id;
/// define_id!(ClientId);
/// define_id!(InvoiceId);
///
/// let client = ClientId::new("VolejRejNm");
/// let invoice = InvoiceId::new("VolejRejNm");
///
/// // Same raw value, different types, so this won't compile:
/// // let _: ClientId = invoice;
/// assert_eq!(client.as_str(), invoice.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the raw identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(ClientId);
define_id!(ProductId);
define_id!(InvoiceId);
define_id!(RecurringInvoiceId);
define_id!(PaymentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_transparent_in_json() {
        let id = ProductId::new("p-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-42\"");

        let parsed: ProductId = serde_json::from_str("\"p-42\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = ClientId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_ref(), "abc");
        assert_eq!(id.into_inner(), "abc".to_string());
    }
}
