//! Identifier types for Qonversion records.
//!
//! Every identifier is an opaque string chosen by the caller or assigned by the
//! service. No format is enforced here; the remote API owns validation.
//!
//! # Macro-based ID Types
//!
//! The `string_id_type!` macro keeps the identifier types consistent in
//! serialization, conversion, and display behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to define a string-backed identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (transparent string)
/// - `Display`, `Debug`
/// - `From<String>`, `From<&str>`, `Into<String>`
/// - `AsRef<str>`
macro_rules! string_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id_type!(UserId, "A Qonversion user identifier.\n\nEither generated by the Qonversion SDK or chosen by the partner when creating the user.");
string_id_type!(IdentityId, "A partner identity identifier.\n\nIdentities map a partner's own user id onto a Qonversion user for cross-device access.");
string_id_type!(EntitlementId, "An entitlement identifier, for example `premium` or `pro`.");
string_id_type!(ProductId, "A product identifier as configured in Qonversion.");
