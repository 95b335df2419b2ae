//! Core types for the Qonversion subscription API.
//!
//! This crate provides the wire-format records exchanged with the Qonversion API:
//!
//! - **Identifiers**: `UserId`, `IdentityId`, `EntitlementId`, `ProductId`
//! - **Users**: `User`, `CreateUser`, `Identity`, `Environment`
//! - **Properties**: `UserProperty`, `PropertyWriteResult`, `PropertyError`
//! - **Entitlements**: `Entitlement`, `EntitlementSource`, `EntitlementList`
//! - **Purchases**: `Purchase`, `StripeStoreData`
//! - **Webhooks**: `WebhookEvent`, `EventName`
//!
//! # Timestamps
//!
//! All timestamps are carried as `i64` seconds since the Unix epoch, exactly as the
//! API sends them. Records expose `chrono` accessors for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entitlement;
pub mod error;
pub mod ids;
pub mod purchase;
pub mod user;
pub mod webhook;

pub use entitlement::{
    Entitlement, EntitlementList, EntitlementProduct, EntitlementSource, PeriodType,
    ProductSubscription, RenewalState,
};
pub use error::{CoreError, Result};
pub use ids::{EntitlementId, IdentityId, ProductId, UserId};
pub use purchase::{Purchase, StripeStoreData};
pub use user::{
    CreateUser, Environment, Identity, PropertyError, PropertyWriteResult, User, UserProperty,
};
pub use webhook::{EventName, Platform, Price, Revenue, Transaction, WebhookEvent};

/// Convert epoch seconds into a UTC timestamp.
pub(crate) fn epoch_to_utc(seconds: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(seconds, 0)
}
