//! Qonversion Client SDK.
//!
//! This crate provides a typed client for the Qonversion subscription API: users,
//! identities, user properties, entitlements, and manually recorded purchases.
//!
//! # Credentials
//!
//! The API uses two bearer keys. The [`ProjectKey`] guards reads and user management;
//! the [`SecretKey`] guards everything that changes billing or entitlement state
//! (granting and revoking entitlements, recording purchases). Each operation is bound
//! to one of the two handles and there is no way to send a raw string instead.
//!
//! # Example
//!
//! ```no_run
//! use qonversion_client::{Environment, ProjectKey, QonversionClient, SecretKey, UserId};
//!
//! # async fn example() -> Result<(), qonversion_client::ClientError> {
//! let client = QonversionClient::new(
//!     ProjectKey::new("your-project-key"),
//!     SecretKey::new("your-secret-key"),
//! )?;
//!
//! let user_id = UserId::from("partner-user-42");
//! client.create_user(&user_id, Environment::Sandbox).await?;
//!
//! let entitlements = client.get_entitlements(&user_id).await?;
//! for entitlement in entitlements.active() {
//!     println!("{} expires at {}", entitlement.id, entitlement.expires);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod config;
mod credentials;
mod error;
mod types;

pub use client::{ClientOptions, QonversionClient, DEFAULT_BASE_URL};
pub use config::ClientConfig;
pub use credentials::{Credential, CredentialKind, ProjectKey, SecretKey};
pub use error::ClientError;
pub use qonversion_core::user::reserved;
pub use qonversion_core::{
    CoreError, CreateUser, Entitlement, EntitlementId, EntitlementList, EntitlementProduct,
    EntitlementSource, Environment, EventName, Identity, IdentityId, PeriodType, Platform, Price,
    ProductId, ProductSubscription, PropertyError, PropertyWriteResult, Purchase, RenewalState,
    Revenue, StripeStoreData, Transaction, User, UserId, UserProperty, WebhookEvent,
};
