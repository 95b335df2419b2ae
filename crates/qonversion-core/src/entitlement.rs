//! Entitlement types.
//!
//! An entitlement is a named access grant (for example `premium`) tied to the product
//! that unlocked it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntitlementId, ProductId};

/// Store or channel through which an entitlement was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementSource {
    /// Apple App Store.
    Appstore,
    /// Google Play Store.
    Playstore,
    /// Stripe.
    Stripe,
    /// Granted manually through the API or dashboard.
    Manual,
    /// Source could not be detected.
    #[serde(other)]
    Unknown,
}

/// Pricing period a subscription is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// Regular paid period.
    Normal,
    /// Free trial.
    Trial,
    /// Introductory pricing.
    Intro,
}

/// Auto-renewal state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalState {
    /// Active with auto-renew on.
    WillRenew,
    /// Auto-renew switched off.
    Canceled,
    /// The store reported a billing problem.
    BillingIssue,
}

/// Subscription details of an entitlement's product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubscription {
    /// Current pricing period.
    pub current_period_type: PeriodType,
    /// Renewal state.
    pub renewal_state: RenewalState,
}

/// The product granted by an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementProduct {
    /// Qonversion product id.
    pub product_id: ProductId,
    /// Present only for subscription products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<ProductSubscription>,
}

/// A grant of access held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Entitlement id, for example `premium`.
    pub id: EntitlementId,

    /// Whether the user currently has access.
    ///
    /// An active entitlement may still have auto-renewal switched off.
    pub active: bool,

    /// Start time in seconds since the Unix epoch.
    pub started: i64,

    /// Expiry time in seconds since the Unix epoch.
    pub expires: i64,

    /// Where the entitlement came from.
    pub source: EntitlementSource,

    /// Granted product.
    pub product: EntitlementProduct,
}

impl Entitlement {
    /// Start time as a UTC timestamp.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        crate::epoch_to_utc(self.started)
    }

    /// Expiry time as a UTC timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        crate::epoch_to_utc(self.expires)
    }

    /// Whether the underlying subscription is set to renew.
    ///
    /// Always `false` for non-subscription products.
    #[must_use]
    pub fn will_renew(&self) -> bool {
        self.product
            .subscription
            .as_ref()
            .is_some_and(|s| s.renewal_state == RenewalState::WillRenew)
    }
}

/// Entitlements of a user, as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementList {
    /// All entitlements, active or not.
    #[serde(default)]
    pub data: Vec<Entitlement>,
}

impl EntitlementList {
    /// Entitlements that currently grant access.
    pub fn active(&self) -> impl Iterator<Item = &Entitlement> {
        self.data.iter().filter(|e| e.active)
    }

    /// Look up an entitlement by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Entitlement> {
        self.data.iter().find(|e| e.id.as_str() == id)
    }
}
