//! Webhook event payloads.
//!
//! Qonversion pushes lifecycle notifications to a partner endpoint. This module
//! only describes and decodes the payload; signature checks and event handling
//! belong to the receiving service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::{Environment, IdentityId, ProductId, UserId};

/// Lifecycle transition reported by a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// A free trial began.
    TrialStarted,
    /// A trial converted into a paid subscription.
    TrialConverted,
    /// Auto-renewal was switched off during a trial.
    TrialCancelled,
    /// A trial ended without converting.
    TrialExpired,
    /// A trial is still running.
    TrialStillActive,
    /// Conversion from trial failed and the store is retrying billing.
    TrialBillingRetryEntered,
    /// A paid subscription began.
    SubscriptionStarted,
    /// A subscription renewed.
    SubscriptionRenewed,
    /// A subscription payment was refunded.
    SubscriptionRefunded,
    /// Auto-renewal was switched off.
    SubscriptionCanceled,
    /// The user moved to a higher tier.
    SubscriptionUpgraded,
    /// A subscription lapsed.
    SubscriptionExpired,
    /// The subscribed product changed.
    SubscriptionProductChanged,
    /// A renewal failed and the store is retrying billing.
    SubscriptionBillingRetryEntered,
    /// A one-off in-app purchase.
    InAppPurchase,
}

impl EventName {
    /// Every event name, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::TrialStarted,
        Self::TrialConverted,
        Self::TrialCancelled,
        Self::TrialExpired,
        Self::TrialStillActive,
        Self::TrialBillingRetryEntered,
        Self::SubscriptionStarted,
        Self::SubscriptionRenewed,
        Self::SubscriptionRefunded,
        Self::SubscriptionCanceled,
        Self::SubscriptionUpgraded,
        Self::SubscriptionExpired,
        Self::SubscriptionProductChanged,
        Self::SubscriptionBillingRetryEntered,
        Self::InAppPurchase,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrialStarted => "trial_started",
            Self::TrialConverted => "trial_converted",
            Self::TrialCancelled => "trial_cancelled",
            Self::TrialExpired => "trial_expired",
            Self::TrialStillActive => "trial_still_active",
            Self::TrialBillingRetryEntered => "trial_billing_retry_entered",
            Self::SubscriptionStarted => "subscription_started",
            Self::SubscriptionRenewed => "subscription_renewed",
            Self::SubscriptionRefunded => "subscription_refunded",
            Self::SubscriptionCanceled => "subscription_canceled",
            Self::SubscriptionUpgraded => "subscription_upgraded",
            Self::SubscriptionExpired => "subscription_expired",
            Self::SubscriptionProductChanged => "subscription_product_changed",
            Self::SubscriptionBillingRetryEntered => "subscription_billing_retry_entered",
            Self::InAppPurchase => "in_app_purchase",
        }
    }

    /// Whether the event concerns a trial period.
    #[must_use]
    pub const fn is_trial(self) -> bool {
        matches!(
            self,
            Self::TrialStarted
                | Self::TrialConverted
                | Self::TrialCancelled
                | Self::TrialExpired
                | Self::TrialStillActive
                | Self::TrialBillingRetryEntered
        )
    }

    /// Whether the event concerns a paid subscription.
    #[must_use]
    pub const fn is_subscription(self) -> bool {
        !self.is_trial() && !matches!(self, Self::InAppPurchase)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::UnknownEventName(s.to_string()))
    }
}

/// Device platform that produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Apple platforms.
    #[serde(rename = "iOS")]
    Ios,
    /// Android.
    #[serde(rename = "android")]
    Android,
}

/// Revenue attributed to the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    /// Amount in `currency`.
    pub value: f64,
    /// Amount converted to USD.
    pub value_usd: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// `1` when `value` is net of store commission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_proceed: Option<u8>,
    /// Share kept after store commission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proceeds_rate: Option<f64>,
}

impl Revenue {
    /// Whether `value` already has store commission deducted.
    #[must_use]
    pub fn is_proceeds(&self) -> bool {
        self.is_proceed == Some(1)
    }
}

/// Product price at the time of the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in `currency`.
    pub value: f64,
    /// Amount converted to USD.
    pub value_usd: f64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Store transaction behind the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store transaction id.
    pub transaction_id: u64,
    /// Id of the first transaction in the subscription chain.
    pub original_transaction_id: u64,
    /// Expiry in seconds since the Unix epoch.
    pub expires: i64,
    /// Grace period end in seconds since the Unix epoch.
    pub grace_period_expires: i64,
}

/// A webhook notification sent by Qonversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// What happened.
    pub event_name: EventName,
    /// Qonversion user id.
    pub user_id: UserId,
    /// Partner-side user id.
    pub custom_user_id: String,
    /// Partner identity id.
    pub identity_id: IdentityId,
    /// Advertising id of the device.
    pub advertiser_id: String,
    /// When the event happened, seconds since the Unix epoch.
    pub time: i64,
    /// When the event was recorded, seconds since the Unix epoch.
    pub created_at: i64,
    /// Product involved.
    pub product_id: ProductId,
    /// Revenue, absent for events without a payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Revenue>,
    /// Product price.
    pub price: Price,
    /// Store transaction.
    pub transaction: Transaction,
    /// Device id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// App version that sent the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Qonversion SDK version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,
    /// Environment of the user.
    pub environment: Environment,
    /// Device platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Client IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Country code of the store account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Previous product, for product change events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_product_id: Option<ProductId>,
    /// New product, for product change events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_product_id: Option<ProductId>,
}

impl WebhookEvent {
    /// Decode an event from a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidWebhook` if the body is not a valid event.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode an event from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidWebhook` if the body is not a valid event.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Event time as a UTC timestamp.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        crate::epoch_to_utc(self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renewal_payload() -> serde_json::Value {
        serde_json::json!({
            "event_name": "subscription_renewed",
            "user_id": "QON_1",
            "custom_user_id": "cust-9",
            "identity_id": "partner-9",
            "advertiser_id": "00000000-0000-0000-0000-000000000000",
            "time": 1_700_000_000,
            "created_at": 1_700_000_005,
            "product_id": "monthly",
            "revenue": {
                "value": 8.49,
                "value_usd": 8.49,
                "currency": "USD",
                "is_proceed": 1,
                "proceeds_rate": 85.0
            },
            "price": {"value": 9.99, "value_usd": 9.99, "currency": "USD"},
            "transaction": {
                "transaction_id": 2_000_000_123_u64,
                "original_transaction_id": 2_000_000_001_u64,
                "expires": 1_702_592_000,
                "grace_period_expires": 0
            },
            "environment": "prod",
            "platform": "iOS",
            "country": "DE"
        })
    }

    #[test]
    fn decodes_full_event() {
        let body = serde_json::to_vec(&renewal_payload()).unwrap();
        let event = WebhookEvent::from_slice(&body).unwrap();

        assert_eq!(event.event_name, EventName::SubscriptionRenewed);
        assert_eq!(event.platform, Some(Platform::Ios));
        assert!(event.revenue.as_ref().unwrap().is_proceeds());
        assert_eq!(event.transaction.transaction_id, 2_000_000_123);
        assert_eq!(event.environment, Environment::Prod);
        assert!(event.device_id.is_none());
        assert_eq!(event.occurred_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn revenue_is_optional() {
        let mut payload = renewal_payload();
        payload["event_name"] = "trial_started".into();
        payload.as_object_mut().unwrap().remove("revenue");

        let event = WebhookEvent::from_json(&payload.to_string()).unwrap();
        assert!(event.revenue.is_none());
        assert!(event.event_name.is_trial());
    }

    #[test]
    fn rejects_unknown_event_name() {
        let mut payload = renewal_payload();
        payload["event_name"] = "subscription_paused".into();

        let err = WebhookEvent::from_json(&payload.to_string()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWebhook(_)));
    }

    #[test]
    fn event_names_round_trip_through_str() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
        assert!(!EventName::InAppPurchase.is_subscription());
        assert!(EventName::SubscriptionBillingRetryEntered.is_subscription());
    }
}
