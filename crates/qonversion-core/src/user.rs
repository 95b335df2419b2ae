//! User, identity, and user property types.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::{IdentityId, UserId};

/// Prefix shared by all Qonversion-defined property keys.
pub const RESERVED_PROPERTY_PREFIX: &str = "_q_";

/// Well-known Qonversion-defined property keys.
pub mod reserved {
    /// User email.
    pub const EMAIL: &str = "_q_email";
    /// User display name.
    pub const NAME: &str = "_q_name";
    /// Partner-side user id.
    pub const CUSTOM_USER_ID: &str = "_q_custom_user_id";
    /// `AppsFlyer` user id.
    pub const APPSFLYER_USER_ID: &str = "_q_appsflyer_user_id";
    /// Adjust advertising id.
    pub const ADJUST_ADID: &str = "_q_adjust_adid";
    /// Kochava device id.
    pub const KOCHAVA_DEVICE_ID: &str = "_q_kochava_device_id";
    /// Firebase app instance id.
    pub const FIREBASE_INSTANCE_ID: &str = "_q_firebase_instance_id";
    /// Advertising id (IDFA / GAID).
    pub const ADVERTISING_ID: &str = "_q_advertising_id";
}

// ============================================================================
// Environment
// ============================================================================

/// The environment a user (and everything attached to it) lives in.
///
/// Use `Sandbox` for testing automation or store sandbox purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Testing environment.
    Sandbox,
    /// Production environment.
    Prod,
}

impl Environment {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Prod => "prod",
        }
    }

    /// Whether this is the sandbox environment.
    #[must_use]
    pub const fn is_sandbox(self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Self::Sandbox),
            "prod" => Ok(Self::Prod),
            other => Err(CoreError::UnknownEnvironment(other.to_string())),
        }
    }
}

// ============================================================================
// Users and identities
// ============================================================================

/// A Qonversion user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Qonversion user id.
    pub id: UserId,

    /// Partner identity linked to this user, if any.
    #[serde(default)]
    pub identity_id: Option<IdentityId>,

    /// Environment the user belongs to.
    pub environment: Environment,

    /// Creation time in seconds since the Unix epoch.
    pub created: i64,
}

impl User {
    /// Creation time as a UTC timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        crate::epoch_to_utc(self.created)
    }
}

/// The user record returned when a user is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    /// Qonversion user id.
    pub id: UserId,
    /// Creation time in seconds since the Unix epoch.
    pub created: i64,
    /// Environment the user was created in.
    pub environment: Environment,
}

impl CreateUser {
    /// Creation time as a UTC timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        crate::epoch_to_utc(self.created)
    }
}

/// Mapping from a partner identity onto a Qonversion user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Partner identity id.
    pub id: IdentityId,
    /// Qonversion user the identity points to.
    pub user_id: UserId,
}

// ============================================================================
// Properties
// ============================================================================

/// A custom or Qonversion-defined user property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserProperty {
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: String,
}

impl UserProperty {
    /// Create a property.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the key uses the Qonversion-defined `_q_` prefix.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.key.starts_with(RESERVED_PROPERTY_PREFIX)
    }
}

/// A property the service refused to save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyError {
    /// Key of the rejected property.
    pub key: String,
    /// Reason given by the service.
    pub error: String,
}

/// Result of writing user properties.
///
/// Properties succeed or fail independently: every submitted key lands in exactly
/// one of `saved_properties` or `property_errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWriteResult {
    /// Properties that were stored.
    #[serde(default)]
    pub saved_properties: Vec<UserProperty>,
    /// Properties that were rejected.
    #[serde(default)]
    pub property_errors: Vec<PropertyError>,
}

impl PropertyWriteResult {
    /// Whether every submitted property was saved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.property_errors.is_empty()
    }

    /// Keys of the rejected properties.
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.property_errors.iter().map(|e| e.key.as_str())
    }

    /// Check that saved and failed keys partition the submitted keys.
    ///
    /// Returns `false` if a submitted key is missing from both lists, appears in both,
    /// or if the result mentions a key that was never submitted.
    #[must_use]
    pub fn partitions(&self, submitted: &[UserProperty]) -> bool {
        let submitted: HashSet<&str> = submitted.iter().map(|p| p.key.as_str()).collect();
        let saved: HashSet<&str> = self
            .saved_properties
            .iter()
            .map(|p| p.key.as_str())
            .collect();
        let failed: HashSet<&str> = self.failed_keys().collect();

        saved.is_disjoint(&failed)
            && saved.len() + failed.len() == submitted.len()
            && saved.union(&failed).all(|k| submitted.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_wire_format() {
        assert_eq!(
            serde_json::to_string(&Environment::Sandbox).unwrap(),
            "\"sandbox\""
        );
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("production".parse::<Environment>().is_err());
    }

    #[test]
    fn user_decodes_without_identity() {
        let user: User = serde_json::from_str(
            r#"{"id":"QON_1","environment":"prod","created":1700000000}"#,
        )
        .unwrap();
        assert_eq!(user.id.as_str(), "QON_1");
        assert!(user.identity_id.is_none());
        assert_eq!(user.created_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn reserved_property_prefix() {
        assert!(UserProperty::new(reserved::EMAIL, "a@b.c").is_reserved());
        assert!(!UserProperty::new("favourite_color", "teal").is_reserved());
    }

    #[test]
    fn property_write_result_uses_camel_case() {
        let result: PropertyWriteResult = serde_json::from_str(
            r#"{
                "savedProperties": [{"key": "plan", "value": "gold"}],
                "propertyErrors": [{"key": "_q_bogus", "error": "unknown reserved key"}]
            }"#,
        )
        .unwrap();

        assert_eq!(result.saved_properties.len(), 1);
        assert_eq!(result.failed_keys().collect::<Vec<_>>(), vec!["_q_bogus"]);
        assert!(!result.is_complete());
    }

    #[test]
    fn partition_check() {
        let submitted = vec![
            UserProperty::new("plan", "gold"),
            UserProperty::new("_q_bogus", "x"),
        ];

        let ok = PropertyWriteResult {
            saved_properties: vec![UserProperty::new("plan", "gold")],
            property_errors: vec![PropertyError {
                key: "_q_bogus".into(),
                error: "unknown reserved key".into(),
            }],
        };
        assert!(ok.partitions(&submitted));

        let missing = PropertyWriteResult {
            saved_properties: vec![UserProperty::new("plan", "gold")],
            property_errors: vec![],
        };
        assert!(!missing.partitions(&submitted));

        let overlapping = PropertyWriteResult {
            saved_properties: submitted.clone(),
            property_errors: vec![PropertyError {
                key: "plan".into(),
                error: "dup".into(),
            }],
        };
        assert!(!overlapping.partitions(&submitted));
    }
}
