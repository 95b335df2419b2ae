//! Request bodies and API error payloads.

use serde::{Deserialize, Serialize};

use qonversion_core::{EntitlementId, Environment, UserId};

/// Body of `POST /users/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateUserRequest {
    pub environment: Environment,
}

/// Body of `POST /identities/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateIdentityRequest<'a> {
    pub user_id: &'a UserId,
}

/// Body of `POST /users/{id}/entitlements`.
#[derive(Debug, Serialize)]
pub(crate) struct GrantEntitlementRequest<'a> {
    pub id: &'a EntitlementId,
    pub expires: i64,
}

/// Error body returned by the API.
///
/// Both a flat `{"message": ...}` and a nested `{"error": {"message": ...}}` shape
/// are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiErrorResponse {
    Flat { message: String },
    Nested { error: ApiErrorBody },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

impl ApiErrorResponse {
    /// Extract the message from a raw error body, if it has one.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        match serde_json::from_str::<Self>(body).ok()? {
            Self::Flat { message } | Self::Nested { error: ApiErrorBody { message } } => {
                Some(message)
            }
        }
    }
}
