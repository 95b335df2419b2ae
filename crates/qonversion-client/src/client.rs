//! Qonversion HTTP client implementation.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use qonversion_core::{
    CreateUser, EntitlementId, EntitlementList, Environment, Identity, IdentityId,
    PropertyWriteResult, Purchase, User, UserId, UserProperty,
};

use crate::config::ClientConfig;
use crate::credentials::{Credential, ProjectKey, SecretKey};
use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, CreateIdentityRequest, CreateUserRequest, GrantEntitlementRequest,
};

/// Versioned Qonversion API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.qonversion.io/v3";

const JSON: &str = "application/json";

/// Placeholder body for requests that send none.
const NO_BODY: Option<&()> = None;

/// Qonversion API client.
///
/// Holds no per-call state; clones share the underlying connection pool and can be
/// used concurrently.
#[derive(Debug, Clone)]
pub struct QonversionClient {
    client: Client,
    base_url: String,
    project_key: ProjectKey,
    secret_key: SecretKey,
}

impl QonversionClient {
    /// Create a new client against the production API.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(project_key: ProjectKey, secret_key: SecretKey) -> Result<Self, ClientError> {
        Self::with_options(project_key, secret_key, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        project_key: ProjectKey,
        secret_key: SecretKey,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(options.user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            project_key,
            secret_key,
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let options = config.options();
        Self::with_options(config.project_key, config.secret_key, options)
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Get a user by Qonversion user id.
    ///
    /// `GET /users/{user_id}` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_user(&self, user_id: &UserId) -> Result<User, ClientError> {
        let path = format!("/users/{}", segment(&Method::GET, user_id.as_str())?);
        self.call(Method::GET, &path, &self.project_key, NO_BODY).await
    }

    /// Create a user with a caller-chosen id.
    ///
    /// `POST /users/{user_id}` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_user(
        &self,
        user_id: &UserId,
        environment: Environment,
    ) -> Result<CreateUser, ClientError> {
        let path = format!("/users/{}", segment(&Method::POST, user_id.as_str())?);
        let body = CreateUserRequest { environment };
        self.call(Method::POST, &path, &self.project_key, Some(&body))
            .await
    }

    /// Get all properties set on a user.
    ///
    /// `GET /users/{user_id}/properties` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_user_properties(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserProperty>, ClientError> {
        let path = format!("/users/{}/properties", segment(&Method::GET, user_id.as_str())?);
        self.call(Method::GET, &path, &self.project_key, NO_BODY).await
    }

    /// Set properties on a user.
    ///
    /// Properties are saved independently; rejected ones are reported in
    /// [`PropertyWriteResult::property_errors`] rather than as an error.
    ///
    /// `POST /users/{user_id}/properties` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn set_user_properties(
        &self,
        user_id: &UserId,
        properties: &[UserProperty],
    ) -> Result<PropertyWriteResult, ClientError> {
        let path = format!("/users/{}/properties", segment(&Method::POST, user_id.as_str())?);
        self.call(Method::POST, &path, &self.project_key, Some(properties))
            .await
    }

    // ------------------------------------------------------------------------
    // Identities
    // ------------------------------------------------------------------------

    /// Get the user an identity points to.
    ///
    /// `GET /identities/{identity_id}` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_identity(&self, identity_id: &IdentityId) -> Result<Identity, ClientError> {
        let path = format!("/identities/{}", segment(&Method::GET, identity_id.as_str())?);
        self.call(Method::GET, &path, &self.project_key, NO_BODY).await
    }

    /// Link a partner identity to a user.
    ///
    /// `POST /identities/{identity_id}` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_identity(
        &self,
        identity_id: &IdentityId,
        user_id: &UserId,
    ) -> Result<Identity, ClientError> {
        let path = format!("/identities/{}", segment(&Method::POST, identity_id.as_str())?);
        let body = CreateIdentityRequest { user_id };
        self.call(Method::POST, &path, &self.project_key, Some(&body))
            .await
    }

    // ------------------------------------------------------------------------
    // Entitlements
    // ------------------------------------------------------------------------

    /// List a user's entitlements.
    ///
    /// `GET /users/{user_id}/entitlements` with the project key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_entitlements(&self, user_id: &UserId) -> Result<EntitlementList, ClientError> {
        let path = format!("/users/{}/entitlements", segment(&Method::GET, user_id.as_str())?);
        self.call(Method::GET, &path, &self.project_key, NO_BODY).await
    }

    /// Grant an entitlement until `expires` (seconds since the Unix epoch).
    ///
    /// `POST /users/{user_id}/entitlements` with the secret key. Any response body is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn grant_entitlement(
        &self,
        user_id: &UserId,
        entitlement_id: &EntitlementId,
        expires: i64,
    ) -> Result<(), ClientError> {
        let path = format!("/users/{}/entitlements", segment(&Method::POST, user_id.as_str())?);
        let body = GrantEntitlementRequest {
            id: entitlement_id,
            expires,
        };
        self.exchange(&Method::POST, &path, &self.secret_key, Some(&body))
            .await
            .map(drop)
    }

    /// Revoke an entitlement from a user.
    ///
    /// `DELETE /users/{user_id}/entitlements/{entitlement_id}` with the secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn revoke_entitlement(
        &self,
        user_id: &UserId,
        entitlement_id: &EntitlementId,
    ) -> Result<(), ClientError> {
        let path = format!(
            "/users/{}/entitlements/{}",
            segment(&Method::DELETE, user_id.as_str())?,
            segment(&Method::DELETE, entitlement_id.as_str())?
        );
        self.exchange(&Method::DELETE, &path, &self.secret_key, NO_BODY)
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------------
    // Purchases
    // ------------------------------------------------------------------------

    /// Record a purchase for a user.
    ///
    /// `POST /users/{user_id}/purchases` with the secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_purchase(
        &self,
        user_id: &UserId,
        purchase: &Purchase,
    ) -> Result<(), ClientError> {
        let path = format!("/users/{}/purchases", segment(&Method::POST, user_id.as_str())?);
        self.exchange(&Method::POST, &path, &self.secret_key, Some(purchase))
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Send a request and decode a 2xx body as `T`.
    async fn call<T, C, B>(
        &self,
        method: Method,
        path: &str,
        credential: &C,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        C: Credential,
        B: Serialize + ?Sized,
    {
        let text = self.exchange(&method, path, credential, body).await?;
        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            method,
            path: path.to_string(),
            source,
        })
    }

    /// Send exactly one request and return the body of a 2xx response.
    async fn exchange<C, B>(
        &self,
        method: &Method,
        path: &str,
        credential: &C,
        body: Option<&B>,
    ) -> Result<String, ClientError>
    where
        C: Credential,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(
            method = %method,
            path = %path,
            credential = C::KIND.as_str(),
            "Sending Qonversion request"
        );

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .bearer_auth(credential.bearer());
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source| ClientError::Transport {
            method: method.clone(),
            path: path.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if status.is_success() {
            return Ok(text);
        }

        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "Qonversion API returned an error"
        );

        Err(ClientError::Api {
            method: method.clone(),
            path: path.to_string(),
            status: status.as_u16(),
            message: ApiErrorResponse::message_from(&text),
            body: text,
        })
    }
}

/// Percent-encode a caller-supplied id for use as one path segment.
///
/// `.` and `..` are rejected: URL parsing would resolve them as dot-segments and
/// send the request to a different endpoint, encoded or not.
fn segment<'a>(method: &Method, id: &'a str) -> Result<Cow<'a, str>, ClientError> {
    if id == "." || id == ".." {
        return Err(ClientError::InvalidPathSegment {
            method: method.clone(),
            segment: id.to_string(),
        });
    }
    Ok(urlencoding::encode(id))
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API origin including the version prefix (default: [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Per-request timeout. `None` (the default) leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: concat!("qonversion-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (ProjectKey, SecretKey) {
        (ProjectKey::new("pk-test"), SecretKey::new("sk-test"))
    }

    #[test]
    fn client_creation() {
        let (project, secret) = keys();
        let client = QonversionClient::new(project, secret).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let (project, secret) = keys();
        let options = ClientOptions::default().with_base_url("http://localhost:8080/v3/");
        let client = QonversionClient::with_options(project, secret, options).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v3");
    }

    #[test]
    fn client_debug_hides_keys() {
        let (project, secret) = keys();
        let client = QonversionClient::new(project, secret).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("pk-test"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn options_default_has_no_timeout() {
        let options = ClientOptions::default();
        assert!(options.timeout.is_none());
        assert!(options.user_agent.starts_with("qonversion-client/"));

        let options = options.with_timeout(Duration::from_secs(5));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(segment(&Method::GET, "QON_abc").unwrap(), "QON_abc");
        assert_eq!(segment(&Method::GET, "a b/c?d").unwrap(), "a%20b%2Fc%3Fd");
        assert_eq!(segment(&Method::GET, "...").unwrap(), "...");
        assert_eq!(segment(&Method::GET, ".hidden").unwrap(), ".hidden");
    }

    #[test]
    fn dot_segments_are_rejected() {
        for id in [".", ".."] {
            let err = segment(&Method::DELETE, id).unwrap_err();
            assert!(matches!(
                err,
                ClientError::InvalidPathSegment { ref method, segment: ref rejected }
                    if *method == Method::DELETE && rejected == id
            ));
        }
    }
}
