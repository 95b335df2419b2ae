//! Credential handles.
//!
//! Qonversion issues two keys per project. They are modeled as distinct types so the
//! key guarding an operation is fixed at compile time.

use secrecy::{ExposeSecret, SecretString};

mod sealed {
    pub trait Sealed {}
}

/// Which of the two project keys a credential is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Lower-privilege project key.
    Project,
    /// High-privilege secret key.
    Secret,
}

impl CredentialKind {
    /// Name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Secret => "secret",
        }
    }
}

/// A bearer credential accepted by the Qonversion API.
///
/// Sealed: only [`ProjectKey`] and [`SecretKey`] implement it.
pub trait Credential: sealed::Sealed {
    /// Which key this is.
    const KIND: CredentialKind;

    /// The raw bearer token.
    fn bearer(&self) -> &str;
}

/// Project key, used for reads and user/identity management.
#[derive(Debug, Clone)]
pub struct ProjectKey(SecretString);

impl ProjectKey {
    /// Wrap a project key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }
}

impl sealed::Sealed for ProjectKey {}

impl Credential for ProjectKey {
    const KIND: CredentialKind = CredentialKind::Project;

    fn bearer(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Secret key, used for operations that change billing or entitlement state.
///
/// Must only be held by a fully trusted backend.
#[derive(Debug, Clone)]
pub struct SecretKey(SecretString);

impl SecretKey {
    /// Wrap a secret key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }
}

impl sealed::Sealed for SecretKey {}

impl Credential for SecretKey {
    const KIND: CredentialKind = CredentialKind::Secret;

    fn bearer(&self) -> &str {
        self.0.expose_secret()
    }
}
