use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    AssertionCredential, AttestationCredential, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions,
};

/// Why the platform authenticator did not produce a credential.
///
/// Cancellation is kept apart from the other outcomes: it is the one step of a
/// ceremony the user can abort.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticatorRejection {
    /// The user dismissed the prompt or the platform timed it out
    #[error("cancelled by the user")]
    Cancelled,

    /// The platform refused the request (`NotAllowedError`, missing permission)
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// No authenticator holds a credential matching the request
    #[error("no matching authenticator")]
    NoMatchingAuthenticator,

    /// Any other platform failure
    #[error("{0}")]
    Other(String),
}

/// The platform credential API (`navigator.credentials` in a browser).
///
/// Both calls may suspend for as long as the platform keeps its prompt open.
/// Implementations must not contact the relying party themselves.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the platform exposes a credential API at all.
    ///
    /// The login form is only offered when this returns `true`.
    fn is_available(&self) -> bool {
        true
    }

    /// Create a new credential (`navigator.credentials.create`).
    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
    ) -> Result<AttestationCredential, AuthenticatorRejection>;

    /// Sign the challenge with an existing credential (`navigator.credentials.get`).
    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
    ) -> Result<AssertionCredential, AuthenticatorRejection>;
}
