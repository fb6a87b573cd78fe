//! passkey_ceremony - Client-side passkey ceremonies for the membership portal
//!
//! This crate drives WebAuthn registration ("add passkey") and authentication
//! ("login with passkey") against the portal's begin/finish endpoints. It
//! transcodes challenge and credential material between base64url and raw
//! bytes, sequences the platform authenticator between the two round trips,
//! and classifies every failure into a small set of user-facing categories.

mod ceremony;
mod config;
mod portal;
mod utils;

pub use ceremony::{
    AssertionCredential, AssertionResponseJson, AttestationCredential, AttestationResponseJson,
    AuthenticationFinishRequest, AuthenticatorAssertion, AuthenticatorAttestation,
    AuthenticatorRejection, CeremonyAttempt, CeremonyConsumer, CeremonyError, CeremonyFailure,
    CeremonyKind, CeremonyOrchestrator, CeremonyOutcome, CeremonyRequest, CeremonyState,
    CreationOptionsJson, CredentialDescriptor, CredentialDescriptorJson, HttpTranscriptClient,
    Passkey, PasskeyDirectory, PlatformAuthenticator, PrefetchedRegistration, PubKeyCredParam,
    PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    RegistrationFinishRequest, RelyingParty, RequestOptionsJson, TranscriptClient, UserEntity,
    UserEntityJson, classify,
};

pub use config::PORTAL_ORIGIN;

pub use portal::{LoginNavigator, PasskeySettings};

pub use utils::UtilError;

/// Encode bytes as unpadded base64url text.
pub fn base64url_encode(input: &[u8]) -> String {
    utils::base64url_encode(input)
}

/// Decode base64url text, padded or not.
///
/// Malformed input yields [`CeremonyError::Validation`].
pub fn base64url_decode(input: &str) -> Result<Vec<u8>, CeremonyError> {
    Ok(utils::base64url_decode(input)?)
}
