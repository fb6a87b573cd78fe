mod authenticator;
mod consumer;
mod errors;
mod orchestrator;
mod transcript;
mod types;


pub use authenticator::{AuthenticatorRejection, PlatformAuthenticator};
pub use consumer::{CeremonyConsumer, CeremonyOutcome};
pub use errors::{CeremonyError, CeremonyFailure, classify};
pub use orchestrator::{
    CeremonyAttempt, CeremonyOrchestrator, CeremonyRequest, CeremonyState, PrefetchedRegistration,
};
pub use transcript::{HttpTranscriptClient, PasskeyDirectory, TranscriptClient};
pub use types::{
    AssertionCredential, AssertionResponseJson, AttestationCredential, AttestationResponseJson,
    AuthenticationFinishRequest, AuthenticatorAssertion, AuthenticatorAttestation, CeremonyKind,
    CreationOptionsJson, CredentialDescriptor, CredentialDescriptorJson, Passkey, PubKeyCredParam,
    PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    RegistrationFinishRequest, RelyingParty, RequestOptionsJson, UserEntity, UserEntityJson,
};
