use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::utils::{UtilError, base64url_decode, base64url_encode};

/// The two ceremony variants sharing one state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyKind {
    /// Creating a new passkey ("add passkey")
    Registration,
    /// Proving possession of an existing passkey ("login with passkey")
    Authentication,
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration => write!(f, "registration"),
            Self::Authentication => write!(f, "authentication"),
        }
    }
}

fn public_key_type() -> String {
    "public-key".to_string()
}

/// Credential descriptor as it travels in JSON, with a base64url `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialDescriptorJson {
    #[serde(rename = "type", default = "public_key_type")]
    pub type_: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<BTreeSet<String>>,
}

/// Credential descriptor with its id decoded, ready for the authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDescriptor {
    pub type_: String,
    pub id: Vec<u8>,
    pub transports: Option<BTreeSet<String>>,
}

impl CredentialDescriptorJson {
    fn decode(self) -> Result<CredentialDescriptor, UtilError> {
        Ok(CredentialDescriptor {
            type_: self.type_,
            id: base64url_decode(&self.id)?,
            transports: self.transports,
        })
    }
}

fn decode_descriptors(
    descriptors: Vec<CredentialDescriptorJson>,
) -> Result<Vec<CredentialDescriptor>, UtilError> {
    descriptors
        .into_iter()
        .map(CredentialDescriptorJson::decode)
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntityJson {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i64,
}

/// Registration options returned by `/passkey/add/begin`.
///
/// Mirrors the WebAuthn `PublicKeyCredentialCreationOptions` dictionary with
/// binary members still base64url encoded. Members this crate does not
/// interpret (`extensions`, `hints`, ...) are kept in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptionsJson {
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: UserEntityJson,
    #[serde(default)]
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub exclude_credentials: Vec<CredentialDescriptorJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registration options with every binary member decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredentialCreationOptions {
    pub challenge: Vec<u8>,
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout: Option<u32>,
    pub exclude_credentials: Vec<CredentialDescriptor>,
    pub authenticator_selection: Option<Value>,
    pub attestation: Option<String>,
    pub extra: Map<String, Value>,
}

impl CreationOptionsJson {
    /// Decode the challenge, the user handle and the exclude list.
    pub fn decode(self) -> Result<PublicKeyCredentialCreationOptions, UtilError> {
        Ok(PublicKeyCredentialCreationOptions {
            challenge: base64url_decode(&self.challenge)?,
            rp: self.rp,
            user: UserEntity {
                id: base64url_decode(&self.user.id)?,
                name: self.user.name,
                display_name: self.user.display_name,
            },
            pub_key_cred_params: self.pub_key_cred_params,
            timeout: self.timeout,
            exclude_credentials: decode_descriptors(self.exclude_credentials)?,
            authenticator_selection: self.authenticator_selection,
            attestation: self.attestation,
            extra: self.extra,
        })
    }
}

/// Authentication options returned by `/login/passkey/begin`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptionsJson {
    pub challenge: String,
    #[serde(default)]
    pub allow_credentials: Vec<CredentialDescriptorJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authentication options with the challenge and allow list decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredentialRequestOptions {
    pub challenge: Vec<u8>,
    pub allow_credentials: Vec<CredentialDescriptor>,
    pub timeout: Option<u32>,
    pub rp_id: Option<String>,
    pub user_verification: Option<String>,
    pub extra: Map<String, Value>,
}

impl RequestOptionsJson {
    /// Decode the challenge and every entry of the allow list.
    pub fn decode(self) -> Result<PublicKeyCredentialRequestOptions, UtilError> {
        Ok(PublicKeyCredentialRequestOptions {
            challenge: base64url_decode(&self.challenge)?,
            allow_credentials: decode_descriptors(self.allow_credentials)?,
            timeout: self.timeout,
            rp_id: self.rp_id,
            user_verification: self.user_verification,
            extra: self.extra,
        })
    }
}

/// Attestation response produced by the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorAttestation {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
}

/// A newly created credential, as `navigator.credentials.create()` returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub type_: String,
    pub authenticator_attachment: Option<String>,
    pub response: AuthenticatorAttestation,
}

/// Assertion response produced by the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorAssertion {
    pub authenticator_data: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// A signed assertion, as `navigator.credentials.get()` returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub type_: String,
    pub authenticator_attachment: Option<String>,
    pub response: AuthenticatorAssertion,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponseJson {
    pub attestation_object: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
}

/// Body of `POST /passkey/add/finish`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationFinishRequest {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    pub response: AttestationResponseJson,
}

impl AttestationCredential {
    pub fn into_finish_request(self, name: String) -> RegistrationFinishRequest {
        RegistrationFinishRequest {
            name,
            id: self.id,
            type_: self.type_,
            authenticator_attachment: self.authenticator_attachment,
            response: AttestationResponseJson {
                attestation_object: base64url_encode(&self.response.attestation_object),
                client_data_json: base64url_encode(&self.response.client_data_json),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponseJson {
    pub authenticator_data: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Body of `POST /login/passkey/finish`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationFinishRequest {
    pub identifier: String,
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    pub response: AssertionResponseJson,
}

impl AssertionCredential {
    pub fn into_finish_request(self, identifier: String) -> AuthenticationFinishRequest {
        AuthenticationFinishRequest {
            identifier,
            id: self.id,
            raw_id: base64url_encode(&self.raw_id),
            type_: self.type_,
            authenticator_attachment: self.authenticator_attachment,
            response: AssertionResponseJson {
                authenticator_data: base64url_encode(&self.response.authenticator_data),
                client_data_json: base64url_encode(&self.response.client_data_json),
                signature: base64url_encode(&self.response.signature),
                user_handle: self.response.user_handle.as_deref().map(base64url_encode),
            },
        }
    }
}

/// A registered passkey as the server reports it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Passkey {
    pub id: String,
    pub name: String,
}

/// Finish-registration response; older servers leave out the name.
#[derive(Deserialize, Debug)]
pub(crate) struct RegisteredPasskeyJson {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl RegisteredPasskeyJson {
    pub(crate) fn into_passkey(self, submitted_name: &str) -> Passkey {
        Passkey {
            id: self.id,
            name: self.name.unwrap_or_else(|| submitted_name.to_string()),
        }
    }
}
