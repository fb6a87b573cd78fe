use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::errors::{CeremonyError, CeremonyFailure};
use super::types::{
    AuthenticationFinishRequest, CreationOptionsJson, Passkey, RegisteredPasskeyJson,
    RegistrationFinishRequest, RequestOptionsJson,
};
use crate::config::{
    LOGIN_BEGIN_PATH, LOGIN_FINISH_PATH, PASSKEY_LIST_PATH, PASSKEY_REMOVE_PATH,
    PASSKEY_REQUEST_TIMEOUT, PORTAL_ORIGIN, REGISTER_BEGIN_PATH, REGISTER_FINISH_PATH,
};
use crate::utils::UtilError;

/// The begin/finish round trips of both ceremony variants.
///
/// Every call issues exactly one request and never retries.
#[async_trait]
pub trait TranscriptClient: Send + Sync {
    async fn begin_registration(&self) -> Result<CreationOptionsJson, CeremonyError>;

    async fn finish_registration(
        &self,
        request: &RegistrationFinishRequest,
    ) -> Result<Passkey, CeremonyError>;

    async fn begin_authentication(
        &self,
        identifier: &str,
    ) -> Result<RequestOptionsJson, CeremonyError>;

    async fn finish_authentication(
        &self,
        request: &AuthenticationFinishRequest,
    ) -> Result<(), CeremonyError>;
}

/// Listing and removal of the signed-in member's passkeys.
#[async_trait]
pub trait PasskeyDirectory: Send + Sync {
    async fn list_passkeys(&self) -> Result<Vec<Passkey>, CeremonyError>;

    async fn remove_passkey(&self, id: &str) -> Result<(), CeremonyError>;
}

/// [`TranscriptClient`] and [`PasskeyDirectory`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTranscriptClient {
    client: reqwest::Client,
    origin: Url,
}

fn get_client(timeout: Duration) -> Result<reqwest::Client, UtilError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| UtilError::Config(format!("Failed to create reqwest client: {e}")))
}

impl HttpTranscriptClient {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, UtilError> {
        Self::with_client(get_client(timeout)?, origin)
    }

    /// Build a client from `PORTAL_ORIGIN` and `PASSKEY_REQUEST_TIMEOUT`.
    pub fn from_env() -> Result<Self, UtilError> {
        Self::new(
            PORTAL_ORIGIN.as_str(),
            Duration::from_secs(*PASSKEY_REQUEST_TIMEOUT),
        )
    }

    /// Use a caller-provided client, e.g. one carrying a session cookie store.
    pub fn with_client(client: reqwest::Client, origin: &str) -> Result<Self, UtilError> {
        let origin = Url::parse(origin)
            .map_err(|e| UtilError::Config(format!("Invalid portal origin {origin}: {e}")))?;
        if origin.cannot_be_a_base() {
            return Err(UtilError::Config(format!(
                "Portal origin {origin} cannot be a base URL"
            )));
        }
        Ok(Self { client, origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn endpoint(&self, path: &str) -> Result<Url, CeremonyFailure> {
        self.origin
            .join(path)
            .map_err(|e| CeremonyFailure::Unexpected(format!("Invalid endpoint {path}: {e}")))
    }

    /// Send one request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, CeremonyFailure> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} responded with {}", response.url().path(), status);
        let body = response.bytes().await?.to_vec();
        if !status.is_success() {
            return Err(CeremonyFailure::Status { status, body });
        }
        Ok(body)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Vec<u8>, CeremonyFailure> {
        let url = self.endpoint(path)?;
        self.send(self.client.post(url).json(payload)).await
    }
}

/// Parse a begin response, unwrapping a `{"publicKey": ...}` envelope if present.
fn parse_options<T: DeserializeOwned>(body: &[u8]) -> Result<T, CeremonyFailure> {
    let value: Value = serde_json::from_slice(body)?;
    let value = match value {
        Value::Object(mut map) => match map.remove("publicKey") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl TranscriptClient for HttpTranscriptClient {
    async fn begin_registration(&self) -> Result<CreationOptionsJson, CeremonyError> {
        let url = self.endpoint(REGISTER_BEGIN_PATH)?;
        let body = self.send(self.client.post(url)).await?;
        Ok(parse_options(&body)?)
    }

    async fn finish_registration(
        &self,
        request: &RegistrationFinishRequest,
    ) -> Result<Passkey, CeremonyError> {
        let body = self.post_json(REGISTER_FINISH_PATH, request).await?;
        let registered: RegisteredPasskeyJson =
            serde_json::from_slice(&body).map_err(CeremonyFailure::from)?;
        Ok(registered.into_passkey(&request.name))
    }

    async fn begin_authentication(
        &self,
        identifier: &str,
    ) -> Result<RequestOptionsJson, CeremonyError> {
        let url = self.endpoint(LOGIN_BEGIN_PATH)?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(identifier.to_string());
        let body = self.send(request).await?;
        Ok(parse_options(&body)?)
    }

    async fn finish_authentication(
        &self,
        request: &AuthenticationFinishRequest,
    ) -> Result<(), CeremonyError> {
        self.post_json(LOGIN_FINISH_PATH, request).await?;
        Ok(())
    }
}

#[async_trait]
impl PasskeyDirectory for HttpTranscriptClient {
    async fn list_passkeys(&self) -> Result<Vec<Passkey>, CeremonyError> {
        let url = self.endpoint(PASSKEY_LIST_PATH)?;
        let body = self.send(self.client.get(url)).await?;
        let passkeys: Vec<Passkey> =
            serde_json::from_slice(&body).map_err(CeremonyFailure::from)?;
        Ok(passkeys)
    }

    async fn remove_passkey(&self, id: &str) -> Result<(), CeremonyError> {
        self.post_json(PASSKEY_REMOVE_PATH, id).await?;
        Ok(())
    }
}
