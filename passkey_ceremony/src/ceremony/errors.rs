use http::StatusCode;
use thiserror::Error;

use super::authenticator::AuthenticatorRejection;
use super::types::CeremonyKind;
use crate::utils::UtilError;

/// Message shown when a failure does not fit any known category.
pub(super) const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

const AUTHENTICATION_DENIED_MESSAGE: &str = "Request denied or canceled";
const REGISTRATION_DENIED_MESSAGE: &str = "Missing permission or request was cancelled";

/// User-facing outcome of a failed passkey ceremony.
///
/// Every failure raised while a ceremony runs ends up as exactly one of these
/// categories. The carried string is the human-readable message that gets
/// appended to the widget's error list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CeremonyError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response or an encoded value did not have the expected structure
    #[error("Validation error: {0}")]
    Validation(String),

    /// The platform authenticator refused or the user cancelled
    #[error("Authenticator denied: {0}")]
    AuthenticatorDenied(String),

    /// The server answered with a non-success status; the message is its body
    #[error("Server rejected: {0}")]
    ServerRejected(String),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

impl CeremonyError {
    /// The message to display to the user, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg)
            | Self::Validation(msg)
            | Self::AuthenticatorDenied(msg)
            | Self::ServerRejected(msg)
            | Self::Unknown(msg) => msg,
        }
    }

    /// Log the error and return self
    ///
    /// This method logs the error with appropriate context and returns self,
    /// allowing for method chaining and explicit logging when needed.
    pub fn log(self) -> Self {
        match &self {
            Self::Transport(msg) => tracing::error!("Transport error: {}", msg),
            Self::Validation(msg) => tracing::error!("Validation error: {}", msg),
            Self::AuthenticatorDenied(msg) => tracing::error!("Authenticator denied: {}", msg),
            Self::ServerRejected(msg) => tracing::error!("Server rejected: {}", msg),
            Self::Unknown(msg) => tracing::error!("Unknown error: {}", msg),
        }
        self
    }
}

/// A failure as it was raised, before classification.
///
/// Transport code and the orchestrator produce these; [`classify`] turns them
/// into the [`CeremonyError`] the user sees.
#[derive(Debug, Error)]
pub enum CeremonyFailure {
    /// No response reached the client
    #[error("No response: {0}")]
    NoResponse(String),

    /// The server responded with a non-success status
    #[error("Unexpected status {status}")]
    Status { status: StatusCode, body: Vec<u8> },

    /// The response body or an encoded field did not match the expected schema
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// The platform authenticator rejected the request
    #[error("Authenticator rejected {kind} ceremony: {rejection}")]
    Authenticator {
        kind: CeremonyKind,
        rejection: AuthenticatorRejection,
    },

    /// A failure of unexpected shape
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for CeremonyFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Schema(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Self::NoResponse(err.to_string())
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CeremonyFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

impl From<UtilError> for CeremonyFailure {
    fn from(err: UtilError) -> Self {
        match err {
            UtilError::Format(msg) => Self::Schema(msg),
            UtilError::Config(msg) => Self::Unexpected(msg),
        }
    }
}

/// Map a raised failure to the user-facing error category.
///
/// Unexpected failures never leak their text to the user; it is only logged.
/// A non-success response with an empty body reports its status line (e.g.
/// `401 Unauthorized`) instead of the verbatim, empty body.
pub fn classify(failure: CeremonyFailure) -> CeremonyError {
    match failure {
        CeremonyFailure::NoResponse(msg) => CeremonyError::Transport(msg),
        CeremonyFailure::Schema(msg) => CeremonyError::Validation(msg),
        CeremonyFailure::Authenticator { kind, rejection } => {
            tracing::warn!("Authenticator rejected {} ceremony: {}", kind, rejection);
            let message = match kind {
                CeremonyKind::Registration => REGISTRATION_DENIED_MESSAGE,
                CeremonyKind::Authentication => AUTHENTICATION_DENIED_MESSAGE,
            };
            CeremonyError::AuthenticatorDenied(message.to_string())
        }
        CeremonyFailure::Status { status, body } => match String::from_utf8(body) {
            Ok(text) if text.is_empty() => CeremonyError::ServerRejected(status.to_string()),
            Ok(text) => CeremonyError::ServerRejected(text),
            Err(_) => {
                tracing::debug!("Non-textual error body with status {}", status);
                CeremonyError::Unknown(UNKNOWN_ERROR_MESSAGE.to_string())
            }
        },
        CeremonyFailure::Unexpected(msg) => {
            tracing::debug!("Unexpected ceremony failure: {}", msg);
            CeremonyError::Unknown(UNKNOWN_ERROR_MESSAGE.to_string())
        }
    }
}

impl From<CeremonyFailure> for CeremonyError {
    fn from(failure: CeremonyFailure) -> Self {
        classify(failure)
    }
}

impl From<UtilError> for CeremonyError {
    fn from(err: UtilError) -> Self {
        classify(err.into())
    }
}
