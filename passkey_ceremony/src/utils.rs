use base64::{
    Engine as _, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD,
    },
};
use thiserror::Error;

/// Decoder that accepts both the padded and unpadded URL-safe forms.
///
/// Trailing bits must still be canonical, so `encode(decode(t))` always gives
/// back `t` with any padding removed.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_LENIENT
        .decode(input)
        .map_err(|e| UtilError::Format(format!("Failed to decode base64url: {e}")))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilError {
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
