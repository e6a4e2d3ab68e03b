//! `data:<mime>;base64,<payload>` handling for binary payloads in JSON bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_MP4: &str = "video/mp4";

/// Split a data URL into its declared media type and base64 payload.
///
/// Everything after the first comma is the payload. Input without a comma is
/// taken to be bare base64 with no declared type.
pub fn split_data_url(input: &str) -> (Option<&str>, &str) {
    match input.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .strip_prefix("data:")
                .map(|rest| rest.split(';').next().unwrap_or(""))
                .filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, input),
    }
}

/// Strip the data-URL prefix and decode the payload.
pub fn decode_data_url(input: &str) -> Result<Vec<u8>, CoreError> {
    let (_, payload) = split_data_url(input);
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(CoreError::Validation("file payload is empty".into()));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| CoreError::Validation(format!("file is not valid base64: {e}")))
}

/// Encode bytes as `data:{mime};base64,...`.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
