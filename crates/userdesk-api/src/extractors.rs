//! # Request Body Extraction
//!
//! Bodies are taken as raw bytes and decoded only after the path and the
//! caller have been checked, so a missing or malformed body can never mask
//! an authorization failure.

use serde::de::DeserializeOwned;

/// Decode a JSON body, falling back to `T::default()` when the body is
/// empty, not JSON, or of the wrong shape. The content type is not checked.
pub fn json_or_default<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring undecodable request body");
            T::default()
        }
    }
}
