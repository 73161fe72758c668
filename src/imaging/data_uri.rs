//! `data:` URI helpers.
//!
//! Remote downloads and the inline backend carry images as self-describing
//! `data:<mime>;base64,<payload>` strings instead of files.

use super::backend::BackendError;
use base64::{Engine as _, engine::general_purpose::STANDARD};

const BASE64_MARKER: &str = ";base64,";

/// Build a `data:` URI from raw bytes.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime}{BASE64_MARKER}{}", STANDARD.encode(bytes))
}

/// Split a base64 `data:` URI into its MIME type and decoded bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), BackendError> {
    let (mime, payload) = split(uri)
        .ok_or_else(|| BackendError::ProcessingFailed("Not a base64 data URI".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| BackendError::ProcessingFailed(format!("Invalid data URI payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Decoded size in bytes of a base64 `data:` URI, computed from the payload
/// length without decoding it. `None` if `uri` is not a well-formed base64
/// data URI.
pub fn decoded_size(uri: &str) -> Option<u64> {
    let (_, payload) = split(uri)?;
    let len = payload.len();
    if len % 4 != 0 {
        return None;
    }
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    if padding > 2 {
        return None;
    }
    Some((len / 4 * 3 - padding) as u64)
}

fn split(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let idx = rest.find(BASE64_MARKER)?;
    Some((&rest[..idx], &rest[idx + BASE64_MARKER.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_preserves_bytes_and_mime() {
        let uri = encode("image/png", &[1, 2, 3, 4, 5]);
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn decoded_size_accounts_for_padding() {
        for n in 0..10usize {
            let bytes = vec![0xAB; n];
            let uri = encode("image/jpeg", &bytes);
            assert_eq!(decoded_size(&uri), Some(n as u64), "n = {n}");
        }
    }

    #[test]
    fn decoded_size_rejects_malformed_uris() {
        assert_eq!(decoded_size("/tmp/photo.jpg"), None);
        assert_eq!(decoded_size("data:image/jpeg,rawtext"), None);
        assert_eq!(decoded_size("data:image/jpeg;base64,abc"), None);
    }

    #[test]
    fn decode_rejects_plain_paths() {
        assert!(decode("/tmp/photo.jpg").is_err());
        assert!(decode("data:image/jpeg;base64,@@@@").is_err());
    }
}
