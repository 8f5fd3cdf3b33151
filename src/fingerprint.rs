//! Request fingerprinting for diagnostics
//!
//! A fingerprint names a request in logs and error messages. It is never
//! used as a match key; matching is done by the configured matchers.

use sha2::{Digest, Sha256};

use crate::http::Request;

/// Number of leading digest bytes shown in short fingerprints
pub const SHORT_LEN: usize = 8;

/// Compute the SHA-256 fingerprint of a request
///
/// The fingerprint covers:
/// 1. Method (uppercase normalized)
/// 2. URL
/// 3. Headers (sorted, names lowercased, values trimmed)
/// 4. Body presence and bytes
#[must_use]
pub fn fingerprint_request(request: &Request) -> [u8; 32] {
    let mut hasher = Sha256::new();

    // 1. Method (uppercase normalized)
    let method = request.method.to_uppercase();
    hasher.update((method.len() as u64).to_le_bytes());
    hasher.update(method.as_bytes());

    // 2. URL
    hasher.update((request.url.len() as u64).to_le_bytes());
    hasher.update(request.url.as_bytes());

    // 3. Headers (sorted, normalized)
    let mut headers: Vec<(String, &str)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim()))
        .collect();
    headers.sort();
    for (name, value) in &headers {
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }

    // 4. Body, with absence distinct from empty
    match &request.body {
        Some(body) => {
            hasher.update([1u8]);
            hasher.update((body.len() as u64).to_le_bytes());
            hasher.update(body.as_bytes());
        }
        None => hasher.update([0u8]),
    }

    hasher.finalize().into()
}

/// Hex encoding of the first [`SHORT_LEN`] fingerprint bytes
#[must_use]
pub fn short_fingerprint(request: &Request) -> String {
    hex::encode(&fingerprint_request(request)[..SHORT_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_request() -> Request {
        Request::get("http://example.com/api/test")
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let request = test_request();
        let hash1 = fingerprint_request(&request);
        let hash2 = fingerprint_request(&request);

        assert_eq!(hash1, hash2, "Fingerprint must be deterministic");
    }

    #[test]
    fn test_fingerprint_different_methods() {
        let req1 = test_request();
        let mut req2 = test_request();
        req2.method = "POST".to_string();

        assert_ne!(
            fingerprint_request(&req1),
            fingerprint_request(&req2),
            "Different methods should produce different hashes"
        );
    }

    #[test]
    fn test_header_order_and_case_independence() {
        let req1 = test_request()
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json");
        let req2 = test_request()
            .with_header("accept", "application/json")
            .with_header("content-type", "application/json");

        assert_eq!(fingerprint_request(&req1), fingerprint_request(&req2));
    }

    #[test]
    fn test_absent_body_differs_from_empty() {
        let req1 = test_request();
        let req2 = test_request().with_body("");

        assert_ne!(fingerprint_request(&req1), fingerprint_request(&req2));
    }

    #[test]
    fn test_short_fingerprint_length() {
        assert_eq!(short_fingerprint(&test_request()).len(), SHORT_LEN * 2);
    }
}
