//! Digest-auth matcher ignoring per-request nonces

use std::collections::BTreeMap;

use crate::http::Request;

use super::Matcher;

/// Digest parameters that change on every request
const VOLATILE_PARAMS: [&str; 3] = ["nonce", "cnonce", "response"];

/// Matches on the parameters of an `Authorization: Digest` header
///
/// The server nonce, the client nonce and the response hash are derived
/// from per-request randomness and are ignored. Requests without the
/// header on both sides match.
#[derive(Debug, Clone, Default)]
pub struct DigestAuthMatcher;

impl Matcher for DigestAuthMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        digest_params(candidate) == digest_params(recorded)
    }
}

fn digest_params(request: &Request) -> Option<BTreeMap<String, String>> {
    let header = request.headers.get("Authorization")?.trim();
    let (scheme, rest) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("digest") {
        return None;
    }

    Some(
        parse_params(rest)
            .into_iter()
            .filter(|(key, _)| !VOLATILE_PARAMS.contains(&key.as_str()))
            .collect(),
    )
}

/// Parse `key=value, key="quoted, value"` lists.
///
/// Keys are lowercased. Commas inside quotes do not split.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        let Some((key, after_key)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim().trim_start_matches(',').trim().to_ascii_lowercase();
        let after_key = after_key.trim_start();

        let (value, remainder) = if let Some(quoted) = after_key.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            match after_key.find(',') {
                Some(end) => (after_key[..end].trim(), &after_key[end..]),
                None => (after_key.trim(), ""),
            }
        };

        params.push((key, value.to_string()));
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }

    params
}
