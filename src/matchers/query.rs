//! Order-insensitive query matcher

use url::Url;

use crate::http::Request;

use super::uri::parse_url;
use super::Matcher;

/// Matches on decoded query pairs, ignoring their order
///
/// Repeated keys count: `a=1&a=1` differs from `a=1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryMatcher;

impl Matcher for QueryMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        match (parse_url(&candidate.url), parse_url(&recorded.url)) {
            (Some(a), Some(b)) => query_pairs(&a) == query_pairs(&b),
            _ => false,
        }
    }
}

/// Decoded query pairs, sorted
pub(super) fn query_pairs(url: &Url) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.sort();
    pairs
}
