//! Whole-URI matcher

use url::Url;

use crate::http::Request;

use super::query::query_pairs;
use super::Matcher;

/// Matches on scheme, host, port, path and query as one unit
///
/// The query compares as an unordered set of pairs. URLs that fail to
/// parse fall back to exact string comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriMatcher;

impl Matcher for UriMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        match (parse_url(&candidate.url), parse_url(&recorded.url)) {
            (Some(a), Some(b)) => {
                a.scheme() == b.scheme()
                    && a.host_str() == b.host_str()
                    && a.port_or_known_default() == b.port_or_known_default()
                    && a.path() == b.path()
                    && query_pairs(&a) == query_pairs(&b)
            }
            _ => candidate.url == recorded.url,
        }
    }
}

pub(super) fn parse_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok()
}
