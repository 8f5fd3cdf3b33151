//! URL path matcher

use crate::http::Request;

use super::uri::parse_url;
use super::Matcher;

/// Matches on the URL path only
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMatcher;

impl Matcher for PathMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        match (parse_url(&candidate.url), parse_url(&recorded.url)) {
            (Some(a), Some(b)) => a.path() == b.path(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        let candidate = Request::get("http://example.com/api/items?page=2");
        assert!(PathMatcher.matches(&candidate, &Request::get("https://other.example/api/items")));
        assert!(!PathMatcher.matches(&candidate, &Request::get("http://example.com/api/other")));
        assert!(!PathMatcher.matches(&candidate, &Request::get("not a url")));
    }
}
