//! HTTP method matcher

use crate::http::Request;

use super::Matcher;

/// Matches on the HTTP method, ignoring case
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodMatcher;

impl Matcher for MethodMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        candidate.method.eq_ignore_ascii_case(&recorded.method)
    }
}
