//! Header matchers, exact or subset

use crate::http::Request;

use super::Matcher;

/// Matches on request headers, ignoring name case
#[derive(Debug, Clone, Copy)]
pub struct HeadersMatcher {
    subset: bool,
}

impl HeadersMatcher {
    /// Both header maps must be equal
    #[must_use]
    pub const fn exact() -> Self {
        Self { subset: false }
    }

    /// Every recorded header must appear in the candidate with the same
    /// values; extra candidate headers are ignored
    #[must_use]
    pub const fn subset() -> Self {
        Self { subset: true }
    }
}

impl Default for HeadersMatcher {
    fn default() -> Self {
        Self::exact()
    }
}

impl Matcher for HeadersMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        if !self.subset {
            return candidate.headers == recorded.headers;
        }

        recorded.headers.iter().all(|(name, _)| {
            candidate
                .headers
                .get_all(name)
                .eq(recorded.headers.get_all(name))
        })
    }
}
