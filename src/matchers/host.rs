//! Host and port matcher

use crate::http::Request;

use super::uri::parse_url;
use super::Matcher;

/// Matches on host and effective port
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMatcher;

impl Matcher for HostMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        match (parse_url(&candidate.url), parse_url(&recorded.url)) {
            (Some(a), Some(b)) => {
                a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
            }
            _ => false,
        }
    }
}
