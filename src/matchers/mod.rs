//! Named, pluggable request matchers
//!
//! A cassette refers to matchers by name. Names resolve against an
//! explicit [`MatcherRegistry`] that is built once and shared by every
//! cassette, so tests can swap in custom matchers without global state.

mod body;
mod digest_auth;
mod headers;
mod host;
mod method;
mod path;
mod query;
mod uri;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::http::Request;
use crate::{Result, TapedeckError};

pub use body::BodyMatcher;
pub use digest_auth::DigestAuthMatcher;
pub use headers::HeadersMatcher;
pub use host::HostMatcher;
pub use method::MethodMatcher;
pub use path::PathMatcher;
pub use query::QueryMatcher;
pub use uri::UriMatcher;

/// Matchers applied when a cassette does not configure any
pub const DEFAULT_MATCHERS: [&str; 2] = ["method", "uri"];

/// Predicate comparing a candidate request with a recorded one
pub trait Matcher: Send + Sync {
    /// Whether `candidate` corresponds to `recorded`
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Request, &Request) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        self(candidate, recorded)
    }
}

/// Matchers resolved for one cassette, in configured order
#[derive(Clone)]
pub struct MatcherSet {
    matchers: Vec<(String, Arc<dyn Matcher>)>,
}

impl MatcherSet {
    /// Whether every matcher accepts the pair.
    ///
    /// Stops at the first matcher that rejects.
    pub fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        self.matchers.iter().all(|(name, matcher)| {
            let matched = matcher.matches(candidate, recorded);
            if !matched {
                debug!("Matcher '{}' rejected {} {}", name, recorded.method, recorded.url);
            }
            matched
        })
    }

    /// Matcher names, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matchers.iter().map(|(name, _)| name.as_str())
    }

    /// Number of matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl fmt::Debug for MatcherSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Registry of matchers keyed by name
pub struct MatcherRegistry {
    matchers: DashMap<String, Arc<dyn Matcher>>,
}

static_assertions::assert_impl_all!(MatcherRegistry: Send, Sync);

impl MatcherRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: DashMap::new(),
        }
    }

    /// Create a registry holding the built-in matchers
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("method", MethodMatcher);
        registry.register("uri", UriMatcher);
        registry.register("host", HostMatcher);
        registry.register("path", PathMatcher);
        registry.register("query", QueryMatcher);
        registry.register("headers", HeadersMatcher::exact());
        registry.register("body", BodyMatcher);
        registry.register("digest-auth", DigestAuthMatcher::default());
        registry
    }

    /// Register a matcher, replacing any existing one with the same name
    pub fn register(&self, name: impl Into<String>, matcher: impl Matcher + 'static) {
        let name = name.into();
        if self.matchers.insert(name.clone(), Arc::new(matcher)).is_some() {
            debug!("Replaced matcher '{}'", name);
        }
    }

    /// Whether a matcher is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .matchers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Resolve names into a [`MatcherSet`], keeping their order
    ///
    /// # Errors
    ///
    /// Returns [`TapedeckError::UnknownMatcher`] for the first name that is
    /// not registered
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<MatcherSet> {
        let matchers = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.matchers
                    .get(name)
                    .map(|entry| (name.to_string(), Arc::clone(entry.value())))
                    .ok_or_else(|| TapedeckError::UnknownMatcher(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MatcherSet { matchers })
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = MatcherRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["body", "digest-auth", "headers", "host", "method", "path", "query", "uri"]
        );
        assert!(MatcherRegistry::new().names().is_empty());
    }

    #[test]
    fn test_resolve_preserves_order() {
        let registry = MatcherRegistry::with_builtins();
        let set = registry.resolve(&["uri", "method", "body"]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["uri", "method", "body"]);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = MatcherRegistry::with_builtins();
        let err = registry.resolve(&["method", "nope"]).unwrap_err();
        assert!(matches!(err, TapedeckError::UnknownMatcher(name) if name == "nope"));
    }

    #[test]
    fn test_register_overwrites() {
        let registry = MatcherRegistry::with_builtins();
        registry.register("method", |_: &Request, _: &Request| true);

        let set = registry.resolve(&["method"]).unwrap();
        let get = Request::get("http://example.com/");
        let post = Request::new("POST", "http://example.com/");
        assert!(set.matches(&get, &post));
    }

    #[test]
    fn test_conjunction() {
        let registry = MatcherRegistry::with_builtins();
        let set = registry.resolve(&DEFAULT_MATCHERS).unwrap();

        let candidate = Request::get("http://example.com/");
        assert!(set.matches(&candidate, &Request::get("http://example.com/")));
        assert!(!set.matches(&candidate, &Request::new("POST", "http://example.com/")));
        assert!(!set.matches(&candidate, &Request::get("http://example.org/")));
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let registry = MatcherRegistry::new();
        let set = registry.resolve::<&str>(&[]).unwrap();
        assert!(set.is_empty());
        assert!(set.matches(
            &Request::get("http://a.example/"),
            &Request::new("DELETE", "http://b.example/")
        ));
    }
}
