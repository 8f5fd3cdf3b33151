//! Tapedeck - Record and replay HTTP interactions for deterministic tests
//!
//! Outgoing requests are matched against a cassette of recorded
//! interactions. Hits replay the stored response; misses either go to the
//! live transport and get recorded, or fail, depending on the record mode.

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod cassette;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod matchers;
pub mod recording;
pub mod storage;

pub use cassette::{Cassette, Interaction, Placeholder};
pub use config::{CassetteOptions, Config};
pub use error::{Result, TapedeckError, TransportError};
pub use http::{Body, Headers, Request, Response};
pub use matchers::{Matcher, MatcherRegistry};
pub use recording::{Decision, PlaybackStats, RecordMode, Recorder, Transport};
pub use storage::Format;
