//! Recorder tying a cassette to a live transport

use tracing::{debug, info, warn};

use crate::cassette::{Cassette, Interaction};
use crate::config::{CassetteOptions, Config};
use crate::fingerprint::short_fingerprint;
use crate::http::{Request, Response};
use crate::matchers::MatcherRegistry;
use crate::{Result, TapedeckError, TransportError};

use super::Decision;

/// Sends a request to the real network
pub trait Transport {
    /// Perform the request
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying client reports
    fn send(&mut self, request: &Request) -> std::result::Result<Response, TransportError>;
}

impl<F> Transport for F
where
    F: FnMut(&Request) -> std::result::Result<Response, TransportError>,
{
    fn send(&mut self, request: &Request) -> std::result::Result<Response, TransportError> {
        self(request)
    }
}

/// Counts of how requests were served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Served from the cassette
    pub replayed: usize,
    /// Sent live and recorded
    pub recorded: usize,
    /// Rejected with `NoMatchFound`
    pub failed: usize,
}

impl PlaybackStats {
    /// Total requests seen
    pub fn total(&self) -> usize {
        self.replayed + self.recorded + self.failed
    }
}

/// Intercepts requests for one cassette
pub struct Recorder<T: Transport> {
    cassette: Cassette,
    transport: T,
    stats: PlaybackStats,
}

impl<T: Transport> Recorder<T> {
    /// Wrap an already loaded cassette
    pub fn new(cassette: Cassette, transport: T) -> Self {
        Self {
            cassette,
            transport,
            stats: PlaybackStats::default(),
        }
    }

    /// Load `name` with the configuration's default options
    ///
    /// # Errors
    ///
    /// Returns error if the cassette cannot be loaded
    pub fn use_cassette(
        config: &Config,
        name: &str,
        registry: &MatcherRegistry,
        transport: T,
    ) -> Result<Self> {
        Self::use_cassette_with(
            config,
            name,
            config.default_cassette_options.clone(),
            registry,
            transport,
        )
    }

    /// Load `name` with explicit options
    ///
    /// # Errors
    ///
    /// Returns error if the cassette cannot be loaded
    pub fn use_cassette_with(
        config: &Config,
        name: &str,
        options: CassetteOptions,
        registry: &MatcherRegistry,
        transport: T,
    ) -> Result<Self> {
        let cassette = Cassette::load(&config.cassette_library_dir, name, options, registry)?;
        Ok(Self::new(cassette, transport))
    }

    /// Handle one outgoing request
    ///
    /// # Errors
    ///
    /// Returns [`TapedeckError::NoMatchFound`] when nothing matched and the
    /// record mode forbids going live, or [`TapedeckError::Transport`] when
    /// the live request failed
    pub fn send(&mut self, request: Request) -> Result<Response> {
        let had_interactions = self.cassette.loaded_count() > 0;
        let replayed = self
            .cassette
            .find_match(&request)
            .map(Interaction::as_response);

        let decision = self
            .cassette
            .record_mode()
            .decide(replayed.is_some(), had_interactions);

        match (decision, replayed) {
            (Decision::Replay, Some(response)) => {
                self.stats.replayed += 1;
                Ok(response)
            }
            (Decision::Record, _) => {
                let response = self
                    .transport
                    .send(&request)
                    .map_err(TapedeckError::Transport)?;
                self.stats.recorded += 1;
                let returned = response.clone().with_request(request.clone());
                self.cassette.record(request, response);
                Ok(returned)
            }
            (Decision::Replay | Decision::Fail, _) => {
                self.stats.failed += 1;
                let fingerprint = short_fingerprint(&request);
                warn!(
                    "No match in '{}' for {} {} (fingerprint: {}, mode: {})",
                    self.cassette.name(),
                    request.method,
                    request.url,
                    fingerprint,
                    self.cassette.record_mode()
                );
                Err(TapedeckError::NoMatchFound {
                    method: request.method,
                    url: request.url,
                    fingerprint,
                })
            }
        }
    }

    /// The active cassette
    pub fn cassette(&self) -> &Cassette {
        &self.cassette
    }

    /// The active cassette, mutably
    pub fn cassette_mut(&mut self) -> &mut Cassette {
        &mut self.cassette
    }

    /// Request counts so far
    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    /// Save the cassette and hand back the transport
    ///
    /// # Errors
    ///
    /// Returns error if the cassette cannot be saved
    pub fn eject(self) -> Result<T> {
        let Self {
            cassette,
            transport,
            stats,
        } = self;

        debug!(
            "Ejecting '{}': {} replayed, {} recorded, {} failed",
            cassette.name(),
            stats.replayed,
            stats.recorded,
            stats.failed
        );
        let name = cassette.name().to_string();
        cassette.eject()?;
        info!("Ejected cassette '{}'", name);
        Ok(transport)
    }
}
