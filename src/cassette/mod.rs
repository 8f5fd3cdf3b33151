//! Cassettes: named, persisted collections of recorded interactions

mod interaction;
mod placeholder;

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::CassetteOptions;
use crate::fingerprint::short_fingerprint;
use crate::http::{Request, Response};
use crate::matchers::{MatcherRegistry, MatcherSet};
use crate::recording::RecordMode;
use crate::storage::{read_document, write_document, CassetteDocument, Format, RECORDED_WITH};
use crate::{Result, TapedeckError};

pub use interaction::Interaction;
pub use placeholder::Placeholder;

/// An ordered collection of interactions backed by one file
///
/// Not meant for concurrent use: run one cassette per test context.
#[derive(Debug)]
pub struct Cassette {
    name: String,
    path: PathBuf,
    options: CassetteOptions,
    record_mode: RecordMode,
    matchers: MatcherSet,
    interactions: Vec<Interaction>,
    loaded_count: usize,
    dirty: bool,
}

impl Cassette {
    /// Load the cassette `name` from `library_dir`
    ///
    /// A missing file yields an empty cassette, unless the mode is
    /// [`RecordMode::None`]. If `re_record_interval` is set and a stored
    /// interaction is older than it, the cassette runs as
    /// [`RecordMode::All`]. A [`RecordMode::None`] cassette never switches.
    ///
    /// # Errors
    ///
    /// Returns error if the name or options are invalid, a matcher is not
    /// registered, the file cannot be read or decoded, or the file is
    /// missing under [`RecordMode::None`]
    pub fn load(
        library_dir: &Path,
        name: &str,
        options: CassetteOptions,
        registry: &MatcherRegistry,
    ) -> Result<Self> {
        validate_cassette_name(name)?;
        options.validate()?;
        let matchers = registry.resolve(&options.match_requests_on)?;

        let format = options.serialize_with;
        let path = library_dir.join(format!("{name}.{}", format.extension()));

        let document = match read_document(&path, format)? {
            Some(document) => document,
            None if options.record_mode.allows_new_cassette() => CassetteDocument {
                http_interactions: Vec::new(),
                recorded_with: None,
            },
            None => return Err(TapedeckError::CassetteNotFound(path)),
        };

        let mut interactions = Vec::with_capacity(document.http_interactions.len());
        for mut stored in document.http_interactions {
            placeholder::unmask(&mut stored, &options.placeholders);
            interactions.push(Interaction::from_serialized(&stored)?);
        }

        let mut record_mode = options.record_mode;
        if record_mode.records() && is_stale(&interactions, options.re_record_interval) {
            info!("Cassette '{}' is older than its re-record interval", name);
            record_mode = RecordMode::All;
        }

        if !record_mode.replays() {
            interactions.clear();
        }

        info!(
            "Loaded cassette '{}': {} interactions (mode: {})",
            name,
            interactions.len(),
            record_mode
        );

        Ok(Self {
            name: name.to_string(),
            path,
            loaded_count: interactions.len(),
            options,
            record_mode,
            matchers,
            interactions,
            dirty: false,
        })
    }

    /// Cassette name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Storage codec
    pub fn format(&self) -> Format {
        self.options.serialize_with
    }

    /// Effective recording mode
    pub fn record_mode(&self) -> RecordMode {
        self.record_mode
    }

    /// Options the cassette was loaded with
    pub fn options(&self) -> &CassetteOptions {
        &self.options
    }

    /// Resolved matchers
    pub fn matchers(&self) -> &MatcherSet {
        &self.matchers
    }

    /// Interactions in recording order
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of interactions
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the cassette holds no interactions
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Number of interactions present at load time
    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    /// Whether an interaction was appended since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Find the first recorded interaction matching `request`.
    ///
    /// Interactions are scanned in recording order. Unless playback repeats
    /// are allowed, interactions that were already replayed are skipped. A
    /// hit increments the interaction's playback count. Under
    /// [`RecordMode::All`] nothing matches.
    pub fn find_match(&mut self, request: &Request) -> Option<&Interaction> {
        if !self.record_mode.replays() {
            return None;
        }

        let allow_repeats = self.options.allow_playback_repeats;
        let matchers = &self.matchers;
        let index = self.interactions.iter().position(|interaction| {
            (allow_repeats || !interaction.is_used())
                && matchers.matches(request, interaction.request())
        });

        match index {
            Some(index) => {
                let interaction = &mut self.interactions[index];
                interaction.mark_played();
                debug!(
                    "Replaying {} {} from '{}' (interaction {}, playback {})",
                    request.method,
                    request.url,
                    self.name,
                    index,
                    interaction.playback_count()
                );
                Some(&*interaction)
            }
            None => {
                debug!(
                    "No match in '{}' for {} {} (fingerprint: {})",
                    self.name,
                    request.method,
                    request.url,
                    short_fingerprint(request)
                );
                None
            }
        }
    }

    /// Append an interaction and mark the cassette dirty
    pub fn append(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
        self.dirty = true;
    }

    /// Record a live exchange, stamped with the current time
    pub fn record(&mut self, request: Request, response: Response) -> &Interaction {
        debug!(
            "Recording {} {} -> {} in '{}'",
            request.method, request.url, response.status_code, self.name
        );
        self.append(Interaction::new(request, response, Utc::now()));
        &self.interactions[self.interactions.len() - 1]
    }

    /// Write every interaction to storage.
    ///
    /// Only writes when the cassette is dirty or runs as
    /// [`RecordMode::All`]; returns whether a write happened. The output is
    /// deterministic, so saving twice without a change in between yields
    /// identical files.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or writing fails
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty && self.record_mode.replays() {
            debug!("Cassette '{}' unchanged, skipping save", self.name);
            return Ok(false);
        }

        let preserve = self.options.preserve_exact_body_bytes;
        let http_interactions = self
            .interactions
            .iter()
            .map(|interaction| {
                let mut stored = interaction.to_serialized(preserve);
                placeholder::mask(&mut stored, &self.options.placeholders);
                stored
            })
            .collect();

        let document = CassetteDocument {
            http_interactions,
            recorded_with: Some(RECORDED_WITH.to_string()),
        };
        write_document(&self.path, self.format(), &document)?;
        self.dirty = false;

        info!(
            "Saved cassette '{}': {} interactions",
            self.name,
            self.interactions.len()
        );
        Ok(true)
    }

    /// Save and close the cassette
    ///
    /// # Errors
    ///
    /// Returns error if saving fails
    pub fn eject(mut self) -> Result<()> {
        self.save()?;
        Ok(())
    }
}

impl Drop for Cassette {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                "Cassette '{}' dropped with {} unsaved interactions",
                self.name,
                self.interactions.len() - self.loaded_count
            );
        }
    }
}

fn is_stale(interactions: &[Interaction], interval: Option<u64>) -> bool {
    let Some(seconds) = interval else {
        return false;
    };
    let Some(cutoff) = i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|age| Utc::now().checked_sub_signed(age))
    else {
        return false;
    };

    interactions
        .iter()
        .any(|interaction| interaction.recorded_at() < cutoff)
}

/// Validate a cassette name
///
/// # Errors
///
/// Returns error if cassette name is invalid
fn validate_cassette_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TapedeckError::InvalidCassetteName(
            "Cassette name cannot be empty".to_string(),
        ));
    }

    if name.len() > 255 {
        return Err(TapedeckError::InvalidCassetteName(format!(
            "Cassette name too long: {} > 255",
            name.len()
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(TapedeckError::InvalidCassetteName(
            "Cassette name cannot contain path separators".to_string(),
        ));
    }

    if name.starts_with('.') {
        return Err(TapedeckError::InvalidCassetteName(
            "Cassette name cannot start with dot".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(TapedeckError::InvalidCassetteName(
            "Cassette name cannot contain null bytes".to_string(),
        ));
    }

    if name.contains("..") {
        return Err(TapedeckError::InvalidCassetteName(
            "Cassette name cannot contain '..'".to_string(),
        ));
    }

    Ok(())
}
