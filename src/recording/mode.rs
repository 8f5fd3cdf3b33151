//! Recording modes and the per-request decision table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Policy for live requests and new recordings, fixed for a cassette's
/// lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMode {
    /// Replay; record only when the cassette was empty at load
    #[default]
    Once,
    /// Replay; record anything that does not match
    NewEpisodes,
    /// Replay only; never touch the network
    None,
    /// Always go live and re-record
    All,
}

/// What to do with one outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Return the matched interaction's response
    Replay,
    /// Send the request live and append the exchange
    Record,
    /// Fail with `NoMatchFound`
    Fail,
}

impl RecordMode {
    /// Decide how to handle a request.
    ///
    /// `matched` is whether a recorded interaction matched. `had_interactions`
    /// is whether the cassette held any interaction when it was loaded.
    pub const fn decide(self, matched: bool, had_interactions: bool) -> Decision {
        match (self, matched) {
            (Self::All, _) => Decision::Record,
            (_, true) => Decision::Replay,
            (Self::NewEpisodes, false) => Decision::Record,
            (Self::Once, false) if !had_interactions => Decision::Record,
            (Self::Once | Self::None, false) => Decision::Fail,
        }
    }

    /// Whether a missing cassette file may be created
    pub const fn allows_new_cassette(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether live requests may ever be sent and recorded
    pub const fn records(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether stored interactions take part in matching
    pub const fn replays(self) -> bool {
        !matches!(self, Self::All)
    }
}

impl fmt::Display for RecordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Once => "once",
            Self::NewEpisodes => "new_episodes",
            Self::None => "none",
            Self::All => "all",
        })
    }
}
