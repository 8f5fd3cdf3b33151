//! A single recorded request/response pair

use chrono::{DateTime, Utc};

use crate::http::{Request, Response};
use crate::storage::{
    deserialize_request, deserialize_response, serialize_request, serialize_response,
    SerializedInteraction,
};
use crate::Result;

/// One recorded exchange
///
/// The request and response are fixed once loaded; only the playback
/// count changes during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    request: Request,
    response: Response,
    recorded_at: DateTime<Utc>,
    playback_count: u32,
}

impl Interaction {
    /// Create an interaction
    pub fn new(request: Request, mut response: Response, recorded_at: DateTime<Utc>) -> Self {
        response.request = None;
        Self {
            request,
            response,
            recorded_at,
            playback_count: 0,
        }
    }

    /// Rebuild an interaction from its stored form
    ///
    /// # Errors
    ///
    /// Returns [`crate::TapedeckError::Deserialization`] if the stored request
    /// or response is malformed
    pub fn from_serialized(stored: &SerializedInteraction) -> Result<Self> {
        Ok(Self::new(
            deserialize_request(&stored.request)?,
            deserialize_response(&stored.response)?,
            stored.recorded_at,
        ))
    }

    /// Convert into the stored form
    pub fn to_serialized(&self, preserve_exact_body_bytes: bool) -> SerializedInteraction {
        SerializedInteraction {
            request: serialize_request(&self.request, preserve_exact_body_bytes),
            response: serialize_response(&self.response, preserve_exact_body_bytes),
            recorded_at: self.recorded_at,
        }
    }

    /// Recorded request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Recorded response, without its request attached
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// When the exchange was recorded
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Times this interaction has been replayed in this session
    pub fn playback_count(&self) -> u32 {
        self.playback_count
    }

    /// Whether this interaction has been replayed in this session
    pub fn is_used(&self) -> bool {
        self.playback_count > 0
    }

    /// The recorded response, with the recorded request attached
    pub fn as_response(&self) -> Response {
        self.response.clone().with_request(self.request.clone())
    }

    pub(crate) fn mark_played(&mut self) {
        self.playback_count = self.playback_count.saturating_add(1);
    }
}
