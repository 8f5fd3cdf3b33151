//! Reusable in-memory message bodies

use bytes::Bytes;

/// HTTP message body
///
/// Backed by a shared [`Bytes`] buffer. Unlike a live network body, reading
/// never consumes it: `as_bytes`, `to_bytes`, `chunks` and `text` may be
/// called any number of times on the same replayed response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    bytes: Bytes,
}

impl Body {
    /// Create a body from anything convertible into [`Bytes`]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Create an empty body
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap handle to the underlying buffer
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Body as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the body is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Iterate over the body in chunks of at most `size` bytes.
    ///
    /// Each call starts from the beginning of the buffer. A `size` of zero
    /// is treated as one.
    pub fn chunks(&self, size: usize) -> Chunks {
        Chunks {
            remaining: self.bytes.clone(),
            size: size.max(1),
        }
    }

    /// Decode the body as text.
    ///
    /// `iso-8859-1`, `latin-1` and `ascii` map each byte to one char. Any
    /// other label, or none, decodes as UTF-8 with replacement characters.
    pub fn text(&self, encoding: Option<&str>) -> String {
        match encoding.map(str::to_ascii_lowercase).as_deref() {
            Some("iso-8859-1" | "latin-1" | "latin1" | "ascii" | "us-ascii") => {
                self.bytes.iter().map(|&byte| char::from(byte)).collect()
            }
            _ => String::from_utf8_lossy(&self.bytes).into_owned(),
        }
    }
}

/// Chunked iterator over a [`Body`]
#[derive(Debug, Clone)]
pub struct Chunks {
    remaining: Bytes,
    size: usize,
}

impl Iterator for Chunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.size.min(self.remaining.len());
        Some(self.remaining.split_to(take))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::new(text)
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self::new(bytes)
    }
}
