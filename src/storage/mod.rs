//! Cassette storage: document form, codecs and file access

mod format;
mod reader;
mod writer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use format::{
    deserialize_request, deserialize_response, serialize_request, serialize_response,
    CassetteDocument, SerializedBody, SerializedInteraction, SerializedRequest,
    SerializedResponse, DEFAULT_ENCODING,
};
pub use reader::read_document;
pub use writer::write_document;

use crate::{Result, TapedeckError};

/// Value written to `recorded_with`
pub const RECORDED_WITH: &str = concat!("tapedeck ", env!("CARGO_PKG_VERSION"));

/// Structured-text codec for cassette files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl Format {
    /// File extension, without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Encode a document
    ///
    /// # Errors
    ///
    /// Returns [`TapedeckError::Serialization`] if encoding fails
    pub fn encode(self, document: &CassetteDocument) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(document)
                .map(|mut text| {
                    text.push('\n');
                    text
                })
                .map_err(|e| TapedeckError::Serialization(e.to_string())),
            Self::Yaml => serde_yaml::to_string(document)
                .map_err(|e| TapedeckError::Serialization(e.to_string())),
        }
    }

    /// Decode a document
    ///
    /// # Errors
    ///
    /// Returns [`TapedeckError::Deserialization`] if the text is not a valid
    /// cassette document, including when a required field is missing
    pub fn decode(self, text: &str) -> Result<CassetteDocument> {
        match self {
            Self::Json => serde_json::from_str(text)
                .map_err(|e| TapedeckError::Deserialization(e.to_string())),
            Self::Yaml => serde_yaml::from_str(text)
                .map_err(|e| TapedeckError::Deserialization(e.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
