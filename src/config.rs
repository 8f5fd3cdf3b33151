//! Configuration types for Tapedeck

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cassette::Placeholder;
use crate::matchers::DEFAULT_MATCHERS;
use crate::recording::RecordMode;
use crate::storage::Format;
use crate::{Result, TapedeckError};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding cassette files
    pub cassette_library_dir: PathBuf,
    /// Options applied to every cassette unless overridden
    #[serde(default)]
    pub default_cassette_options: CassetteOptions,
}

/// Per-cassette options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CassetteOptions {
    /// Recording mode
    #[serde(default)]
    pub record_mode: RecordMode,
    /// Matcher names, applied in order
    #[serde(default = "default_matchers")]
    pub match_requests_on: Vec<String>,
    /// Storage codec
    #[serde(default)]
    pub serialize_with: Format,
    /// Allow an interaction to be replayed more than once
    #[serde(default)]
    pub allow_playback_repeats: bool,
    /// Store every body as base64
    #[serde(default)]
    pub preserve_exact_body_bytes: bool,
    /// Sensitive strings replaced in stored cassettes
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
    /// Re-record when an interaction is older than this many seconds
    #[serde(default)]
    pub re_record_interval: Option<u64>,
}

fn default_matchers() -> Vec<String> {
    DEFAULT_MATCHERS.iter().map(ToString::to_string).collect()
}

impl Default for CassetteOptions {
    fn default() -> Self {
        Self {
            record_mode: RecordMode::default(),
            match_requests_on: default_matchers(),
            serialize_with: Format::default(),
            allow_playback_repeats: false,
            preserve_exact_body_bytes: false,
            placeholders: Vec::new(),
            re_record_interval: None,
        }
    }
}

impl CassetteOptions {
    /// Set the recording mode
    #[must_use]
    pub fn with_record_mode(mut self, record_mode: RecordMode) -> Self {
        self.record_mode = record_mode;
        self
    }

    /// Set the matcher names
    #[must_use]
    pub fn with_matchers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.match_requests_on = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the storage codec
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.serialize_with = format;
        self
    }

    /// Allow or forbid repeated playback
    #[must_use]
    pub fn with_playback_repeats(mut self, allow: bool) -> Self {
        self.allow_playback_repeats = allow;
        self
    }

    /// Add a placeholder
    #[must_use]
    pub fn with_placeholder(
        mut self,
        placeholder: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.placeholders.push(Placeholder::new(placeholder, replace));
        self
    }

    /// Validate options
    ///
    /// # Errors
    ///
    /// Returns error if no matcher is configured or a placeholder is empty
    pub fn validate(&self) -> Result<()> {
        if self.match_requests_on.is_empty() {
            return Err(TapedeckError::ConfigError(
                "At least one matcher must be configured".to_string(),
            ));
        }

        for (i, placeholder) in self.placeholders.iter().enumerate() {
            if placeholder.replace.is_empty() {
                return Err(TapedeckError::ConfigError(format!(
                    "Placeholder {i}: replace cannot be empty"
                )));
            }
            if placeholder.placeholder.is_empty() {
                return Err(TapedeckError::ConfigError(format!(
                    "Placeholder {i}: placeholder cannot be empty"
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Create a configuration with default cassette options
    pub fn new(cassette_library_dir: impl Into<PathBuf>) -> Self {
        Self {
            cassette_library_dir: cassette_library_dir.into(),
            default_cassette_options: CassetteOptions::default(),
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TapedeckError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| TapedeckError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if !self.cassette_library_dir.is_dir() {
            return Err(TapedeckError::ConfigError(format!(
                "Cassette library directory does not exist: {}",
                self.cassette_library_dir.display()
            )));
        }

        self.default_cassette_options.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_parse() {
        let config_toml = r#"
            cassette_library_dir = "/tmp"

            [default_cassette_options]
            record_mode = "new_episodes"
            match_requests_on = ["method", "uri", "body"]
            serialize_with = "yaml"
            re_record_interval = 3600

            [[default_cassette_options.placeholders]]
            placeholder = "<API_KEY>"
            replace = "s3cr3t"
        "#;

        let config: Config = toml::from_str(config_toml).unwrap();
        let options = &config.default_cassette_options;
        assert_eq!(options.record_mode, RecordMode::NewEpisodes);
        assert_eq!(options.match_requests_on, vec!["method", "uri", "body"]);
        assert_eq!(options.serialize_with, Format::Yaml);
        assert_eq!(options.re_record_interval, Some(3600));
        assert_eq!(options.placeholders[0].replace, "s3cr3t");
        assert!(!options.allow_playback_repeats);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str(r#"cassette_library_dir = "/tmp""#).unwrap();
        assert_eq!(config.default_cassette_options, CassetteOptions::default());
        assert_eq!(
            config.default_cassette_options.match_requests_on,
            vec!["method", "uri"]
        );
        assert_eq!(config.default_cassette_options.record_mode, RecordMode::Once);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        let config_toml = format!(
            "cassette_library_dir = {:?}\n\n[default_cassette_options]\nrecord_mode = \"none\"\n",
            dir.path().display().to_string()
        );
        file.write_all(config_toml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.default_cassette_options.record_mode, RecordMode::None);
    }

    #[test]
    fn test_invalid_config() {
        let config = Config::new("/definitely/not/a/real/dir");
        assert!(config.validate().is_err());

        let options = CassetteOptions::default().with_matchers(Vec::<String>::new());
        assert!(options.validate().is_err());

        let options = CassetteOptions::default().with_placeholder("<X>", "");
        assert!(options.validate().is_err());
    }
}
