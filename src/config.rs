//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file: the one passed with `--config`, otherwise the platform
//!    default (`config.toml` in the dupgroups config directory) if it exists
//! 3. Environment variables prefixed with `DUPGROUPS_` (e.g. `DUPGROUPS_DELIMITER`)
//! 4. Command-line flags
//!
//! # Example file
//!
//! ```toml
//! escape = "\\"
//! delimiter = "|"
//! comment_marker = "#"
//! algorithm = "sha-256"
//! buffer_size = 65536
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::output::{ReportFormat, ReportFormatError, DEFAULT_DELIMITER, DEFAULT_ESCAPE};
use crate::progress::DEFAULT_COMMENT_MARKER;
use crate::scanner::{HashAlgorithm, HashError, DEFAULT_BUFFER_SIZE};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPGROUPS_";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A layer could not be parsed or has the wrong types.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The escape marker / delimiter pair is unusable.
    #[error(transparent)]
    Format(#[from] ReportFormatError),

    /// The configured digest algorithm is unknown.
    #[error(transparent)]
    Algorithm(#[from] HashError),

    /// The hashing buffer size is zero.
    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,

    /// The progress comment marker contains a line break.
    #[error("comment_marker must not contain a line break")]
    CommentMarker,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Escape marker for report fields.
    #[serde(deserialize_with = "scalar_string")]
    pub escape: String,
    /// Delimiter between report fields.
    #[serde(deserialize_with = "scalar_string")]
    pub delimiter: String,
    /// Prefix of progress lines.
    #[serde(deserialize_with = "scalar_string")]
    pub comment_marker: String,
    /// Digest algorithm name.
    #[serde(deserialize_with = "scalar_string")]
    pub algorithm: String,
    /// Hashing buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape: DEFAULT_ESCAPE.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
            algorithm: HashAlgorithm::default().name().to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Build the defaults < file < environment stack.
    ///
    /// `file` overrides the platform config path. A missing platform file is
    /// fine; a missing explicit file is reported by [`Config::load`].
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match file.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => {
                log::debug!("Reading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => log::debug!("No platform config directory; using defaults"),
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration from file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `file` is missing or any layer is
    /// malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }
        Ok(Self::figment(file).extract()?)
    }

    /// Load all layers including command-line overrides, then validate.
    ///
    /// # Errors
    ///
    /// See [`Config::load`] and [`Config::validate`].
    pub fn load_with_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::load(cli.config.as_deref())?;
        config.apply_cli_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply flags given on the command line.
    pub fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(escape) = &cli.escape {
            self.escape.clone_from(escape);
        }
        if let Some(delimiter) = &cli.delimiter {
            self.delimiter.clone_from(delimiter);
        }
        if let Some(buffer_size) = cli.buffer_size {
            self.buffer_size = buffer_size;
        }
    }

    /// Check every setting that could only fail at run time.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hash_algorithm()?;
        self.report_format()?;
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.comment_marker.contains(|c: char| c == '\n' || c == '\r') {
            return Err(ConfigError::CommentMarker);
        }
        Ok(())
    }

    /// Typed report markers.
    ///
    /// # Errors
    ///
    /// Returns an error if the markers are unusable.
    pub fn report_format(&self) -> Result<ReportFormat, ConfigError> {
        Ok(ReportFormat::new(self.escape.clone(), self.delimiter.clone())?)
    }

    /// Typed digest algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnknownAlgorithm`] for unsupported names.
    pub fn hash_algorithm(&self) -> Result<HashAlgorithm, ConfigError> {
        Ok(HashAlgorithm::from_name(&self.algorithm)?)
    }

    /// Platform-specific default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupgroups", "dupgroups")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Read any scalar as its text form.
///
/// Environment values are typed by figment, so `DUPGROUPS_DELIMITER=1`
/// arrives as a number and `DUPGROUPS_ESCAPE=true` as a bool.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}
