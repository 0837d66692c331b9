use anyhow::{anyhow, Context, Result};
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::encoding::Encoding;
use crate::subtitle_processor::{ErrorHandling, ParseOptions, SaveOptions};
use crate::timing::OverlapFixConfig;
use crate::validation::ValidationOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// How input files are read
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// How output files are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Overlap repair settings used by `fix`
    #[serde(default)]
    pub overlap: OverlapFixConfig,

    /// Validation rules used by `check`
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ParsingConfig {
    /// Encoding for files without a BOM (UTF-8 when unset)
    #[serde(default)]
    pub encoding: Option<String>,

    /// What to do with malformed blocks
    #[serde(default)]
    pub error_handling: ErrorHandling,
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct OutputConfig {
    /// Newline style of written files
    #[serde(default)]
    pub line_ending: LineEnding,

    /// Output encoding (the source encoding when unset)
    #[serde(default)]
    pub encoding: Option<String>,

    /// Prefix written files with a byte-order mark
    #[serde(default)]
    pub write_bom: bool,
}

/// Newline style of written files
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Whatever the input used
    #[default]
    Keep,
    Lf,
    Crlf,
}

impl LineEnding {
    // @returns: Newline override, or None to keep the source newline
    pub fn as_eol(&self) -> Option<&'static str> {
        match self {
            Self::Keep => None,
            Self::Lf => Some("\n"),
            Self::Crlf => Some("\r\n"),
        }
    }
}

impl std::str::FromStr for LineEnding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::Crlf),
            _ => Err(anyhow!("Invalid line ending: {}", s)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn parse_encoding(name: Option<&str>, section: &str) -> Result<Option<Encoding>> {
    name.map(|name| {
        name.parse::<Encoding>()
            .with_context(|| format!("Invalid {} encoding", section))
    })
    .transpose()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from `path`, or defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("Config file not found at '{}', using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        let wps = self.overlap.words_per_second;
        if wps.is_nan() || wps <= 0.0 {
            return Err(anyhow!(
                "overlap.words_per_second must be positive, got {}",
                wps
            ));
        }

        if self.overlap.buffer_ms < 0 {
            return Err(anyhow!("overlap.buffer_ms must not be negative"));
        }

        if self.validation.min_text_length > self.validation.max_text_length {
            return Err(anyhow!(
                "validation.min_text_length ({}) exceeds max_text_length ({})",
                self.validation.min_text_length,
                self.validation.max_text_length
            ));
        }

        parse_encoding(self.parsing.encoding.as_deref(), "parsing")?;
        parse_encoding(self.output.encoding.as_deref(), "output")?;

        Ok(())
    }

    /// Options for reading input files
    pub fn parse_options(&self) -> Result<ParseOptions> {
        Ok(ParseOptions {
            encoding: parse_encoding(self.parsing.encoding.as_deref(), "parsing")?,
            eol: None,
            error_handling: self.parsing.error_handling,
        })
    }

    /// Options for writing output files
    pub fn save_options(&self) -> Result<SaveOptions> {
        Ok(SaveOptions {
            eol: self.output.line_ending.as_eol().map(str::to_string),
            encoding: parse_encoding(self.output.encoding.as_deref(), "output")?,
            write_bom: self.output.write_bom,
        })
    }
}
