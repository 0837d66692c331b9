/*!
 * Validation service that orchestrates all rules.
 *
 * This module provides a unified interface for running every integrity
 * check on a subtitle collection and collecting the diagnostics.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::SubtitleCollection;
use crate::timecode::Timecode;

use super::length::{LengthValidator, LengthValidatorConfig};
use super::timecodes::{TimecodeValidator, TimecodeValidatorConfig};

/// Category of a validation diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Not enough subtitles in the file
    Content,
    /// Entry index does not match its position
    Sequence,
    /// Start is not before end
    Timing,
    /// Duration outside the configured bounds
    Duration,
    /// Text length outside the configured bounds
    Length,
    /// Entry starts before the previous one ends
    Overlap,
    /// Text contains control characters
    ControlChar,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Sequence => "sequence",
            Self::Timing => "timing",
            Self::Duration => "duration",
            Self::Length => "length",
            Self::Overlap => "overlap",
            Self::ControlChar => "control_char",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 1-based position in the collection, 0 for file-level errors
    pub position: usize,
    pub error_type: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(position: usize, error_type: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            position,
            error_type,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {}", self.position, self.error_type, self.message)
    }
}

/// Configuration for the validation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Files with fewer entries fail with a single `content` error
    #[serde(default = "default_min_subtitle_count")]
    pub min_subtitle_count: usize,

    /// Minimum trimmed text length
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Maximum trimmed text length
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Minimum display duration in milliseconds
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: i64,

    /// Maximum display duration in seconds
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: f64,

    /// Whether entry indexes must equal their 1-based position
    #[serde(default = "default_true")]
    pub check_sequence: bool,

    /// Whether to check for overlaps with the previous entry
    #[serde(default = "default_true")]
    pub check_overlaps: bool,
}

fn default_min_subtitle_count() -> usize {
    2
}

fn default_min_text_length() -> usize {
    2
}

fn default_max_text_length() -> usize {
    500
}

fn default_min_duration_ms() -> i64 {
    500
}

fn default_max_duration_secs() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            min_subtitle_count: default_min_subtitle_count(),
            min_text_length: default_min_text_length(),
            max_text_length: default_max_text_length(),
            min_duration_ms: default_min_duration_ms(),
            max_duration_secs: default_max_duration_secs(),
            check_sequence: true,
            check_overlaps: true,
        }
    }
}

/// Runs every rule over a collection
pub struct ValidationService {
    options: ValidationOptions,
    timecodes: TimecodeValidator,
    length: LengthValidator,
}

impl ValidationService {
    /// Create a new service with default options
    pub fn new() -> Self {
        Self::with_options(ValidationOptions::default())
    }

    /// Create a new service with custom options
    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            timecodes: TimecodeValidator::with_config(TimecodeValidatorConfig::from(&options)),
            length: LengthValidator::with_config(LengthValidatorConfig::from(&options)),
            options,
        }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate a collection; an empty result means it is valid
    pub fn validate(&self, collection: &SubtitleCollection) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if collection.len() < self.options.min_subtitle_count {
            errors.push(ValidationError::new(
                0,
                ValidationErrorKind::Content,
                format!(
                    "File has only {} subtitles, minimum is {}",
                    collection.len(),
                    self.options.min_subtitle_count
                ),
            ));
            return errors;
        }

        let mut previous_end: Option<Timecode> = None;
        for (i, entry) in collection.iter().enumerate() {
            let position = i + 1;

            if self.options.check_sequence && entry.index != position {
                errors.push(ValidationError::new(
                    position,
                    ValidationErrorKind::Sequence,
                    format!("Expected index {}, got {}", position, entry.index),
                ));
            }

            self.timecodes.validate_entry(position, entry, &mut errors);
            self.length.validate_entry(position, entry, &mut errors);
            errors.extend(self.timecodes.check_overlap(position, entry, previous_end));
            errors.extend(self.length.check_control_chars(position, entry));

            previous_end = Some(entry.end);
        }

        debug!(
            "Validation: {} entries, {} errors",
            collection.len(),
            errors.len()
        );

        errors
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate `collection` against `options`
pub fn validate_subtitles(collection: &SubtitleCollection, options: &ValidationOptions) -> Vec<ValidationError> {
    ValidationService::with_options(options.clone()).validate(collection)
}

impl SubtitleCollection {
    /// Validate this collection against `options`
    pub fn validate(&self, options: &ValidationOptions) -> Vec<ValidationError> {
        validate_subtitles(self, options)
    }
}
