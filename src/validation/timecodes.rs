/*!
 * Timecode rules for subtitle entries.
 *
 * This module checks that timecodes are:
 * - Logically consistent (start < end)
 * - Within the configured duration bounds
 * - Not starting before the previous entry has ended
 */

use crate::subtitle_processor::SubtitleEntry;
use crate::timecode::Timecode;

use super::service::{ValidationError, ValidationErrorKind, ValidationOptions};

/// Configuration for timecode validation
#[derive(Debug, Clone, PartialEq)]
pub struct TimecodeValidatorConfig {
    /// Minimum subtitle duration in ms
    pub min_duration_ms: i64,
    /// Maximum subtitle duration in seconds
    pub max_duration_secs: f64,
    /// Whether to check for overlaps
    pub check_overlaps: bool,
}

impl From<&ValidationOptions> for TimecodeValidatorConfig {
    fn from(options: &ValidationOptions) -> Self {
        Self {
            min_duration_ms: options.min_duration_ms,
            max_duration_secs: options.max_duration_secs,
            check_overlaps: options.check_overlaps,
        }
    }
}

/// Timecode validator for subtitle entries
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    /// Create a new validator with custom configuration
    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Timing and duration checks for one entry
    pub fn validate_entry(&self, position: usize, entry: &SubtitleEntry, errors: &mut Vec<ValidationError>) {
        if entry.start >= entry.end {
            errors.push(ValidationError::new(
                position,
                ValidationErrorKind::Timing,
                format!("Start time ({}) >= end time ({})", entry.start, entry.end),
            ));
        }

        let duration_ms = entry.duration().ordinal();
        if duration_ms < self.config.min_duration_ms {
            errors.push(ValidationError::new(
                position,
                ValidationErrorKind::Duration,
                format!(
                    "Duration {}ms below minimum {}ms",
                    duration_ms, self.config.min_duration_ms
                ),
            ));
        }
        if duration_ms as f64 > self.config.max_duration_secs * 1000.0 {
            errors.push(ValidationError::new(
                position,
                ValidationErrorKind::Duration,
                format!(
                    "Duration {}ms exceeds maximum {}s",
                    duration_ms, self.config.max_duration_secs
                ),
            ));
        }
    }

    /// Overlap with the previous entry's raw end time
    pub fn check_overlap(
        &self,
        position: usize,
        entry: &SubtitleEntry,
        previous_end: Option<Timecode>,
    ) -> Option<ValidationError> {
        if !self.config.check_overlaps {
            return None;
        }

        let previous_end = previous_end?;
        (entry.start < previous_end).then(|| {
            ValidationError::new(
                position,
                ValidationErrorKind::Overlap,
                format!(
                    "Overlaps with previous subtitle by {}ms",
                    (previous_end - entry.start).ordinal()
                ),
            )
        })
    }
}
