/*!
 * Text rules for subtitle entries: trimmed length bounds and stray control
 * characters. Tab, line feed and carriage return are allowed.
 */

use crate::subtitle_processor::SubtitleEntry;

use super::service::{ValidationError, ValidationErrorKind, ValidationOptions};

/// Configuration for text validation
#[derive(Debug, Clone, PartialEq)]
pub struct LengthValidatorConfig {
    /// Minimum trimmed text length in characters
    pub min_text_length: usize,
    /// Maximum trimmed text length in characters
    pub max_text_length: usize,
}

impl From<&ValidationOptions> for LengthValidatorConfig {
    fn from(options: &ValidationOptions) -> Self {
        Self {
            min_text_length: options.min_text_length,
            max_text_length: options.max_text_length,
        }
    }
}

/// Whether `c` is a control character that has no place in subtitle text
pub fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

/// Whitespace for trimming: Unicode white space plus the information
/// separators U+001C..U+001F
fn is_trimmed(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1C}'..='\u{1F}')
}

/// Text with surrounding whitespace and separators removed
pub fn trimmed_text(text: &str) -> &str {
    text.trim_matches(is_trimmed)
}

/// Validator for subtitle text
pub struct LengthValidator {
    config: LengthValidatorConfig,
}

impl LengthValidator {
    /// Create a new validator with custom configuration
    pub fn with_config(config: LengthValidatorConfig) -> Self {
        Self { config }
    }

    /// Length checks for one entry
    pub fn validate_entry(&self, position: usize, entry: &SubtitleEntry, errors: &mut Vec<ValidationError>) {
        let length = trimmed_text(&entry.text).chars().count();

        if length < self.config.min_text_length {
            errors.push(ValidationError::new(
                position,
                ValidationErrorKind::Length,
                format!(
                    "Text length {} below minimum {}",
                    length, self.config.min_text_length
                ),
            ));
        }
        if length > self.config.max_text_length {
            errors.push(ValidationError::new(
                position,
                ValidationErrorKind::Length,
                format!(
                    "Text length {} exceeds maximum {}",
                    length, self.config.max_text_length
                ),
            ));
        }
    }

    /// Control character check for one entry
    pub fn check_control_chars(&self, position: usize, entry: &SubtitleEntry) -> Option<ValidationError> {
        trimmed_text(&entry.text).chars().any(is_forbidden_control).then(|| {
            ValidationError::new(
                position,
                ValidationErrorKind::ControlChar,
                "Contains invalid control characters",
            )
        })
    }
}
