/*!
 * Error types for the subrip crate.
 *
 * `SubtitleError` covers everything the library itself can fail with while
 * parsing, decoding or writing subtitles. `AppError` wraps it together with
 * the failures the command-line front end adds on top (configuration, files).
 */

use thiserror::Error;

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A timecode token did not match `HH:MM:SS,mmm` or does not fit in range
    #[error("Invalid time string: {value:?}{}", line_suffix(.line))]
    InvalidTimeString {
        /// The rejected token
        value: String,
        /// 1-based line number of the block's last line (0 when unknown)
        line: usize,
    },

    /// A block could not be split into index, time range and text
    #[error("Invalid subtitle item near line {line}: {reason}")]
    InvalidItem {
        /// 1-based line number of the block's last line (0 when unknown)
        line: usize,
        /// Raw text of the offending block
        block: String,
        /// What was wrong with it
        reason: String,
    },

    /// Raw bytes are not valid in the requested encoding
    #[error("Failed to decode input as {encoding}: {reason}")]
    Decode {
        encoding: String,
        reason: String,
    },

    /// Text cannot be represented in the requested output encoding
    #[error("Failed to encode output as {encoding}: {reason}")]
    Encode {
        encoding: String,
        reason: String,
    },

    /// Encoding name is not one we know how to handle
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Underlying I/O failure while reading or writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn line_suffix(line: &usize) -> String {
    match *line {
        0 => String::new(),
        n => format!(" near line {n}"),
    }
}

impl SubtitleError {
    pub(crate) fn invalid_time(value: &str) -> Self {
        SubtitleError::InvalidTimeString {
            value: value.to_string(),
            line: 0,
        }
    }

    /// Attach the line number of the block's last line to an error raised
    /// while parsing a block.
    pub(crate) fn at_line(self, line: usize, raw_block: &str) -> Self {
        match self {
            SubtitleError::InvalidItem { reason, .. } => SubtitleError::InvalidItem {
                line,
                block: raw_block.to_string(),
                reason,
            },
            SubtitleError::InvalidTimeString { value, .. } => {
                SubtitleError::InvalidTimeString { value, line }
            }
            other => other,
        }
    }

    /// Short name of the error kind, used in log output
    pub fn kind_name(&self) -> &'static str {
        match self {
            SubtitleError::InvalidTimeString { .. } => "InvalidTimeString",
            SubtitleError::InvalidItem { .. } => "InvalidItem",
            SubtitleError::Decode { .. } => "Decode",
            SubtitleError::Encode { .. } => "Encode",
            SubtitleError::UnknownEncoding(_) => "UnknownEncoding",
            SubtitleError::Io(_) => "Io",
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
