/*!
 * Tests for error types and conversions
 */

use subrip::errors::{AppError, SubtitleError};

#[test]
fn test_subtitleError_invalidItem_shouldDisplayLineAndReason() {
    let error = SubtitleError::InvalidItem {
        line: 12,
        block: "garbage".to_string(),
        reason: "invalid index line".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("line 12"));
    assert!(display.contains("invalid index line"));
    assert_eq!(error.kind_name(), "InvalidItem");
}

#[test]
fn test_subtitleError_invalidTimeString_shouldMentionLineOnlyWhenKnown() {
    let unknown = SubtitleError::InvalidTimeString {
        value: "00:00:0x,000".to_string(),
        line: 0,
    };
    assert_eq!(unknown.to_string(), "Invalid time string: \"00:00:0x,000\"");

    let located = SubtitleError::InvalidTimeString {
        value: "00:00:0x,000".to_string(),
        line: 7,
    };
    assert_eq!(
        located.to_string(),
        "Invalid time string: \"00:00:0x,000\" near line 7"
    );
    assert_eq!(located.kind_name(), "InvalidTimeString");
}

#[test]
fn test_subtitleError_decode_shouldNameEncoding() {
    let error = SubtitleError::Decode {
        encoding: "utf-16le".to_string(),
        reason: "odd number of bytes".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Failed to decode input as utf-16le: odd number of bytes"
    );
}

#[test]
fn test_appError_fromSubtitleError_shouldWrap() {
    let error: AppError = SubtitleError::InvalidTimeString {
        value: "99".to_string(),
        line: 0,
    }
    .into();
    assert!(matches!(error, AppError::Subtitle(SubtitleError::InvalidTimeString { .. })));
    assert!(error.to_string().starts_with("Subtitle error:"));
}

#[test]
fn test_appError_fromIoAndJson_shouldMapToKinds() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.srt");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(AppError::from(json), AppError::Config(_)));

    let other = AppError::from(anyhow::anyhow!("boom"));
    assert_eq!(other.to_string(), "Unknown error: boom");
}

#[test]
fn test_subtitleError_fromIo_shouldKeepSource() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = SubtitleError::from(io);
    assert_eq!(error.kind_name(), "Io");
    assert!(std::error::Error::source(&error).is_some());
}
