/*!
 * Tests for timecode parsing, formatting and arithmetic
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use subrip::errors::SubtitleError;
use subrip::Timecode;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let time = Timecode::parse(ts).unwrap();
    assert_eq!(time.ordinal(), 5_025_678);
    assert_eq!(time.to_string(), ts);
}

#[test]
fn test_parse_withAlternativeSeparators_shouldAccept() {
    assert_eq!(Timecode::parse("00:00:01.500").unwrap().ordinal(), 1500);
    assert_eq!(Timecode::parse("00:00:01:500").unwrap().ordinal(), 1500);
    assert_eq!(Timecode::parse(" 0:0:1,5 ").unwrap().ordinal(), 1005);
}

#[test]
fn test_parse_withGarbage_shouldFailWithInvalidTimeString() {
    for bad in ["", "12:34", "aa:bb:cc,ddd", "00:00:01", "00:00:01,000 extra"] {
        let err = Timecode::parse(bad).unwrap_err();
        assert!(
            matches!(err, SubtitleError::InvalidTimeString { .. }),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn test_format_withLargeHours_shouldNotTruncate() {
    let time = Timecode::from_parts(123, 4, 5, 6);
    assert_eq!(time.to_string(), "123:04:05,006");
}

#[test]
fn test_fromParts_withOverflow_shouldNormalize() {
    let time = Timecode::from_parts(0, 0, 90, 1500);
    assert_eq!(time.minutes(), 1);
    assert_eq!(time.seconds(), 31);
    assert_eq!(time.milliseconds(), 500);
    assert_eq!(Timecode::from((1, 0, 0, 0)).ordinal(), 3_600_000);
}

#[test]
fn test_setters_shouldRebuildOrdinal() {
    let mut time = Timecode::parse("01:02:03,004").unwrap();
    time.set_minutes(30);
    time.set_milliseconds(999);
    assert_eq!(time.to_string(), "01:30:03,999");
    time.set_hours(0);
    assert_eq!(time.ordinal(), 30 * 60_000 + 3_999);
}

#[test]
fn test_arithmetic_shouldWorkOnOrdinals() {
    let a = Timecode::from_millis(1500);
    let b = Timecode::from_millis(2000);

    assert_eq!((a + b).ordinal(), 3500);
    assert_eq!((a - b).ordinal(), -500);
    assert!((a - b).is_negative());
    assert_eq!((a * 2.0).ordinal(), 3000);
    assert_eq!((-a).ordinal(), -1500);

    let mut c = a;
    c += b;
    c -= Timecode::from_millis(500);
    assert_eq!(c.ordinal(), 3000);
}

#[test]
fn test_negativeTimecode_shouldFormatWithSign() {
    assert_eq!(Timecode::from_millis(-1500).to_string(), "-00:00:01,500");
}

#[test]
fn test_duration_conversions_shouldRoundTrip() {
    let time = Timecode::from(Duration::from_millis(61_001));
    assert_eq!(time.to_string(), "00:01:01,001");
    assert_eq!(time.to_duration(), Some(Duration::from_millis(61_001)));
    assert_eq!(Timecode::from_millis(-1).to_duration(), None);
    assert_eq!(Timecode::from_seconds(2.25).ordinal(), 2250);
}

#[test]
fn test_ordering_shouldMatchOrdinalComparison() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let a = Timecode::from_millis(rng.random_range(-10_000..10_000));
        let b = Timecode::from_millis(rng.random_range(-10_000..10_000));
        assert_eq!(a.cmp(&b), a.ordinal().cmp(&b.ordinal()));
        assert_eq!(a == b, a.ordinal() == b.ordinal());
    }
}

#[test]
fn test_fromStr_shouldMatchParse() {
    let parsed: Timecode = "00:10:00,000".parse().unwrap();
    assert_eq!(parsed, Timecode::from_parts(0, 10, 0, 0));
}
