/*!
 * Tests for subtitle validation
 */

use subrip::validation::ValidationService;
use subrip::{
    validate_subtitles, SubtitleCollection, ValidationErrorKind, ValidationOptions,
};

use crate::common::{self, entry};

fn kinds_at(subs: &SubtitleCollection, options: &ValidationOptions, position: usize) -> Vec<ValidationErrorKind> {
    validate_subtitles(subs, options)
        .into_iter()
        .filter(|e| e.position == position)
        .map(|e| e.error_type)
        .collect()
}

#[test]
fn test_validate_withSample_shouldPass() {
    let subs = SubtitleCollection::parse(common::SAMPLE_SRT).unwrap();
    assert!(subs.validate(&ValidationOptions::default()).is_empty());
}

#[test]
fn test_validate_withOneItem_shouldReturnOnlyContentError() {
    let subs = SubtitleCollection::from_entries(vec![entry(1, "00:00:01,000", "00:00:02,000", "Alone")]);
    let errors = subs.validate(&ValidationOptions::default());

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, ValidationErrorKind::Content);
    assert_eq!(errors[0].error_type.to_string(), "content");
}

#[test]
fn test_validate_withBackwardsItem_shouldReportTiming() {
    let subs = SubtitleCollection::from_entries(vec![
        entry(1, "00:00:03,000", "00:00:01,000", "Backwards"),
        entry(2, "00:00:04,000", "00:00:06,000", "Fine"),
    ]);
    assert!(kinds_at(&subs, &ValidationOptions::default(), 1).contains(&ValidationErrorKind::Timing));
}

#[test]
fn test_validate_withLongText_shouldDependOnMaximum() {
    let subs = SubtitleCollection::from_entries(vec![
        entry(1, "00:00:01,000", "00:00:03,000", &"x".repeat(600)),
        entry(2, "00:00:04,000", "00:00:06,000", "Fine"),
    ]);

    assert_eq!(
        kinds_at(&subs, &ValidationOptions::default(), 1),
        [ValidationErrorKind::Length]
    );

    let relaxed = ValidationOptions {
        max_text_length: 1000,
        ..Default::default()
    };
    assert!(validate_subtitles(&subs, &relaxed).is_empty());
}

#[test]
fn test_validate_shouldUseRawPreviousEndForOverlap() {
    let subs = SubtitleCollection::from_entries(vec![
        entry(1, "00:00:01,000", "00:00:05,000", "First"),
        entry(2, "00:00:04,000", "00:00:06,000", "Second"),
        entry(3, "00:00:05,500", "00:00:08,000", "Third"),
    ]);
    let errors = subs.validate(&ValidationOptions::default());
    let overlaps: Vec<usize> = errors
        .iter()
        .filter(|e| e.error_type == ValidationErrorKind::Overlap)
        .map(|e| e.position)
        .collect();
    assert_eq!(overlaps, [2, 3]);
}

#[test]
fn test_validate_shouldBeDeterministicAndOrderedByPosition() {
    let subs = SubtitleCollection::from_entries(vec![
        entry(4, "00:00:01,000", "00:00:01,100", "a"),
        entry(1, "00:00:00,500", "00:00:20,000", "b\u{02}"),
        entry(3, "00:00:02,000", "00:00:01,000", ""),
    ]);
    let service = ValidationService::with_options(ValidationOptions::default());

    let first = service.validate(&subs);
    let second = service.validate(&subs);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0].position <= pair[1].position));
    assert_eq!(service.options(), &ValidationOptions::default());
}

#[test]
fn test_validate_withParsedFileAfterFix_shouldPass() {
    let content = std::fs::read_to_string(common::test_resource_path("overlapping.srt")).unwrap();
    let mut subs = SubtitleCollection::parse(&content).unwrap();
    assert!(!subs.validate(&ValidationOptions::default()).is_empty());

    subs.fix_overlaps(&Default::default());
    assert!(subs.validate(&ValidationOptions::default()).is_empty());
}

#[test]
fn test_validationErrors_shouldSerializeToJson() {
    let subs = SubtitleCollection::from_entries(vec![entry(1, "00:00:01,000", "00:00:02,000", "Alone")]);
    let errors = subs.validate(&ValidationOptions::default());
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json[0]["error_type"], "content");
    assert_eq!(json[0]["position"], 0);
}
