/*!
 * Integration tests for subtitle processing workflow
 */

use anyhow::Result;
use std::fs;

use subrip::app_config::Config;
use subrip::app_controller::Controller;
use subrip::{
    Encoding, ParseOptions, SaveOptions, SubtitleCollection, SubtitleEntry, TimeRange, TimeShift,
    ValidationErrorKind, ValidationOptions,
};

use crate::common::{self, tc};

/// Test that we can load, modify, and save subtitles in a full workflow
#[test]
fn test_subtitle_workflow_withFullProcess_shouldSucceed() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;

    // Build a collection by hand, out of order and with stale indexes
    let mut collection = SubtitleCollection::new().with_eol("\n");
    collection.push(SubtitleEntry::new(7, tc("00:00:05,500"), tc("00:00:10,000"), "Second subtitle"));
    collection.push(SubtitleEntry::new(3, tc("00:00:00,000"), tc("00:00:05,000"), "First subtitle"));
    collection.push(SubtitleEntry::new(9, tc("00:00:10,500"), tc("00:00:15,000"), "Third subtitle"));
    collection.clean_indexes();

    let subtitle_path = temp_dir.path().join("test.srt");
    collection.save(&subtitle_path)?;

    // Reload and edit
    let mut loaded = SubtitleCollection::open(&subtitle_path, &ParseOptions::default())?;
    assert_eq!(loaded, collection);
    for entry in loaded.iter_mut() {
        entry.text = format!("Edited: {}", entry.text);
    }
    loaded.shift(&TimeShift::by_parts(0, 0, 1, 0));
    loaded.save(&subtitle_path)?;

    let content = fs::read_to_string(&subtitle_path)?;
    assert!(content.starts_with("1\n00:00:01,000 --> 00:00:06,000\nEdited: First subtitle\n\n"));
    assert!(loaded.validate(&ValidationOptions::default()).is_empty());
    Ok(())
}

#[test]
fn test_subtitle_workflow_withCrlfLatinFile_shouldRoundTripBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text = "1\r\n00:00:01,000 --> 00:00:02,000\r\nGar\u{e7}on, caf\u{e9}!\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\n\u{c0} bient\u{f4}t\r\n\r\n";
    let bytes = Encoding::Latin1.encode(text, false)?;
    let path = common::create_test_file(temp_dir.path(), "latin.srt", &bytes)?;

    let options = ParseOptions::default().with_encoding(Encoding::Latin1);
    let subs = SubtitleCollection::open(&path, &options)?;
    assert_eq!(subs[0].text, "Garçon, café!");
    assert_eq!(subs.eol, "\r\n");

    let out = temp_dir.path().join("copy.srt");
    subs.save(&out)?;
    assert_eq!(fs::read(&out)?, bytes);

    // Re-encode as UTF-8 with LF and a BOM
    let utf8 = SaveOptions {
        eol: Some("\n".to_string()),
        encoding: Some(Encoding::Utf8),
        write_bom: true,
    };
    subs.save_with(&out, &utf8)?;
    let reread = SubtitleCollection::open(&out, &ParseOptions::default())?;
    assert_eq!(reread.entries(), subs.entries());
    assert_eq!(reread.encoding, Encoding::Utf8);
    assert_eq!(reread.eol, "\n");
    assert!(reread.bom);
    Ok(())
}

#[test]
fn test_subtitle_workflow_sliceEditAndExtract_shouldStayConsistent() -> Result<()> {
    let mut subs = SubtitleCollection::parse(common::SAMPLE_SRT)?;

    let range = TimeRange::new().starts_after(tc("00:00:04,000"));
    {
        let mut later = subs.slice_mut(&range);
        assert_eq!(later.len(), 2);
        later.shift(&TimeShift::by_offset(tc("00:01:00,000")));
        later.get_mut(0).unwrap().text.push_str(" (moved)");
    }

    assert_eq!(subs[1].start, tc("00:01:05,000"));
    assert_eq!(subs[1].text, "It contains multiple entries. (moved)");

    let extracted = subs.slice_mut(&range).to_collection();
    assert_eq!(extracted.len(), 2);
    assert_eq!(extracted.eol, subs.eol);

    let on_screen = subs.at(tc("00:01:12,000"));
    assert_eq!(on_screen.len(), 1);
    assert_eq!(on_screen[0].index, 3);
    Ok(())
}

#[test]
fn test_subtitle_workflow_checkFixCheck_shouldClearAllProblems() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("movie.srt");
    fs::copy(common::test_resource_path("overlapping.srt"), &input)?;

    let controller = Controller::with_config(Config::default())?;

    let before = controller.run_check(&input)?;
    assert!(before.has_errors());
    assert_eq!(
        before.files[0].errors[0].error_type,
        ValidationErrorKind::Overlap
    );

    let fixed = controller.run_fix(&input, None)?;
    let after = controller.run_check(&fixed.outputs[0])?;
    assert!(!after.has_errors());
    Ok(())
}
