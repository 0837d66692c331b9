/*!
 * Overlap repair for subtitle timelines.
 *
 * A single left-to-right pass looks at each pair of consecutive entries and,
 * when the gap between them is smaller than the buffer, moves the end of the
 * earlier entry. The later entry is never touched, and an adjustment is
 * never re-checked against the entry before it.
 *
 * The new duration is bounded below by a reading-time estimate derived from
 * the word count, so an entry that is already short can end up *longer* than
 * it was. That is the formula's behavior and is kept as is.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::SubtitleCollection;
use crate::timecode::Timecode;

/// Minimum gap between consecutive subtitles
pub const DEFAULT_BUFFER_MS: i64 = 20;

/// Floor for the duration of a shortened subtitle
pub const DEFAULT_MIN_DURATION_MS: i64 = 1_500;

/// Baseline reading speed
pub const DEFAULT_WORDS_PER_SECOND: f64 = 2.5;

const OPTIMAL_DURATION_FLOOR_MS: i64 = 1_500;
const OPTIMAL_DURATION_CEILING_MS: i64 = 6_000;

/// Configuration for overlap repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapFixConfig {
    /// Required gap between an entry's end and the next entry's start
    #[serde(default = "default_buffer_ms")]
    pub buffer_ms: i64,

    /// Shortened entries never go below this duration
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: i64,

    /// Reading speed used for the optimal duration estimate
    #[serde(default = "default_words_per_second")]
    pub words_per_second: f64,
}

fn default_buffer_ms() -> i64 {
    DEFAULT_BUFFER_MS
}

fn default_min_duration_ms() -> i64 {
    DEFAULT_MIN_DURATION_MS
}

fn default_words_per_second() -> f64 {
    DEFAULT_WORDS_PER_SECOND
}

impl Default for OverlapFixConfig {
    fn default() -> Self {
        Self {
            buffer_ms: DEFAULT_BUFFER_MS,
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            words_per_second: DEFAULT_WORDS_PER_SECOND,
        }
    }
}

impl OverlapFixConfig {
    pub fn with_buffer_ms(mut self, buffer_ms: i64) -> Self {
        self.buffer_ms = buffer_ms;
        self
    }
}

/// One end-time change made by the repair pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapAdjustment {
    /// 0-based position of the adjusted entry
    pub position: usize,
    pub old_end: Timecode,
    pub new_end: Timecode,
}

impl OverlapAdjustment {
    /// Whether the adjustment moved the end later instead of earlier
    pub fn lengthened(&self) -> bool {
        self.new_end > self.old_end
    }
}

/// Reading time for `text` at the default speed, clamped to 1.5s..=6s
pub fn calculate_optimal_duration_ms(text: &str) -> i64 {
    optimal_duration_ms(text, DEFAULT_WORDS_PER_SECOND)
}

/// Reading time for `text` at `words_per_second`, clamped to 1.5s..=6s
pub fn optimal_duration_ms(text: &str, words_per_second: f64) -> i64 {
    let word_count = text.split_whitespace().count();
    if word_count == 0 {
        return OPTIMAL_DURATION_FLOOR_MS;
    }

    let duration_ms = ((word_count as f64 / words_per_second) * 1000.0) as i64;
    duration_ms.clamp(OPTIMAL_DURATION_FLOOR_MS, OPTIMAL_DURATION_CEILING_MS)
}

/// Repair overlaps in place, returning the adjustments made
pub fn fix_overlapping_subtitles(
    collection: &mut SubtitleCollection,
    config: &OverlapFixConfig,
) -> Vec<OverlapAdjustment> {
    let mut adjustments = Vec::new();

    for i in 0..collection.len().saturating_sub(1) {
        let next_start = collection[i + 1].start;
        let current = &mut collection[i];

        let gap_ms = (next_start - current.end).ordinal();
        if gap_ms >= config.buffer_ms {
            continue;
        }

        let adjustment_needed = config.buffer_ms - gap_ms;
        let current_duration_ms = current.duration().ordinal();

        let optimal = optimal_duration_ms(&current.text, config.words_per_second);
        let min_acceptable = config.min_duration_ms.max(optimal / 2);
        let new_duration_ms = min_acceptable.max(current_duration_ms - adjustment_needed);

        let new_end = current.start + Timecode::from_millis(new_duration_ms);
        if new_end != current.end {
            debug!(
                "Entry {} end {} -> {} (gap was {}ms)",
                current.index, current.end, new_end, gap_ms
            );
            adjustments.push(OverlapAdjustment {
                position: i,
                old_end: current.end,
                new_end,
            });
        }
        current.end = new_end;
    }

    debug!("Overlap repair adjusted {} entries", adjustments.len());
    adjustments
}

/// Repair overlaps on a copy, leaving `collection` untouched
pub fn with_overlaps_fixed(
    collection: &SubtitleCollection,
    config: &OverlapFixConfig,
) -> SubtitleCollection {
    let mut copy = collection.clone();
    fix_overlapping_subtitles(&mut copy, config);
    copy
}

impl SubtitleCollection {
    /// Repair overlaps in place; returns `self` for chaining
    pub fn fix_overlaps(&mut self, config: &OverlapFixConfig) -> &mut Self {
        fix_overlapping_subtitles(self, config);
        self
    }

    /// Repaired copy of this collection
    pub fn overlaps_fixed(&self, config: &OverlapFixConfig) -> SubtitleCollection {
        with_overlaps_fixed(self, config)
    }
}
