use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io::Write;
use std::ops::{Index, IndexMut, RangeBounds};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::encoding::{self, Encoding, NATIVE_EOL};
use crate::errors::SubtitleError;
use crate::timecode::Timecode;

// @module: Subtitle parsing, formatting and manipulation

// @const: Arrow between start and end timecodes
const TIMESTAMP_SEPARATOR: &str = "-->";

// @enum: Policy applied to blocks that fail to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Abort the whole parse on the first malformed block
    Raise,
    /// Report the malformed block through the logger and skip it
    #[default]
    Log,
    /// Skip malformed blocks silently
    Pass,
}

impl FromStr for ErrorHandling {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "raise" => Ok(Self::Raise),
            "log" => Ok(Self::Log),
            "pass" => Ok(Self::Pass),
            _ => Err(anyhow::anyhow!("Invalid error handling mode: {}", s)),
        }
    }
}

/// Time shift applied to subtitle timings: the ratio (if any) is applied
/// first, then the offset is added.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeShift {
    pub offset: Timecode,
    pub ratio: Option<f64>,
}

impl TimeShift {
    pub fn by_offset(offset: Timecode) -> Self {
        Self { offset, ratio: None }
    }

    pub fn by_parts(hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        Self::by_offset(Timecode::from_parts(hours, minutes, seconds, milliseconds))
    }

    pub fn by_ratio(ratio: f64) -> Self {
        Self { offset: Timecode::ZERO, ratio: Some(ratio) }
    }

    pub fn with_offset(mut self, offset: Timecode) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }

    /// Map one timecode through the shift
    pub fn apply(&self, time: Timecode) -> Timecode {
        let scaled = match self.ratio {
            Some(ratio) => time * ratio,
            None => time,
        };
        scaled + self.offset
    }
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleEntry {
    // @field: Display sequence number (0 when the block had none)
    pub index: usize,

    // @field: Start time
    pub start: Timecode,

    // @field: End time
    pub end: Timecode,

    // @field: Subtitle text, lines separated by '\n'
    pub text: String,

    // @field: Raw coordinates trailing the end timecode, if any
    pub position: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(index: usize, start: Timecode, end: Timecode, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start,
            end,
            text: text.into(),
            position: String::new(),
        }
    }

    /// Parse one block of text (index line, time range, text lines)
    pub fn parse(block: &str) -> Result<Self, SubtitleError> {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        Self::from_lines(&lines)
    }

    // @parses: Block already split into non-blank lines
    // @returns: InvalidItem on shape errors, InvalidTimeString on bad timecodes
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, SubtitleError> {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim_end()).collect();
        let raw = || lines.join("\n");

        if lines.len() < 2 {
            return Err(SubtitleError::InvalidItem {
                line: 0,
                block: raw(),
                reason: "block needs at least a time range and one more line".to_string(),
            });
        }

        // The index line is optional: a block may open directly with its time range.
        let (index, rest) = if lines[0].contains(TIMESTAMP_SEPARATOR) {
            (0, &lines[..])
        } else {
            let index = lines[0].trim().parse::<usize>().map_err(|_| SubtitleError::InvalidItem {
                line: 0,
                block: raw(),
                reason: format!("invalid index line {:?}", lines[0]),
            })?;
            (index, &lines[1..])
        };

        let (start, end, position) = Self::split_timestamps(rest[0]).map_err(|e| match e {
            SubtitleError::InvalidItem { reason, .. } => SubtitleError::InvalidItem {
                line: 0,
                block: raw(),
                reason,
            },
            other => other,
        })?;

        Ok(SubtitleEntry {
            index,
            start,
            end,
            text: rest[1..].join("\n"),
            position,
        })
    }

    // @parses: "start --> end [position]"
    fn split_timestamps(line: &str) -> Result<(Timecode, Timecode, String), SubtitleError> {
        let parts: Vec<&str> = line.split(TIMESTAMP_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(SubtitleError::InvalidItem {
                line: 0,
                block: line.to_string(),
                reason: format!("invalid time range line {:?}", line),
            });
        }

        let end_and_position = parts[1].trim();
        let (end, position) = end_and_position
            .split_once(char::is_whitespace)
            .unwrap_or((end_and_position, ""));

        let start = Timecode::parse(parts[0].trim())?;
        let end = Timecode::parse(end)?;
        Ok((start, end, position.trim().to_string()))
    }

    /// Time between start and end (negative when the entry runs backwards)
    pub fn duration(&self) -> Timecode {
        self.end - self.start
    }

    /// Reading speed in characters per second, 0 for non-positive durations
    pub fn characters_per_second(&self) -> f64 {
        let duration_ms = self.duration().ordinal();
        if duration_ms <= 0 {
            return 0.0;
        }
        self.text.chars().count() as f64 / (duration_ms as f64 / 1000.0)
    }

    /// Apply the same shift to start and end
    pub fn shift(&mut self, shift: &TimeShift) {
        self.start = shift.apply(self.start);
        self.end = shift.apply(self.end);
    }

    /// The `(start, end)` pair entries are ordered by
    pub fn timing(&self) -> (Timecode, Timecode) {
        (self.start, self.end)
    }

    /// Compare two entries by `(start, end)`, ignoring index and text
    pub fn cmp_timing(&self, other: &SubtitleEntry) -> Ordering {
        self.timing().cmp(&other.timing())
    }

    /// Format the block using `eol` for every line break, text included
    pub fn to_srt_block(&self, eol: &str) -> String {
        let block = self.to_string();
        if eol == "\n" {
            block
        } else {
            block.replace('\n', eol)
        }
    }

    /// Formatted start timecode
    pub fn format_start_time(&self) -> String {
        self.start.to_string()
    }

    /// Formatted end timecode
    pub fn format_end_time(&self) -> String {
        self.end.to_string()
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        write!(f, "{} --> {}", self.start, self.end)?;
        if !self.position.is_empty() {
            write!(f, " {}", self.position)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.text)
    }
}

impl FromStr for SubtitleEntry {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lazily parses entries from lines of text.
///
/// Blocks are delimited by whitespace-only lines. Blocks that fail to parse
/// are raised, logged or skipped according to the stream's `ErrorHandling`.
/// After a raised error the stream ends.
pub struct SubtitleStream<I> {
    lines: I,
    error_handling: ErrorHandling,
    line_number: usize,
    block_end_line: usize,
    buffer: Vec<String>,
    finished: bool,
}

impl<I> SubtitleStream<I> {
    pub fn new(lines: I, error_handling: ErrorHandling) -> Self {
        SubtitleStream {
            lines,
            error_handling,
            line_number: 0,
            block_end_line: 0,
            buffer: Vec::new(),
            finished: false,
        }
    }
}

impl<I, S> Iterator for SubtitleStream<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<SubtitleEntry, SubtitleError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    let line = line.as_ref();
                    if !line.trim().is_empty() {
                        self.buffer.push(line.to_string());
                        self.block_end_line = self.line_number;
                        continue;
                    }
                }
                None => self.finished = true,
            }

            if self.buffer.is_empty() {
                continue;
            }

            let block = std::mem::take(&mut self.buffer);
            match SubtitleEntry::from_lines(&block) {
                Ok(entry) => return Some(Ok(entry)),
                Err(error) => {
                    let raw = block.join("\n");
                    let error = error.at_line(self.block_end_line, &raw);
                    match self.error_handling {
                        ErrorHandling::Raise => {
                            self.finished = true;
                            return Some(Err(error));
                        }
                        ErrorHandling::Log => {
                            warn!(
                                "Skipping malformed subtitle block ({} at line {}): {}\n{}",
                                error.kind_name(),
                                self.block_end_line,
                                error,
                                raw
                            );
                        }
                        ErrorHandling::Pass => {}
                    }
                }
            }
        }
        None
    }
}

// @struct: Options for whole-document parsing
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    // @field: Encoding used when the input has no BOM (UTF-8 if unset)
    pub encoding: Option<Encoding>,

    // @field: Newline to serialize with instead of the detected one
    pub eol: Option<String>,

    // @field: Malformed block policy
    pub error_handling: ErrorHandling,
}

impl ParseOptions {
    pub fn with_error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = error_handling;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

// @struct: Overrides applied when writing a document
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub eol: Option<String>,
    pub encoding: Option<Encoding>,
    pub write_bom: bool,
}

/// Time boundaries for [`SubtitleCollection::slice`]; all set bounds must hold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub starts_before: Option<Timecode>,
    pub starts_after: Option<Timecode>,
    pub ends_before: Option<Timecode>,
    pub ends_after: Option<Timecode>,
}

impl TimeRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts_before(mut self, time: impl Into<Timecode>) -> Self {
        self.starts_before = Some(time.into());
        self
    }

    pub fn starts_after(mut self, time: impl Into<Timecode>) -> Self {
        self.starts_after = Some(time.into());
        self
    }

    pub fn ends_before(mut self, time: impl Into<Timecode>) -> Self {
        self.ends_before = Some(time.into());
        self
    }

    pub fn ends_after(mut self, time: impl Into<Timecode>) -> Self {
        self.ends_after = Some(time.into());
        self
    }

    pub fn contains(&self, entry: &SubtitleEntry) -> bool {
        self.starts_before.is_none_or(|t| entry.start < t)
            && self.starts_after.is_none_or(|t| entry.start > t)
            && self.ends_before.is_none_or(|t| entry.end < t)
            && self.ends_after.is_none_or(|t| entry.end > t)
    }
}

/// Mutable view over a subset of a collection's entries.
///
/// Changes made through the view land in the collection it came from.
#[derive(Debug)]
pub struct SubtitleSlice<'a> {
    entries: Vec<&'a mut SubtitleEntry>,
    eol: String,
    encoding: Encoding,
    bom: bool,
}

impl SubtitleSlice<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&SubtitleEntry> {
        self.entries.get(position).map(|e| &**e)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut SubtitleEntry> {
        self.entries.get_mut(position).map(|e| &mut **e)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubtitleEntry> {
        self.entries.iter().map(|e| &**e)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SubtitleEntry> {
        self.entries.iter_mut().map(|e| &mut **e)
    }

    pub fn shift(&mut self, shift: &TimeShift) {
        self.iter_mut().for_each(|entry| entry.shift(shift));
    }

    pub fn text(&self) -> String {
        self.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Copy the viewed entries into an independent collection
    pub fn to_collection(&self) -> SubtitleCollection {
        SubtitleCollection {
            entries: self.iter().cloned().collect(),
            eol: self.eol.clone(),
            encoding: self.encoding,
            bom: self.bom,
        }
    }
}

/// Ordered collection of subtitle entries with document settings
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    entries: Vec<SubtitleEntry>,

    /// Newline used when serializing
    pub eol: String,

    /// Encoding the document was decoded from, and is written with by default
    pub encoding: Encoding,

    /// Whether the source started with a byte-order mark; kept on save
    pub bom: bool,
}

impl Default for SubtitleCollection {
    fn default() -> Self {
        SubtitleCollection {
            entries: Vec::new(),
            eol: NATIVE_EOL.to_string(),
            encoding: Encoding::default(),
            bom: false,
        }
    }
}

impl SubtitleCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding `entries` in the given order
    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection {
            entries,
            ..Self::default()
        }
    }

    pub fn with_eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    /// Stream entries out of an iterator of lines
    pub fn stream<I, S>(lines: I, error_handling: ErrorHandling) -> SubtitleStream<I::IntoIter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SubtitleStream::new(lines.into_iter(), error_handling)
    }

    /// Parse SRT text with default options
    pub fn parse(content: &str) -> Result<Self, SubtitleError> {
        Self::parse_with(content, &ParseOptions::default())
    }

    /// Parse SRT text that has already been decoded
    pub fn parse_with(content: &str, options: &ParseOptions) -> Result<Self, SubtitleError> {
        let bom = content.starts_with('\u{feff}');
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let eol = options
            .eol
            .clone()
            .or_else(|| encoding::detect_eol(content).map(str::to_string))
            .unwrap_or_else(|| NATIVE_EOL.to_string());

        let entries = Self::stream(content.lines(), options.error_handling)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Parsed {} subtitle entries", entries.len());

        Ok(SubtitleCollection {
            entries,
            eol,
            encoding: options.encoding.unwrap_or_default(),
            bom,
        })
    }

    /// Decode and parse raw document bytes
    pub fn from_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Self, SubtitleError> {
        let (content, encoding) = encoding::decode_document(bytes, options.encoding)?;
        let mut collection = Self::parse_with(&content, options)?;
        collection.encoding = encoding;
        collection.bom = Encoding::sniff_bom(bytes).is_some();
        Ok(collection)
    }

    /// Read and parse an SRT file
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self, SubtitleError> {
        let bytes = fs::read(path.as_ref())?;
        debug!("Read {} bytes from {}", bytes.len(), path.as_ref().display());
        Self::from_bytes(&bytes, options)
    }

    /// Serialize to SRT text, using `eol` or the collection's own newline
    pub fn to_srt_string(&self, eol: Option<&str>) -> String {
        let eol = eol.unwrap_or(&self.eol);
        let blank = eol.repeat(2);

        let mut out = String::new();
        for entry in &self.entries {
            let block = entry.to_srt_block(eol);
            out.push_str(&block);
            if !block.ends_with(&blank) {
                out.push_str(eol);
            }
        }
        out
    }

    /// Serialize and encode.
    ///
    /// A BOM read from the source is written back unless the encoding changes.
    pub fn to_bytes(&self, options: &SaveOptions) -> Result<Vec<u8>, SubtitleError> {
        let text = self.to_srt_string(options.eol.as_deref());
        let encoding = options.encoding.unwrap_or(self.encoding);
        let keep_bom = self.bom && encoding == self.encoding;
        encoding.encode(&text, options.write_bom || keep_bom)
    }

    /// Write the encoded document to any writer
    pub fn write_to<W: Write>(&self, writer: &mut W, options: &SaveOptions) -> Result<(), SubtitleError> {
        writer.write_all(&self.to_bytes(options)?)?;
        Ok(())
    }

    /// Write to a file with the collection's own settings
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        self.save_with(path, &SaveOptions::default())
    }

    /// Write to a file, overriding newline, encoding or BOM
    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<(), SubtitleError> {
        let bytes = self.to_bytes(options)?;
        fs::write(path.as_ref(), bytes)?;
        debug!("Wrote {} entries to {}", self.entries.len(), path.as_ref().display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SubtitleEntry> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SubtitleEntry> {
        self.entries.iter_mut()
    }

    pub fn get(&self, position: usize) -> Option<&SubtitleEntry> {
        self.entries.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut SubtitleEntry> {
        self.entries.get_mut(position)
    }

    /// Replace the entry at `position`, returning the previous one.
    /// Out-of-bounds positions leave the collection untouched and return `None`.
    pub fn set(&mut self, position: usize, entry: SubtitleEntry) -> Option<SubtitleEntry> {
        self.entries
            .get_mut(position)
            .map(|slot| std::mem::replace(slot, entry))
    }

    pub fn push(&mut self, entry: SubtitleEntry) {
        self.entries.push(entry);
    }

    /// Insert at `position`.
    ///
    /// # Panics
    /// Panics if `position > len`.
    pub fn insert(&mut self, position: usize, entry: SubtitleEntry) {
        self.entries.insert(position, entry);
    }

    pub fn remove(&mut self, position: usize) -> Option<SubtitleEntry> {
        (position < self.entries.len()).then(|| self.entries.remove(position))
    }

    /// Replace a range of entries, returning the removed ones.
    ///
    /// # Panics
    /// Panics if the range is out of bounds.
    pub fn replace_range<R, I>(&mut self, range: R, replace_with: I) -> Vec<SubtitleEntry>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = SubtitleEntry>,
    {
        self.entries.splice(range, replace_with).collect()
    }

    pub fn retain<F: FnMut(&SubtitleEntry) -> bool>(&mut self, keep: F) {
        self.entries.retain(keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries matching every bound of `range`, in collection order
    pub fn slice(&self, range: &TimeRange) -> Vec<&SubtitleEntry> {
        self.entries.iter().filter(|e| range.contains(e)).collect()
    }

    /// Mutable view of the entries matching every bound of `range`
    pub fn slice_mut(&mut self, range: &TimeRange) -> SubtitleSlice<'_> {
        self.view_where(|e| range.contains(e))
    }

    /// Entries on screen at `time` (start inclusive, end exclusive)
    pub fn at(&self, time: impl Into<Timecode>) -> Vec<&SubtitleEntry> {
        let time = time.into();
        self.entries
            .iter()
            .filter(|e| e.start <= time && time < e.end)
            .collect()
    }

    /// Mutable view of the entries on screen at `time`
    pub fn at_mut(&mut self, time: impl Into<Timecode>) -> SubtitleSlice<'_> {
        let time = time.into();
        self.view_where(|e| e.start <= time && time < e.end)
    }

    fn view_where<F: Fn(&SubtitleEntry) -> bool>(&mut self, predicate: F) -> SubtitleSlice<'_> {
        SubtitleSlice {
            entries: self.entries.iter_mut().filter(|e| predicate(e)).collect(),
            eol: self.eol.clone(),
            encoding: self.encoding,
            bom: self.bom,
        }
    }

    /// Shift every entry
    pub fn shift(&mut self, shift: &TimeShift) {
        self.entries.iter_mut().for_each(|entry| entry.shift(shift));
    }

    /// Stable sort by `(start, end)`
    pub fn sort(&mut self) {
        self.entries.sort_by(SubtitleEntry::cmp_timing);
    }

    /// Sort by timing, then renumber entries `1..=len`
    pub fn clean_indexes(&mut self) {
        self.sort();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.index = i + 1;
        }
    }

    /// Every entry's text joined by a single newline
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_srt_string(None))
    }
}

impl FromStr for SubtitleCollection {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Index<usize> for SubtitleCollection {
    type Output = SubtitleEntry;

    fn index(&self, position: usize) -> &SubtitleEntry {
        &self.entries[position]
    }
}

impl IndexMut<usize> for SubtitleCollection {
    fn index_mut(&mut self, position: usize) -> &mut SubtitleEntry {
        &mut self.entries[position]
    }
}

impl IntoIterator for SubtitleCollection {
    type Item = SubtitleEntry;
    type IntoIter = std::vec::IntoIter<SubtitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SubtitleCollection {
    type Item = &'a SubtitleEntry;
    type IntoIter = std::slice::Iter<'a, SubtitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a mut SubtitleCollection {
    type Item = &'a mut SubtitleEntry;
    type IntoIter = std::slice::IterMut<'a, SubtitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter_mut()
    }
}

impl FromIterator<SubtitleEntry> for SubtitleCollection {
    fn from_iter<T: IntoIterator<Item = SubtitleEntry>>(iter: T) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

impl Extend<SubtitleEntry> for SubtitleCollection {
    fn extend<T: IntoIterator<Item = SubtitleEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
