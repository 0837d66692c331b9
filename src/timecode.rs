/*!
 * Millisecond-precision subtitle timecodes.
 *
 * A `Timecode` is a signed count of milliseconds since the start of the
 * media. The hour/minute/second/millisecond components are derived from that
 * count on demand and are never stored separately.
 */

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

// Comma is canonical, dot and colon are accepted before the milliseconds.
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*:\s*(\d+)\s*[,.:]\s*(\d+)\s*$").unwrap()
});

/// A point in (or offset along) a subtitle timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode {
    ordinal: i64,
}

impl Timecode {
    /// Timecode at the very start of the media
    pub const ZERO: Timecode = Timecode { ordinal: 0 };

    /// Create a timecode from a total number of milliseconds
    pub const fn from_millis(ordinal: i64) -> Self {
        Timecode { ordinal }
    }

    /// Create a timecode from components, each of which may overflow into
    /// the next larger unit (e.g. 65 minutes is 1 hour 5 minutes).
    pub const fn from_parts(hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        Timecode {
            ordinal: hours * MS_PER_HOUR
                + minutes * MS_PER_MINUTE
                + seconds * MS_PER_SECOND
                + milliseconds,
        }
    }

    /// Like `from_parts`, but `None` when the total does not fit in an `i64`
    pub fn checked_from_parts(hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Option<Self> {
        let ordinal = hours
            .checked_mul(MS_PER_HOUR)?
            .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
            .checked_add(milliseconds)?;
        Some(Timecode { ordinal })
    }

    /// Create a timecode from a number of seconds, rounded to the millisecond
    pub fn from_seconds(seconds: f64) -> Self {
        Timecode::from_millis((seconds * MS_PER_SECOND as f64).round() as i64)
    }

    /// Total milliseconds
    pub const fn ordinal(&self) -> i64 {
        self.ordinal
    }

    pub const fn is_negative(&self) -> bool {
        self.ordinal < 0
    }

    pub fn hours(&self) -> i64 {
        self.ordinal.div_euclid(MS_PER_HOUR)
    }

    pub fn minutes(&self) -> i64 {
        self.ordinal.rem_euclid(MS_PER_HOUR) / MS_PER_MINUTE
    }

    pub fn seconds(&self) -> i64 {
        self.ordinal.rem_euclid(MS_PER_MINUTE) / MS_PER_SECOND
    }

    pub fn milliseconds(&self) -> i64 {
        self.ordinal.rem_euclid(MS_PER_SECOND)
    }

    /// Replace the hour component, keeping the others
    pub fn set_hours(&mut self, hours: i64) {
        *self = Timecode::from_parts(hours, self.minutes(), self.seconds(), self.milliseconds());
    }

    /// Replace the minute component, keeping the others
    pub fn set_minutes(&mut self, minutes: i64) {
        *self = Timecode::from_parts(self.hours(), minutes, self.seconds(), self.milliseconds());
    }

    /// Replace the second component, keeping the others
    pub fn set_seconds(&mut self, seconds: i64) {
        *self = Timecode::from_parts(self.hours(), self.minutes(), seconds, self.milliseconds());
    }

    /// Replace the millisecond component, keeping the others
    pub fn set_milliseconds(&mut self, milliseconds: i64) {
        *self = Timecode::from_parts(self.hours(), self.minutes(), self.seconds(), milliseconds);
    }

    /// Scale by a ratio, rounding to the nearest millisecond
    pub fn scale(&self, ratio: f64) -> Self {
        Timecode::from_millis((self.ordinal as f64 * ratio).round() as i64)
    }

    /// Convert to a `Duration`, or `None` if the timecode is negative
    pub fn to_duration(&self) -> Option<Duration> {
        u64::try_from(self.ordinal).ok().map(Duration::from_millis)
    }

    /// Parse `HH:MM:SS,mmm`
    pub fn parse(source: &str) -> Result<Self, SubtitleError> {
        let caps = TIMECODE_REGEX
            .captures(source)
            .ok_or_else(|| SubtitleError::invalid_time(source))?;

        let mut parts = [0i64; 4];
        for (slot, part) in parts.iter_mut().zip(caps.iter().skip(1)) {
            let digits = part.map(|m| m.as_str()).unwrap_or_default();
            *slot = digits
                .parse()
                .map_err(|_| SubtitleError::invalid_time(source))?;
        }

        let [hours, minutes, seconds, millis] = parts;
        Timecode::checked_from_parts(hours, minutes, seconds, millis)
            .ok_or_else(|| SubtitleError::invalid_time(source))
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        let absolute = self.ordinal.unsigned_abs();
        let (hour, minute, second) = (MS_PER_HOUR as u64, MS_PER_MINUTE as u64, MS_PER_SECOND as u64);
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            absolute / hour,
            absolute % hour / minute,
            absolute % minute / second,
            absolute % second
        )
    }
}

impl FromStr for Timecode {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timecode::parse(s)
    }
}

impl From<(i64, i64, i64, i64)> for Timecode {
    fn from((hours, minutes, seconds, milliseconds): (i64, i64, i64, i64)) -> Self {
        Timecode::from_parts(hours, minutes, seconds, milliseconds)
    }
}

impl From<Duration> for Timecode {
    fn from(duration: Duration) -> Self {
        Timecode::from_millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, rhs: Timecode) -> Timecode {
        Timecode::from_millis(self.ordinal + rhs.ordinal)
    }
}

impl Sub for Timecode {
    type Output = Timecode;

    fn sub(self, rhs: Timecode) -> Timecode {
        Timecode::from_millis(self.ordinal - rhs.ordinal)
    }
}

impl Mul<f64> for Timecode {
    type Output = Timecode;

    fn mul(self, ratio: f64) -> Timecode {
        self.scale(ratio)
    }
}

impl Neg for Timecode {
    type Output = Timecode;

    fn neg(self) -> Timecode {
        Timecode::from_millis(self.ordinal.saturating_neg())
    }
}

impl AddAssign for Timecode {
    fn add_assign(&mut self, rhs: Timecode) {
        self.ordinal += rhs.ordinal;
    }
}

impl SubAssign for Timecode {
    fn sub_assign(&mut self, rhs: Timecode) {
        self.ordinal -= rhs.ordinal;
    }
}
