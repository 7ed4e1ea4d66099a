//! The reference instant every expression is anchored to.
//!
//! A [`ReferenceContext`] is "when and where the message was written": an
//! absolute instant plus, when known, the author's IANA timezone. Date-grain
//! entities borrow its wall-clock time. Naive classifier timestamps are
//! interpreted in the timezone's offset *on their own date*, or in the fixed
//! offset of the reference instant when no zone is known.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

use crate::error::WhenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceContext {
    instant: DateTime<FixedOffset>,
    zone: Option<Tz>,
}

impl ReferenceContext {
    /// A context with a fixed offset and no timezone rules.
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            zone: None,
        }
    }

    /// Build a context from an RFC 3339 string such as
    /// `"2023-06-01T10:00:00-07:00"`. The offset in the string is kept and
    /// applies to every date.
    ///
    /// # Errors
    ///
    /// Returns [`WhenError::InvalidDatetime`] if the string cannot be parsed.
    pub fn from_rfc3339(s: &str) -> Result<Self, WhenError> {
        DateTime::parse_from_rfc3339(s.trim())
            .map(Self::new)
            .map_err(|e| WhenError::InvalidDatetime(format!("'{}': {}", s, e)))
    }

    /// Build a context for `instant` as seen from an IANA timezone.
    ///
    /// # Errors
    ///
    /// Returns [`WhenError::InvalidTimezone`] if `timezone` is not a valid IANA name.
    pub fn in_timezone(instant: DateTime<Utc>, timezone: &str) -> Result<Self, WhenError> {
        let tz = parse_timezone(timezone)?;
        let offset = instant.with_timezone(&tz).offset().fix();
        Ok(Self {
            instant: instant.with_timezone(&offset),
            zone: Some(tz),
        })
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// UTC offset of the reference instant itself.
    pub fn offset(&self) -> FixedOffset {
        *self.instant.offset()
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.zone
    }

    /// Wall-clock time of the reference instant, truncated to whole seconds.
    pub fn wall_clock(&self) -> NaiveTime {
        let time = self.instant.time();
        time.with_nanosecond(0).unwrap_or(time)
    }

    /// The reference instant as sent to the classifier (RFC 3339, local offset).
    pub fn classifier_time(&self) -> String {
        self.instant.to_rfc3339()
    }

    /// Anchor a naive local timestamp.
    ///
    /// With a timezone, the offset in effect at `naive` is used. A wall-clock
    /// time repeated by a backward shift takes its first occurrence; one
    /// skipped by a forward shift is read with the offset from before the
    /// shift (02:30 on a spring-forward night lands at 03:30).
    ///
    /// # Errors
    ///
    /// Returns [`WhenError::MalformedEntity`] if the result is outside the
    /// representable range.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, WhenError> {
        let offset = match self.zone {
            None => self.offset(),
            Some(tz) => match tz.offset_from_local_datetime(&naive) {
                LocalResult::Single(o) => o.fix(),
                LocalResult::Ambiguous(earliest, _) => earliest.fix(),
                LocalResult::None => offset_before_gap(tz, naive)?,
            },
        };
        naive
            .checked_sub_offset(offset)
            .map(|utc| DateTime::from_naive_utc_and_offset(utc, offset))
            .ok_or_else(|| out_of_range(naive))
    }
}

/// Offset in effect a day before a skipped wall-clock time.
fn offset_before_gap(tz: Tz, naive: NaiveDateTime) -> Result<FixedOffset, WhenError> {
    let earlier = naive
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(|| out_of_range(naive))?;
    Ok(tz.offset_from_utc_datetime(&earlier).fix())
}

fn out_of_range(naive: NaiveDateTime) -> WhenError {
    WhenError::MalformedEntity(format!("timestamp '{naive}' is out of range"))
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz, WhenError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| WhenError::InvalidTimezone(format!("'{}'", s)))
}
