//! Ambiguity resolver.
//!
//! The classifier may offer several readings of one mention: "at 5" comes back
//! as both 05:00 and 17:00, sometimes on two different days. When two readings
//! share the same wall-clock time, the *date* part is what the classifier is
//! unsure about, so the whole entity falls back to a clock-only style and the
//! repeated reading is dropped. A lone reading keeps its full date and time.

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::format::DisplayStyle;
use crate::resolve::ResolvedCandidate;

/// Wall-clock fingerprint of a candidate, used to spot repeated readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSignature {
    Instant(NaiveTime),
    Interval { from: NaiveTime, to: NaiveTime },
}

impl TimeSignature {
    pub fn of(candidate: &ResolvedCandidate) -> Self {
        match candidate {
            ResolvedCandidate::Instant { at, .. } => TimeSignature::Instant(at.time()),
            ResolvedCandidate::Interval { from, to, .. } => TimeSignature::Interval {
                from: from.time(),
                to: to.time(),
            },
        }
    }
}

/// The candidates kept for one entity and the style they all render in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation {
    pub style: DisplayStyle,
    pub retained: Vec<ResolvedCandidate>,
}

impl Disambiguation {
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Decide what to keep of one entity's candidates, and how to show it.
///
/// Day-grain candidates are all kept and always render as a long date. For
/// time-of-day grains, the first candidate of each [`TimeSignature`] is kept;
/// any repeat switches the entire entity to [`DisplayStyle::ShortTime`],
/// including candidates kept before the repeat was seen.
pub fn disambiguate(candidates: Vec<ResolvedCandidate>) -> Disambiguation {
    let date_grain = candidates.first().is_some_and(|c| c.grain().is_date());
    if date_grain {
        return Disambiguation {
            style: DisplayStyle::LongDate,
            retained: candidates,
        };
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    let mut style = DisplayStyle::FullDateTime;
    let mut retained = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(TimeSignature::of(&candidate)) {
            retained.push(candidate);
        } else {
            style = DisplayStyle::ShortTime;
        }
    }
    Disambiguation { style, retained }
}
