//! Formatter: kept candidates → display tokens.
//!
//! A token is an `(epoch seconds, style)` pair. Intervals become a range of
//! two tokens whose upper bound is pulled back by one grain unit, so that
//! "June 1 to June 4 (exclusive)" shows as "June 1 to June 3".

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::ambiguity::Disambiguation;
use crate::context::ReferenceContext;
use crate::error::{Result, WhenError};
use crate::grain::{Grain, GrainFilter};
use crate::resolve::ResolvedCandidate;

/// How precisely a timestamp is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    /// Date only, e.g. "June 1, 2023".
    LongDate,
    /// Date and time, e.g. "June 1, 2023 5:00 PM".
    FullDateTime,
    /// Time only, e.g. "5:00 PM".
    ShortTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayToken {
    pub epoch: i64,
    pub style: DisplayStyle,
}

impl DisplayToken {
    pub fn new(at: DateTime<FixedOffset>, style: DisplayStyle) -> Self {
        Self {
            epoch: at.timestamp(),
            style,
        }
    }
}

/// One rendered reading of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpressionToken {
    At { at: DisplayToken },
    /// Both bounds are inclusive here; the exclusive-bound correction has
    /// already been applied.
    Range { from: DisplayToken, to: DisplayToken },
}

/// The final output for one mention in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExpression {
    pub source_text: String,
    pub tokens: Vec<ExpressionToken>,
}

/// Render the kept candidates of one entity.
///
/// Under [`GrainFilter::DateOnly`], time-of-day intervals that start and end
/// on the same day collapse to a single long date; cross-day ranges and
/// entities that were downgraded to [`DisplayStyle::ShortTime`] yield nothing.
///
/// # Errors
///
/// Returns [`WhenError::MalformedEntity`] if an upper bound cannot be pulled
/// back without leaving the representable range.
pub fn format_entity(
    resolution: &Disambiguation,
    filter: GrainFilter,
    context: &ReferenceContext,
) -> Result<Vec<ExpressionToken>> {
    let style = resolution.style;
    let mut tokens = Vec::with_capacity(resolution.retained.len());
    for candidate in &resolution.retained {
        match *candidate {
            ResolvedCandidate::Instant { at, grain } => {
                if filter == GrainFilter::DateOnly && !grain.is_date() {
                    continue;
                }
                tokens.push(ExpressionToken::At {
                    at: DisplayToken::new(at, style),
                });
            }
            ResolvedCandidate::Interval { from, to, grain } => {
                let last = last_included(to, grain, context)?;
                if filter == GrainFilter::DateOnly && !grain.is_date() {
                    if style == DisplayStyle::ShortTime || from.date_naive() != last.date_naive() {
                        continue;
                    }
                    tokens.push(ExpressionToken::At {
                        at: DisplayToken::new(from, DisplayStyle::LongDate),
                    });
                    continue;
                }
                tokens.push(ExpressionToken::Range {
                    from: DisplayToken::new(from, style),
                    to: DisplayToken::new(last, style),
                });
            }
        }
    }
    Ok(tokens)
}

/// The last moment shown for an interval whose upper bound is `to` (exclusive).
///
/// Days step back on the calendar and keep their wall-clock time, even when
/// a DST change falls in between. Time-of-day grains step back in elapsed
/// time.
fn last_included(
    to: DateTime<FixedOffset>,
    grain: Grain,
    context: &ReferenceContext,
) -> Result<DateTime<FixedOffset>> {
    let out_of_range =
        || WhenError::MalformedEntity(format!("upper bound '{}' is out of range", to.to_rfc3339()));
    if grain.is_date() {
        let naive = to
            .naive_local()
            .checked_sub_signed(grain.unit())
            .ok_or_else(out_of_range)?;
        context.localize(naive)
    } else {
        to.checked_sub_signed(grain.unit()).ok_or_else(out_of_range)
    }
}
