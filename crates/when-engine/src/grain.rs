//! Entity precision (grain) and the caller-facing grain filter.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::WhenError;

/// Precision of a temporal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Day,
    Hour,
    Minute,
    Second,
}

impl Grain {
    /// Whether this grain names a calendar date rather than a time of day.
    pub fn is_date(self) -> bool {
        matches!(self, Grain::Day)
    }

    /// One unit of this grain. Interval upper bounds are exclusive by one unit.
    pub fn unit(self) -> Duration {
        match self {
            Grain::Day => Duration::days(1),
            Grain::Hour => Duration::hours(1),
            Grain::Minute => Duration::minutes(1),
            Grain::Second => Duration::seconds(1),
        }
    }

    /// Parse a classifier grain name. Grains this crate does not handle
    /// (`week`, `month`, `year`, ...) yield `None`.
    pub fn from_classifier(name: &str) -> Option<Grain> {
        match name {
            "day" => Some(Grain::Day),
            "hour" => Some(Grain::Hour),
            "minute" => Some(Grain::Minute),
            "second" => Some(Grain::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grain::Day => "day",
            Grain::Hour => "hour",
            Grain::Minute => "minute",
            Grain::Second => "second",
        };
        f.write_str(name)
    }
}

/// Instant or interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Instant,
    Interval,
}

/// Which entities a caller is interested in.
///
/// `DateOnly` still admits time-of-day intervals so that same-day ranges
/// ("from 9 to 5 on Friday") can be collapsed to their date by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrainFilter {
    #[serde(rename = "date")]
    DateOnly,
    #[serde(rename = "time")]
    TimeOnly,
    #[default]
    Both,
}

impl GrainFilter {
    /// Whether an entity of `grain` and `shape` passes this filter.
    pub fn admits(self, grain: Grain, shape: Shape) -> bool {
        match self {
            GrainFilter::Both => true,
            GrainFilter::TimeOnly => !grain.is_date(),
            GrainFilter::DateOnly => grain.is_date() || shape == Shape::Interval,
        }
    }
}

impl FromStr for GrainFilter {
    type Err = WhenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "dates" | "date-only" => Ok(GrainFilter::DateOnly),
            "time" | "times" | "time-only" => Ok(GrainFilter::TimeOnly),
            "both" | "all" => Ok(GrainFilter::Both),
            other => Err(WhenError::InvalidGrainFilter(format!(
                "'{other}' (expected date, time or both)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_match_grain() {
        assert_eq!(Grain::Day.unit(), Duration::seconds(86_400));
        assert_eq!(Grain::Hour.unit(), Duration::seconds(3_600));
        assert_eq!(Grain::Minute.unit(), Duration::seconds(60));
        assert_eq!(Grain::Second.unit(), Duration::seconds(1));
    }

    #[test]
    fn test_unsupported_classifier_grains() {
        assert_eq!(Grain::from_classifier("hour"), Some(Grain::Hour));
        assert_eq!(Grain::from_classifier("week"), None);
        assert_eq!(Grain::from_classifier("month"), None);
        assert_eq!(Grain::from_classifier("Day"), None);
    }

    #[test]
    fn test_both_admits_everything() {
        for grain in [Grain::Day, Grain::Hour, Grain::Minute, Grain::Second] {
            assert!(GrainFilter::Both.admits(grain, Shape::Instant));
            assert!(GrainFilter::Both.admits(grain, Shape::Interval));
        }
    }

    #[test]
    fn test_time_only_rejects_days() {
        assert!(!GrainFilter::TimeOnly.admits(Grain::Day, Shape::Instant));
        assert!(!GrainFilter::TimeOnly.admits(Grain::Day, Shape::Interval));
        assert!(GrainFilter::TimeOnly.admits(Grain::Minute, Shape::Instant));
    }

    #[test]
    fn test_date_only_keeps_time_intervals_for_collapsing() {
        assert!(GrainFilter::DateOnly.admits(Grain::Day, Shape::Instant));
        assert!(GrainFilter::DateOnly.admits(Grain::Hour, Shape::Interval));
        assert!(!GrainFilter::DateOnly.admits(Grain::Hour, Shape::Instant));
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("date".parse::<GrainFilter>().unwrap(), GrainFilter::DateOnly);
        assert_eq!(" TIME ".parse::<GrainFilter>().unwrap(), GrainFilter::TimeOnly);
        assert_eq!("both".parse::<GrainFilter>().unwrap(), GrainFilter::Both);
        assert!("weekly".parse::<GrainFilter>().is_err());
    }

    #[test]
    fn test_filter_serde_names() {
        let json = serde_json::to_string(&GrainFilter::DateOnly).unwrap();
        assert_eq!(json, "\"date\"");
        let back: GrainFilter = serde_json::from_str("\"time\"").unwrap();
        assert_eq!(back, GrainFilter::TimeOnly);
    }
}
