//! Grain resolver: raw classifier values → absolute candidate instants.
//!
//! Day-grain values only say *which day*; they take their time of day from
//! the reference instant, so "tomorrow" means "this time tomorrow". Hour,
//! minute and second grains already carry a full local timestamp and are only
//! anchored in the reference timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::context::ReferenceContext;
use crate::error::{Result, WhenError};
use crate::grain::Grain;
use crate::normalize::{RawValue, TemporalEntity};

/// One absolute reading of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedCandidate {
    Instant {
        at: DateTime<FixedOffset>,
        grain: Grain,
    },
    /// `to` is exclusive: the first moment after the interval.
    Interval {
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        grain: Grain,
    },
}

impl ResolvedCandidate {
    pub fn grain(&self) -> Grain {
        match self {
            ResolvedCandidate::Instant { grain, .. } | ResolvedCandidate::Interval { grain, .. } => {
                *grain
            }
        }
    }
}

/// Resolve every raw value of `entity`, in classifier order.
///
/// # Errors
///
/// Returns [`WhenError::MalformedEntity`] if a value is not a readable
/// timestamp or falls outside the representable range.
pub fn resolve_candidates(
    entity: &TemporalEntity,
    context: &ReferenceContext,
) -> Result<Vec<ResolvedCandidate>> {
    let grain = entity.grain;
    let anchor = |raw: &str| -> Result<DateTime<FixedOffset>> {
        let naive = parse_local_timestamp(raw)?;
        let naive = if grain.is_date() {
            naive.date().and_time(context.wall_clock())
        } else {
            naive
        };
        context.localize(naive)
    };

    entity
        .raw_values
        .iter()
        .map(|raw| match raw {
            RawValue::Instant(value) => Ok(ResolvedCandidate::Instant {
                at: anchor(value)?,
                grain,
            }),
            RawValue::Interval { from, to } => Ok(ResolvedCandidate::Interval {
                from: anchor(from)?,
                to: anchor(to)?,
                grain,
            }),
        })
        .collect()
}

/// Read a classifier timestamp as local wall-clock time.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]`, the same with a UTC offset (which is
/// ignored; the reference timezone decides the offset), and a bare `YYYY-MM-DD`.
pub fn parse_local_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| WhenError::MalformedEntity(format!("unreadable timestamp '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grain::Shape;

    fn ctx() -> ReferenceContext {
        ReferenceContext::from_rfc3339("2023-06-01T09:00:00-07:00").unwrap()
    }

    fn entity(grain: Grain, shape: Shape, raw_values: Vec<RawValue>) -> TemporalEntity {
        TemporalEntity {
            source_text: "test".to_string(),
            shape,
            grain,
            raw_values,
        }
    }

    fn instant(s: &str) -> RawValue {
        RawValue::Instant(s.to_string())
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    // ── parse_local_timestamp ───────────────────────────────────────────

    #[test]
    fn test_parse_naive_timestamp() {
        let t = parse_local_timestamp("2023-06-02T05:00:00").unwrap();
        assert_eq!(t.to_string(), "2023-06-02 05:00:00");
    }

    #[test]
    fn test_parse_fractional_with_offset_drops_offset() {
        let t = parse_local_timestamp("2023-06-02T05:00:00.000-07:00").unwrap();
        assert_eq!(t.to_string(), "2023-06-02 05:00:00");
        let t = parse_local_timestamp("2023-06-02T05:00:00.000+09:00").unwrap();
        assert_eq!(t.to_string(), "2023-06-02 05:00:00");
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let t = parse_local_timestamp("2023-06-04").unwrap();
        assert_eq!(t.to_string(), "2023-06-04 00:00:00");
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let err = parse_local_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, WhenError::MalformedEntity(_)));
    }

    // ── day grain ───────────────────────────────────────────────────────

    #[test]
    fn test_day_instant_takes_reference_wall_clock() {
        let e = entity(Grain::Day, Shape::Instant, vec![instant("2023-06-05T00:00:00.000-07:00")]);
        let candidates = resolve_candidates(&e, &ctx()).unwrap();
        assert_eq!(
            candidates,
            vec![ResolvedCandidate::Instant {
                at: at("2023-06-05T09:00:00-07:00"),
                grain: Grain::Day,
            }]
        );
    }

    #[test]
    fn test_day_interval_both_bounds_take_wall_clock() {
        let e = entity(
            Grain::Day,
            Shape::Interval,
            vec![RawValue::Interval {
                from: "2023-06-01".to_string(),
                to: "2023-06-04".to_string(),
            }],
        );
        let candidates = resolve_candidates(&e, &ctx()).unwrap();
        assert_eq!(
            candidates,
            vec![ResolvedCandidate::Interval {
                from: at("2023-06-01T09:00:00-07:00"),
                to: at("2023-06-04T09:00:00-07:00"),
                grain: Grain::Day,
            }]
        );
    }

    // ── time-of-day grains ──────────────────────────────────────────────

    #[test]
    fn test_hour_instant_used_as_is() {
        let e = entity(Grain::Hour, Shape::Instant, vec![instant("2023-06-02T05:00:00")]);
        let candidates = resolve_candidates(&e, &ctx()).unwrap();
        assert_eq!(
            candidates,
            vec![ResolvedCandidate::Instant {
                at: at("2023-06-02T05:00:00-07:00"),
                grain: Grain::Hour,
            }]
        );
    }

    #[test]
    fn test_multiple_candidates_keep_order() {
        let e = entity(
            Grain::Minute,
            Shape::Instant,
            vec![
                instant("2023-06-01T17:30:00"),
                instant("2023-06-02T05:30:00"),
                instant("2023-06-01T17:30:00"),
            ],
        );
        let candidates = resolve_candidates(&e, &ctx()).unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[1],
            ResolvedCandidate::Instant {
                at: at("2023-06-02T05:30:00-07:00"),
                grain: Grain::Minute,
            }
        );
        assert_eq!(candidates[0], candidates[2]);
    }

    #[test]
    fn test_bad_value_fails_whole_entity() {
        let e = entity(
            Grain::Hour,
            Shape::Instant,
            vec![instant("2023-06-02T05:00:00"), instant("soon")],
        );
        assert!(resolve_candidates(&e, &ctx()).is_err());
    }

    #[test]
    fn test_candidate_grain() {
        let c = ResolvedCandidate::Interval {
            from: at("2023-06-01T09:00:00-07:00"),
            to: at("2023-06-01T10:00:00-07:00"),
            grain: Grain::Second,
        };
        assert_eq!(c.grain(), Grain::Second);
    }

    // ── across a DST change ─────────────────────────────────────────────

    fn los_angeles_in_october() -> ReferenceContext {
        // 2023-10-20 10:00 PDT
        let utc = chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2023, 10, 20, 17, 0, 0).unwrap();
        ReferenceContext::in_timezone(utc, "America/Los_Angeles").unwrap()
    }

    fn anchored(candidate: &ResolvedCandidate) -> String {
        match candidate {
            ResolvedCandidate::Instant { at, .. } => at.to_rfc3339(),
            other => panic!("expected an instant, got {other:?}"),
        }
    }

    #[test]
    fn test_hour_value_after_fall_back_takes_standard_offset() {
        let e = entity(
            Grain::Hour,
            Shape::Instant,
            vec![instant("2023-11-10T17:00:00.000-08:00")],
        );
        let candidates = resolve_candidates(&e, &los_angeles_in_october()).unwrap();
        assert_eq!(anchored(&candidates[0]), "2023-11-10T17:00:00-08:00");
    }

    #[test]
    fn test_day_value_after_fall_back_keeps_local_wall_clock() {
        let e = entity(Grain::Day, Shape::Instant, vec![instant("2023-11-10T00:00:00.000-08:00")]);
        let candidates = resolve_candidates(&e, &los_angeles_in_october()).unwrap();
        assert_eq!(anchored(&candidates[0]), "2023-11-10T10:00:00-08:00");
    }

    #[test]
    fn test_out_of_range_value_is_malformed() {
        let e = entity(Grain::Hour, Shape::Instant, vec![instant("-262143-01-01T00:00:00")]);
        // East of UTC, the earliest representable day has no UTC instant.
        let ctx = ReferenceContext::from_rfc3339("2023-06-01T09:00:00+09:00").unwrap();
        let err = resolve_candidates(&e, &ctx).unwrap_err();
        assert!(matches!(err, WhenError::MalformedEntity(_)), "got: {err:?}");
    }
}
