//! Entity filter & normalizer.
//!
//! Turns a raw classifier payload into [`TemporalEntity`] values: one per
//! datetime mention, with a settled shape and grain. Open-ended intervals
//! ("until Friday", "after 5pm") become instants of their single bound, and
//! entities the caller did not ask for are dropped here, before any time
//! arithmetic happens.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::classifier::DATETIME_ENTITY_KEY;
use crate::error::{Result, WhenError};
use crate::grain::{Grain, GrainFilter, Shape};

/// One raw candidate reading, as the classifier wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Instant(String),
    Interval { from: String, to: String },
}

/// A datetime mention with a settled shape and grain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalEntity {
    /// The span of the original message this entity was read from.
    pub source_text: String,
    pub shape: Shape,
    pub grain: Grain,
    /// Candidate readings in classifier order. Every value matches `shape`.
    pub raw_values: Vec<RawValue>,
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireKind {
    Value,
    Interval,
}

#[derive(Debug, Deserialize)]
struct WireBound {
    value: String,
    grain: String,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    from: Option<WireBound>,
    #[serde(default)]
    to: Option<WireBound>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    body: String,
    #[serde(rename = "type")]
    kind: WireKind,
    #[serde(default)]
    grain: Option<String>,
    #[serde(default)]
    from: Option<WireBound>,
    #[serde(default)]
    to: Option<WireBound>,
    values: Vec<WireValue>,
}

/// Which part of each wire value becomes the candidate.
#[derive(Debug, Clone, Copy)]
enum Pick {
    Value,
    From,
    To,
    Both,
}

// ── extract_entities ────────────────────────────────────────────────────────

/// Extract the datetime entities of `payload` that pass `filter`.
///
/// # Errors
///
/// Returns [`WhenError::Processing`] (shape failure) if the payload has no
/// `entities` object, or a non-empty one without the datetime key. Returns
/// [`WhenError::MalformedEntity`] if an individual entity cannot be read.
pub fn extract_entities(payload: &Value, filter: GrainFilter) -> Result<Vec<TemporalEntity>> {
    let entities = payload
        .get("entities")
        .and_then(Value::as_object)
        .ok_or_else(|| WhenError::shape("response has no 'entities' object"))?;

    if entities.is_empty() {
        return Ok(Vec::new());
    }

    let datetimes = entities
        .get(DATETIME_ENTITY_KEY)
        .ok_or_else(|| WhenError::shape(format!("response has no '{DATETIME_ENTITY_KEY}' key")))?
        .as_array()
        .ok_or_else(|| WhenError::shape(format!("'{DATETIME_ENTITY_KEY}' is not a list")))?;

    let mut out = Vec::with_capacity(datetimes.len());
    for raw in datetimes {
        let wire = WireEntity::deserialize(raw)
            .map_err(|e| WhenError::MalformedEntity(format!("{e} in {raw}")))?;
        let Some(entity) = normalize_entity(wire)? else {
            continue;
        };
        if !filter.admits(entity.grain, entity.shape) {
            debug!(
                body = %entity.source_text,
                grain = %entity.grain,
                "entity excluded by grain filter"
            );
            continue;
        }
        out.push(entity);
    }
    Ok(out)
}

/// Settle shape and grain. `Ok(None)` means the grain is not one this crate
/// resolves (weeks, months, ...).
fn normalize_entity(wire: WireEntity) -> Result<Option<TemporalEntity>> {
    let (shape, grain_name, pick) = match wire.kind {
        WireKind::Value => {
            let grain = wire.grain.ok_or_else(|| {
                WhenError::MalformedEntity(format!("value entity '{}' has no grain", wire.body))
            })?;
            (Shape::Instant, grain, Pick::Value)
        }
        WireKind::Interval => match (&wire.from, &wire.to) {
            (Some(from), Some(_)) => (Shape::Interval, from.grain.clone(), Pick::Both),
            (None, Some(to)) => (Shape::Instant, to.grain.clone(), Pick::To),
            (Some(from), None) => (Shape::Instant, from.grain.clone(), Pick::From),
            (None, None) => {
                return Err(WhenError::MalformedEntity(format!(
                    "interval entity '{}' has neither bound",
                    wire.body
                )))
            }
        },
    };

    let Some(grain) = Grain::from_classifier(&grain_name) else {
        debug!(body = %wire.body, grain = %grain_name, "unsupported grain");
        return Ok(None);
    };

    let raw_values = wire
        .values
        .into_iter()
        .map(|v| pick_value(v, pick, &wire.body))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TemporalEntity {
        source_text: wire.body,
        shape,
        grain,
        raw_values,
    }))
}

fn pick_value(value: WireValue, pick: Pick, body: &str) -> Result<RawValue> {
    let missing = |what: &str| {
        WhenError::MalformedEntity(format!("a value of '{body}' has no '{what}'"))
    };
    match pick {
        Pick::Value => value.value.map(RawValue::Instant).ok_or_else(|| missing("value")),
        Pick::From => value
            .from
            .map(|b| RawValue::Instant(b.value))
            .ok_or_else(|| missing("from")),
        Pick::To => value
            .to
            .map(|b| RawValue::Instant(b.value))
            .ok_or_else(|| missing("to")),
        Pick::Both => {
            let from = value.from.ok_or_else(|| missing("from"))?;
            let to = value.to.ok_or_else(|| missing("to"))?;
            Ok(RawValue::Interval {
                from: from.value,
                to: to.value,
            })
        }
    }
}
