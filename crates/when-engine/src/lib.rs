//! # when-engine
//!
//! Turns the time mentions of a chat message into timestamp tokens anyone can
//! read in their own timezone.
//!
//! The heavy lifting of reading free text is done by an external
//! natural-language classifier. This crate takes its structured answer and
//! makes it exact: it anchors every reading to the moment and offset the
//! message was written in, drops readings the classifier could not decide
//! between, and applies the exclusive-bound convention to ranges.
//!
//! ## Modules
//!
//! - [`classifier`] — The classifier seam: request type, async trait, static replay
//! - [`normalize`] — Payload → entities with a settled shape and grain; grain filtering
//! - [`resolve`] — Entity values → absolute candidate instants
//! - [`ambiguity`] — Repeated wall-clock readings → dedup and display style
//! - [`format`] — Kept candidates → `(epoch, style)` display tokens
//! - [`markup`] — `<t:EPOCH:STYLE>` rendering of display tokens
//! - [`engine`] — The end-to-end [`Resolver`]
//! - [`context`] — The reference instant
//! - [`grain`] — Grains and the grain filter
//! - [`error`] — Error types

pub mod ambiguity;
pub mod classifier;
pub mod context;
pub mod engine;
pub mod error;
pub mod format;
pub mod grain;
pub mod markup;
pub mod normalize;
pub mod resolve;

pub use ambiguity::{disambiguate, Disambiguation, TimeSignature};
pub use classifier::{
    truncate_for_display, truncate_message, ClassificationRequest, Classifier, ClassifierError,
    StaticClassifier, DATETIME_ENTITY_KEY, MAX_MESSAGE_CHARS,
};
pub use context::ReferenceContext;
pub use engine::{resolve_payload, ResolveOptions, Resolver};
pub use error::{FailureKind, WhenError};
pub use format::{format_entity, DisplayStyle, DisplayToken, ExpressionToken, ResolvedExpression};
pub use grain::{Grain, GrainFilter, Shape};
pub use markup::{render_expression_token, render_token};
pub use normalize::{extract_entities, RawValue, TemporalEntity};
pub use resolve::{parse_local_timestamp, resolve_candidates, ResolvedCandidate};
