//! End-to-end resolution: message text → resolved expressions.
//!
//! [`Resolver`] owns nothing but its classifier. Every call builds its own
//! candidate lists and signature sets, so one resolver can serve any number
//! of concurrent calls by shared reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::ambiguity::disambiguate;
use crate::classifier::{ClassificationRequest, Classifier, MAX_MESSAGE_CHARS};
use crate::context::ReferenceContext;
use crate::error::{Result, WhenError};
use crate::format::{format_entity, ResolvedExpression};
use crate::grain::GrainFilter;
use crate::normalize::extract_entities;
use crate::resolve::resolve_candidates;

/// Options for [`Resolver::resolve_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Which entities to resolve.
    pub grain_filter: GrainFilter,
    /// Longest message, in characters, sent to the classifier.
    pub max_message_chars: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            grain_filter: GrainFilter::Both,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }
}

impl ResolveOptions {
    pub fn with_grain_filter(grain_filter: GrainFilter) -> Self {
        Self {
            grain_filter,
            ..Self::default()
        }
    }
}

/// Resolves the time expressions of a message through a [`Classifier`].
#[derive(Debug, Clone)]
pub struct Resolver<C> {
    classifier: C,
}

impl<C: Classifier> Resolver<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Resolve `text` with default options (all grains).
    pub async fn resolve(
        &self,
        text: &str,
        context: &ReferenceContext,
    ) -> Result<Vec<ResolvedExpression>> {
        self.resolve_with_options(text, context, &ResolveOptions::default())
            .await
    }

    /// Resolve `text` as written at `context`.
    ///
    /// # Errors
    ///
    /// Returns [`WhenError::Processing`] if the classifier call fails or its
    /// answer is not shaped like a result, and [`WhenError::MalformedEntity`]
    /// if an entity inside a well-shaped answer cannot be read. No partial
    /// result is ever returned alongside an error.
    pub async fn resolve_with_options(
        &self,
        text: &str,
        context: &ReferenceContext,
        options: &ResolveOptions,
    ) -> Result<Vec<ResolvedExpression>> {
        let request = ClassificationRequest::with_limit(text, context, options.max_message_chars);

        let payload = self.classifier.classify(&request).await.map_err(|e| {
            error!(error = %e, "classifier call failed");
            WhenError::transport(e.to_string())
        })?;

        resolve_payload(&payload, context, options.grain_filter)
    }
}

/// Resolve an already-obtained classifier payload.
///
/// This is the pure part of [`Resolver::resolve_with_options`]: the same
/// payload, context and filter always produce the same expressions.
///
/// # Errors
///
/// Same as [`Resolver::resolve_with_options`], minus transport failures.
pub fn resolve_payload(
    payload: &Value,
    context: &ReferenceContext,
    filter: GrainFilter,
) -> Result<Vec<ResolvedExpression>> {
    let entities = extract_entities(payload, filter).inspect_err(|e| {
        if e.failure_kind().is_some() {
            error!(error = %e, %payload, "classifier returned an unknown result");
        }
    })?;
    debug!(count = entities.len(), ?filter, "entities extracted");

    let mut expressions = Vec::with_capacity(entities.len());
    for entity in entities {
        let candidates = resolve_candidates(&entity, context)?;
        let resolution = disambiguate(candidates);
        let tokens = format_entity(&resolution, filter, context)?;
        if tokens.is_empty() {
            warn!(body = %entity.source_text, "couldn't find any values for entity");
            continue;
        }
        expressions.push(ResolvedExpression {
            source_text: entity.source_text,
            tokens,
        });
    }
    Ok(expressions)
}
