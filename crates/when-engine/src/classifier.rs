//! The seam to the external natural-language time classifier.
//!
//! The engine never talks to a network itself. Callers inject anything that
//! implements [`Classifier`]; the call is the only suspend point of a
//! resolution.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::context::ReferenceContext;

/// Entity key under which the classifier reports datetime mentions.
pub const DATETIME_ENTITY_KEY: &str = "wit$datetime:datetime";

/// Longest message, in characters, handed to the classifier.
pub const MAX_MESSAGE_CHARS: usize = 280;

/// A failed classifier call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The service answered with a non-success status.
    #[error("received HTTP status {0}")]
    Status(u16),

    /// The service answered successfully but flagged an error in its body.
    #[error("received error in response: {0}")]
    Service(String),

    /// The service could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// One classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Message text, already truncated (by default to [`MAX_MESSAGE_CHARS`]).
    pub text: String,
    /// Reference instant as an RFC 3339 local string.
    pub reference_time: String,
}

impl ClassificationRequest {
    pub fn new(text: &str, context: &ReferenceContext) -> Self {
        Self::with_limit(text, context, MAX_MESSAGE_CHARS)
    }

    pub fn with_limit(text: &str, context: &ReferenceContext, max_chars: usize) -> Self {
        Self {
            text: truncate_message(text, max_chars).to_string(),
            reference_time: context.classifier_time(),
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `request`, returning the raw structured payload.
    async fn classify(&self, request: &ClassificationRequest) -> Result<Value, ClassifierError>;
}

/// A classifier that always gives the same answer.
///
/// Used to replay a captured response (the CLI's `--response` mode) and as a
/// test double.
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    outcome: Result<Value, ClassifierError>,
}

impl StaticClassifier {
    pub fn responding(payload: Value) -> Self {
        Self {
            outcome: Ok(payload),
        }
    }

    pub fn failing(error: ClassifierError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    async fn classify(&self, _request: &ClassificationRequest) -> Result<Value, ClassifierError> {
        self.outcome.clone()
    }
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_message(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Shorten `text` for display, replacing the tail with `...` when it does not
/// fit in `max_chars` characters. The result never exceeds `max_chars`; below
/// 4 characters there is no room for the ellipsis and the text is cut bare.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return truncate_message(text, max_chars).to_string();
    }
    let keep = max_chars - ELLIPSIS.len();
    format!("{}{}", truncate_message(text, keep), ELLIPSIS)
}

const ELLIPSIS: &str = "...";
