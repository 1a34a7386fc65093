//! Tolerant decoding of generator responses.
//!
//! Generative backends do not always honour "return only JSON": the answer
//! may arrive wrapped in a Markdown code fence, or as an `{error, detail}`
//! envelope. Decoding tries an ordered list of parse strategies and reports
//! the result as a [`RequestOutcome`] instead of an error chain.

use log::debug;
use serde_json::Value;

use crate::error::PlannerError;

/// Result of one bounded call to the recipe generator.
///
/// Exactly one variant is produced per call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Success(Value),
    ApplicationError(String),
    MalformedPayload,
    /// Carries the deadline that elapsed, in milliseconds
    Timeout(u64),
    TransportError(String),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    /// Map the outcome onto the error taxonomy so callers can use `?`.
    pub fn into_result(self) -> Result<Value, PlannerError> {
        match self {
            RequestOutcome::Success(value) => Ok(value),
            RequestOutcome::ApplicationError(msg) => Err(PlannerError::Application(msg)),
            RequestOutcome::MalformedPayload => Err(PlannerError::MalformedPayload),
            RequestOutcome::Timeout(ms) => Err(PlannerError::Timeout {
                secs: ms.div_ceil(1000),
            }),
            RequestOutcome::TransportError(msg) => Err(PlannerError::Transport(msg)),
        }
    }
}

type ParseStrategy = fn(&str) -> Option<Value>;

/// Parse strategies in the order they are attempted.
const STRATEGIES: &[(&str, ParseStrategy)] = &[("strict", parse_strict), ("unfenced", parse_unfenced)];

fn parse_strict(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_unfenced(text: &str) -> Option<Value> {
    serde_json::from_str(&strip_code_fences(text)).ok()
}

/// Language tags stripped after an opening fence, matched case-insensitively.
const FENCE_TAGS: &[&str] = &["tabular-data-json", "json"];

/// Remove every triple-backtick fence (and a `json` tag that may follow it),
/// then trim surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];

        if let Some(tag) = FENCE_TAGS.iter().find(|tag| {
            rest.get(..tag.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(tag))
        }) {
            rest = &rest[tag.len()..];
        }
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Parse `text` as JSON, falling back to fence stripping.
///
/// Returns `None` when no strategy produced a value.
pub fn parse_tolerant(text: &str) -> Option<Value> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let value = strategy(text)?;
        debug!("Response body decoded with '{}' strategy", name);
        Some(value)
    })
}

/// Decode a raw response body into a tagged outcome.
///
/// Only object-shaped payloads are checked for an `error` field; any other
/// JSON value is returned as a success unchanged.
pub fn decode(text: &str) -> RequestOutcome {
    let Some(value) = parse_tolerant(text) else {
        return RequestOutcome::MalformedPayload;
    };

    match error_envelope(&value) {
        Some(message) => RequestOutcome::ApplicationError(message),
        None => RequestOutcome::Success(value),
    }
}

/// Format an `{error, detail}` envelope as `"error: detail"` or `"error"`.
///
/// Returns `None` when `value` is not an object or its `error` is falsy.
pub fn error_envelope(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let error = object.get("error").filter(|e| is_truthy(e))?;

    Some(match object.get("detail").filter(|d| is_truthy(d)) {
        Some(detail) => format!("{}: {}", as_message(error), as_message(detail)),
        None => as_message(error),
    })
}

/// Render a JSON value as message text; strings lose their quotes.
pub(crate) fn as_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness, which the backends rely on for envelopes.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
