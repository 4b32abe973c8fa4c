//! Pulls the single JSON object out of free-form model output.
//!
//! Models asked for JSON still tend to wrap it in prose ("Here you go: {...}
//! thanks"). The span from the first `{` to the last `}` is taken as the
//! object. This is a heuristic: several JSON-looking fragments in one reply
//! produce one bogus span, which then fails to parse.

use crate::domain::model::{strip_escaped_newlines, SkipReason};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// No `{`, no `}`, or the last `}` comes before the first `{`.
    NoJsonObject { raw: String },
    /// A span was found but it is not a JSON object.
    InvalidJson {
        raw: String,
        candidate: String,
        message: String,
    },
}

impl ExtractionError {
    pub fn raw(&self) -> &str {
        match self {
            ExtractionError::NoJsonObject { raw } => raw,
            ExtractionError::InvalidJson { raw, .. } => raw,
        }
    }

    /// The substring that was handed to the JSON parser; empty when none was found.
    pub fn candidate(&self) -> &str {
        match self {
            ExtractionError::NoJsonObject { .. } => "",
            ExtractionError::InvalidJson { candidate, .. } => candidate,
        }
    }
}

impl From<ExtractionError> for SkipReason {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::NoJsonObject { .. } => SkipReason::NoJsonObject,
            ExtractionError::InvalidJson { message, .. } => SkipReason::InvalidJson(message),
        }
    }
}

/// Candidate span, first `{` through last `}` inclusive.
pub fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let span = json_span(raw).ok_or_else(|| ExtractionError::NoJsonObject {
        raw: raw.to_string(),
    })?;

    let candidate = strip_escaped_newlines(span);

    serde_json::from_str::<Map<String, Value>>(&candidate).map_err(|e| {
        ExtractionError::InvalidJson {
            raw: raw.to_string(),
            candidate: candidate.clone(),
            message: e.to_string(),
        }
    })
}
