use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one field check: whether it passed and, if not, the message to
/// show next to the field.
///
/// Serialized as a `[valid, message]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(bool, String)", from = "(bool, String)")]
pub struct FieldResult {
    pub valid: bool,
    pub message: String,
}

impl FieldResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

impl From<FieldResult> for (bool, String) {
    fn from(result: FieldResult) -> Self {
        (result.valid, result.message)
    }
}

impl From<(bool, String)> for FieldResult {
    fn from((valid, message): (bool, String)) -> Self {
        Self { valid, message }
    }
}

/// Check result for a single-valued field, or one result per element for the
/// multi-valued ones (images, social network links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldCheck {
    Single(FieldResult),
    Many(Vec<FieldResult>),
}

impl FieldCheck {
    pub fn is_valid(&self) -> bool {
        match self {
            FieldCheck::Single(result) => result.valid,
            FieldCheck::Many(results) => results.iter().all(|r| r.valid),
        }
    }
}

/// Body returned by the event submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub saved: bool,
    pub fields: BTreeMap<String, FieldCheck>,
}
