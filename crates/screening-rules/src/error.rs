use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum EvaluationErrorKind {
    /// The deadline passed before the rule produced a result.
    Timeout,
    /// Unknown rule, exhausted step budget, arithmetic overflow.
    RuntimeError,
    /// The rule produced something its slot cannot use.
    InvalidResultShape,
}

impl fmt::Display for EvaluationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EvaluationErrorKind::Timeout => "TIMEOUT",
            EvaluationErrorKind::RuntimeError => "RUNTIME_ERROR",
            EvaluationErrorKind::InvalidResultShape => "INVALID_RESULT_SHAPE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{kind} in rule '{rule_id}': {message}")]
pub struct EvaluationError {
    pub kind: EvaluationErrorKind,
    pub rule_id: String,
    pub message: String,
}

impl EvaluationError {
    pub fn new(kind: EvaluationErrorKind, rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            rule_id: rule_id.to_string(),
            message: message.into(),
        }
    }

    pub fn timeout(rule_id: &str, message: impl Into<String>) -> Self {
        Self::new(EvaluationErrorKind::Timeout, rule_id, message)
    }

    pub fn runtime(rule_id: &str, message: impl Into<String>) -> Self {
        Self::new(EvaluationErrorKind::RuntimeError, rule_id, message)
    }

    pub fn shape(rule_id: &str, message: impl Into<String>) -> Self {
        Self::new(EvaluationErrorKind::InvalidResultShape, rule_id, message)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid rule id: {0:?}")]
    InvalidId(String),

    #[error("rule '{0}' is already registered with a different definition")]
    Conflict(String),

    #[error("invalid rule '{rule_id}': {message}")]
    Invalid { rule_id: String, message: String },
}
