use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A single user-facing validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of an accepted answer submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionResult {
    pub valid: bool,
    pub answered_question_id: Uuid,
    /// False when the submission matched the stored answer set exactly.
    pub changed: bool,
    pub crisis_indicated: bool,
}
