use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::destination::Destination;
use super::flow::FlowSelector;
use super::question::{AnswerOption, Question};
use super::recommendation::SupportRoleRecommendation;

/// One account's traversal of a pinned flow version.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub id: Uuid,
    pub flow_id: Uuid,
    /// Pinned at creation; later publishes do not affect this session.
    pub flow_version_id: Uuid,
    pub target_account_id: Uuid,
    pub created_by_account_id: Uuid,
    pub patient_order_id: Option<Uuid>,
    pub completed: bool,
    pub completed_at: Option<jiff::Timestamp>,
    pub skipped: bool,
    pub skipped_at: Option<jiff::Timestamp>,
    pub crisis_indicated: bool,
    pub crisis_indicated_at: Option<jiff::Timestamp>,
    pub destination: Option<Destination>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Session {
    /// Completed or skipped sessions reject every further mutation.
    pub fn is_terminal(&self) -> bool {
        self.completed || self.skipped
    }

    /// Set the crisis flag. Returns `true` only on the first call.
    pub fn indicate_crisis(&mut self, now: jiff::Timestamp) -> bool {
        if self.crisis_indicated {
            return false;
        }
        self.crisis_indicated = true;
        self.crisis_indicated_at = Some(now);
        self.updated_at = now;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SessionStatus {
    NotStarted,
    AwaitingAnswers,
    Completed,
    Skipped,
}

/// One step of a session: a screening version being answered.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionScreening {
    pub id: Uuid,
    pub session_id: Uuid,
    pub screening_id: Uuid,
    pub screening_version_id: Uuid,
    /// 1-based, gap-free within a session.
    pub screening_order: u32,
    pub completed: bool,
    pub completed_at: Option<jiff::Timestamp>,
    pub score: Option<i32>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnsweredQuestion {
    pub id: Uuid,
    pub session_screening_id: Uuid,
    pub question_id: Uuid,
    /// Superseded answer sets stay in history with `valid = false`.
    pub valid: bool,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub id: Uuid,
    pub answered_question_id: Uuid,
    pub answer_option_id: Uuid,
    pub text: Option<String>,
    pub created_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StartSession {
    pub flow: FlowSelector,
    pub target_account_id: Uuid,
    pub created_by_account_id: Uuid,
    #[serde(default)]
    pub patient_order_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerSubmission {
    pub question_id: Uuid,
    pub answer_option_ids: Vec<Uuid>,
    #[serde(default)]
    pub freeform_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum AdvanceOutcome {
    NextScreening {
        session_screening_id: Uuid,
        screening_id: Uuid,
        screening_order: u32,
    },
    Completed {
        destination: Destination,
    },
    /// The orchestration rule closed the session without results.
    Skipped,
    /// Nothing was finished; advance again with `force` once the
    /// respondent has confirmed.
    ConfirmationRequired {
        prompt: String,
    },
}

/// Request body for advancing a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdvanceRequest {
    #[serde(default)]
    pub force: bool,
}

/// The next question a respondent should see.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NextQuestion {
    pub session_screening_id: Uuid,
    pub screening_id: Uuid,
    pub question: Question,
    pub options: Vec<AnswerOption>,
}

/// The valid answer set currently recorded for a question.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionAnswers {
    pub question_id: Uuid,
    pub answered_question_id: Uuid,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionScreeningState {
    pub screening: SessionScreening,
    pub answers: Vec<QuestionAnswers>,
}

/// Full projection of a session for clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionState {
    pub session: Session,
    pub status: SessionStatus,
    pub current_session_screening_id: Option<Uuid>,
    pub screenings: Vec<SessionScreeningState>,
    pub recommendations: Vec<SupportRoleRecommendation>,
}
