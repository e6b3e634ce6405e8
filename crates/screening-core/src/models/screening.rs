use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::definition::{Definition, VersionRecord};
use super::question::{AnswerOption, Question, QuestionDraft};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningAttributes {
    /// Free-form classifier, e.g. "phq9" or "gad7".
    pub screening_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningVersionSpec {
    pub scoring_rule: String,
    /// Questions in display order.
    pub question_ids: Vec<Uuid>,
}

pub type Screening = Definition<ScreeningAttributes>;
pub type ScreeningVersion = VersionRecord<ScreeningVersionSpec>;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewScreening {
    pub name: String,
    pub screening_type: String,
}

/// A new screening version together with the questions it owns.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningVersionDraft {
    pub scoring_rule: String,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionWithOptions {
    pub question: Question,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningVersionDetail {
    pub version: ScreeningVersion,
    pub questions: Vec<QuestionWithOptions>,
}
