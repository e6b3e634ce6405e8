use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AnswerFormat {
    SingleSelect,
    MultiSelect,
    /// The single answer option carries the respondent's text.
    FreeformText,
}

/// Shape expected of freeform text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ContentHint {
    #[default]
    None,
    PhoneNumber,
    EmailAddress,
    Integer,
}

/// Typed per-question configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionConfig {
    /// Advance as soon as a single-select answer is chosen.
    #[serde(default)]
    pub prefer_autosubmit: bool,
    /// The answer is a phone number that should be copied to the account.
    #[serde(default)]
    pub update_account_phone_number: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub screening_version_id: Uuid,
    pub answer_format: AnswerFormat,
    #[serde(default)]
    pub content_hint: ContentHint,
    pub question_text: String,
    #[serde(default)]
    pub intro_text: Option<String>,
    pub minimum_answer_count: u32,
    pub maximum_answer_count: u32,
    pub display_order: u32,
    #[serde(default)]
    pub config: QuestionConfig,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Question {
    /// Whether a screening can be completed without answering this question.
    pub fn is_optional(&self) -> bool {
        self.minimum_answer_count == 0
    }
}

/// An option that asks for extra text when selected ("Other, please specify").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FreeformSupplement {
    pub label: String,
    #[serde(default)]
    pub content_hint: ContentHint,
    #[serde(default)]
    pub auto_show: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub answer_option_text: String,
    pub score: i32,
    #[serde(default)]
    pub indicates_crisis: bool,
    #[serde(default)]
    pub freeform_supplement: Option<FreeformSupplement>,
    pub display_order: u32,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionDraft {
    pub answer_format: AnswerFormat,
    #[serde(default)]
    pub content_hint: ContentHint,
    pub question_text: String,
    #[serde(default)]
    pub intro_text: Option<String>,
    pub minimum_answer_count: u32,
    pub maximum_answer_count: u32,
    #[serde(default)]
    pub config: QuestionConfig,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    pub options: Vec<AnswerOptionDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerOptionDraft {
    pub answer_option_text: String,
    pub score: i32,
    #[serde(default)]
    pub indicates_crisis: bool,
    #[serde(default)]
    pub freeform_supplement: Option<FreeformSupplement>,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}
