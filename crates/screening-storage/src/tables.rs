use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::models::flow::{FlowAttributes, FlowVersionSpec};
use screening_core::models::question::{AnswerOption, Question};
use screening_core::models::recommendation::SupportRoleRecommendation;
use screening_core::models::screening::{ScreeningAttributes, ScreeningVersionSpec};
use screening_core::models::session::{Answer, AnsweredQuestion, Session, SessionScreening};
use screening_core::models::triage::TriageGroup;
use screening_rules::error::RegistryError;
use screening_rules::{RuleRegistry, RuleSpec};

use crate::error::StorageError;
use crate::table::{Change, Row, Table};
use crate::versions::VersionLog;

macro_rules! row {
    ($ty:ty) => {
        impl Row for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
    ($ty:ty, $parent:ident) => {
        impl Row for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn parent_id(&self) -> Option<Uuid> {
                Some(self.$parent)
            }
        }
    };
}

row!(Question, screening_version_id);
row!(AnswerOption, question_id);
row!(Session);
row!(SessionScreening, session_id);
row!(AnsweredQuestion, session_screening_id);
row!(Answer, answered_question_id);
row!(SupportRoleRecommendation, session_id);
row!(TriageGroup, patient_order_id);

/// Every persisted row, keyed by surrogate id.
///
/// Writes go through [`Table`], which journals prior rows so that a failed
/// transaction is undone in place instead of discarding a copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub flows: VersionLog<FlowAttributes, FlowVersionSpec>,
    #[serde(default)]
    pub screenings: VersionLog<ScreeningAttributes, ScreeningVersionSpec>,
    #[serde(default)]
    pub questions: Table<Question>,
    #[serde(default)]
    pub answer_options: Table<AnswerOption>,
    #[serde(default)]
    pub sessions: Table<Session>,
    #[serde(default)]
    pub session_screenings: Table<SessionScreening>,
    #[serde(default)]
    pub answered_questions: Table<AnsweredQuestion>,
    #[serde(default)]
    pub answers: Table<Answer>,
    #[serde(default)]
    pub recommendations: Table<SupportRoleRecommendation>,
    #[serde(default)]
    pub triage_groups: Table<TriageGroup>,
    #[serde(default = "RuleRegistry::with_builtins")]
    rules: RuleRegistry,
    /// Registry as of the last commit, kept while a transaction has
    /// registered rules.
    #[serde(skip)]
    rules_before: Option<RuleRegistry>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            flows: VersionLog::default(),
            screenings: VersionLog::default(),
            questions: Table::default(),
            answer_options: Table::default(),
            sessions: Table::default(),
            session_screenings: Table::default(),
            answered_questions: Table::default(),
            answers: Table::default(),
            recommendations: Table::default(),
            triage_groups: Table::default(),
            rules: RuleRegistry::with_builtins(),
            rules_before: None,
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

impl Tables {
    pub(crate) fn rollback(&mut self) {
        self.flows.rollback();
        self.screenings.rollback();
        self.questions.rollback();
        self.answer_options.rollback();
        self.sessions.rollback();
        self.session_screenings.rollback();
        self.answered_questions.rollback();
        self.answers.rollback();
        self.recommendations.rollback();
        self.triage_groups.rollback();
        if let Some(rules) = self.rules_before.take() {
            self.rules = rules;
        }
    }

    pub(crate) fn commit(&mut self) {
        self.flows.commit();
        self.screenings.commit();
        self.questions.commit();
        self.answer_options.commit();
        self.sessions.commit();
        self.session_screenings.commit();
        self.answered_questions.commit();
        self.answers.commit();
        self.recommendations.commit();
        self.triage_groups.commit();
        self.rules_before = None;
    }

    /// Rows written since the last commit.
    pub(crate) fn changes(&self) -> Result<Vec<Change>, StorageError> {
        let mut out = Vec::new();
        self.flows.changes("flows", &mut out)?;
        self.screenings.changes("screenings", &mut out)?;
        self.questions.changes("questions", &mut out)?;
        self.answer_options.changes("answer_options", &mut out)?;
        self.sessions.changes("sessions", &mut out)?;
        self.session_screenings.changes("session_screenings", &mut out)?;
        self.answered_questions.changes("answered_questions", &mut out)?;
        self.answers.changes("answers", &mut out)?;
        self.recommendations.changes("recommendations", &mut out)?;
        self.triage_groups.changes("triage_groups", &mut out)?;
        if self.rules_before.is_some() {
            out.push(Change {
                table: "rules".to_string(),
                id: Uuid::nil(),
                row: serde_json::to_value(&self.rules)?,
            });
        }
        Ok(out)
    }

    /// Replay one logged row onto loaded tables.
    pub(crate) fn apply(&mut self, change: Change) -> Result<(), StorageError> {
        let table = change.table.clone();
        match table.as_str() {
            "questions" => self.questions.apply(change),
            "answer_options" => self.answer_options.apply(change),
            "sessions" => self.sessions.apply(change),
            "session_screenings" => self.session_screenings.apply(change),
            "answered_questions" => self.answered_questions.apply(change),
            "answers" => self.answers.apply(change),
            "recommendations" => self.recommendations.apply(change),
            "triage_groups" => self.triage_groups.apply(change),
            "rules" => {
                self.rules = serde_json::from_value(change.row)?;
                Ok(())
            }
            name => match name.split_once('.') {
                Some(("flows", part)) => self.flows.apply(part, change),
                Some(("screenings", part)) => self.screenings.apply(part, change),
                _ => Err(StorageError::UnknownTable(name.to_string())),
            },
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

impl Tables {
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn register_rule(&mut self, rule_id: &str, spec: RuleSpec) -> Result<bool, RegistryError> {
        let first_write = self.rules_before.is_none();
        if first_write {
            self.rules_before = Some(self.rules.clone());
        }
        let result = self.rules.register(rule_id, spec);
        if first_write && !matches!(result, Ok(true)) {
            self.rules_before = None;
        }
        result
    }
}

// ============================================================================
// Catalog
// ============================================================================

impl Tables {
    pub fn question(&self, id: Uuid) -> Result<&Question, StorageError> {
        self.questions
            .get(&id)
            .ok_or_else(|| StorageError::not_found("question", id))
    }

    pub fn answer_option(&self, id: Uuid) -> Result<&AnswerOption, StorageError> {
        self.answer_options
            .get(&id)
            .ok_or_else(|| StorageError::not_found("answer option", id))
    }

    /// Questions of a screening version in display order.
    pub fn questions_for_version(&self, screening_version_id: Uuid) -> Vec<&Question> {
        let mut questions: Vec<_> = self.questions.children_of(screening_version_id).collect();
        questions.sort_by_key(|q| q.display_order);
        questions
    }

    /// Options of a question in display order.
    pub fn options_for_question(&self, question_id: Uuid) -> Vec<&AnswerOption> {
        let mut options: Vec<_> = self.answer_options.children_of(question_id).collect();
        options.sort_by_key(|o| o.display_order);
        options
    }
}

// ============================================================================
// Sessions
// ============================================================================

impl Tables {
    pub fn session(&self, id: Uuid) -> Result<&Session, StorageError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| StorageError::not_found("session", id))
    }

    pub fn session_mut(&mut self, id: Uuid) -> Result<&mut Session, StorageError> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("session", id))
    }

    pub fn session_screening(&self, id: Uuid) -> Result<&SessionScreening, StorageError> {
        self.session_screenings
            .get(&id)
            .ok_or_else(|| StorageError::not_found("session screening", id))
    }

    pub fn session_screening_mut(&mut self, id: Uuid) -> Result<&mut SessionScreening, StorageError> {
        self.session_screenings
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("session screening", id))
    }

    /// Screenings of a session ordered by `screening_order`.
    pub fn session_screenings_for(&self, session_id: Uuid) -> Vec<&SessionScreening> {
        let mut screenings: Vec<_> = self.session_screenings.children_of(session_id).collect();
        screenings.sort_by_key(|s| s.screening_order);
        screenings
    }

    /// The screening with the highest order, i.e. the one being answered.
    pub fn current_session_screening(&self, session_id: Uuid) -> Option<&SessionScreening> {
        self.session_screenings
            .children_of(session_id)
            .max_by_key(|s| s.screening_order)
    }

    pub fn next_screening_order(&self, session_id: Uuid) -> u32 {
        self.current_session_screening(session_id)
            .map_or(1, |s| s.screening_order + 1)
    }

    /// The valid answered-question row for a question, if any.
    pub fn valid_answered_question(
        &self,
        session_screening_id: Uuid,
        question_id: Uuid,
    ) -> Option<&AnsweredQuestion> {
        self.answered_questions
            .children_of(session_screening_id)
            .find(|aq| aq.valid && aq.question_id == question_id)
    }

    pub fn valid_answered_questions(&self, session_screening_id: Uuid) -> Vec<&AnsweredQuestion> {
        self.answered_questions
            .children_of(session_screening_id)
            .filter(|aq| aq.valid)
            .collect()
    }

    /// Whether any answer has ever been recorded for the session.
    pub fn has_answers(&self, session_id: Uuid) -> bool {
        self.session_screenings
            .children_of(session_id)
            .any(|ss| self.answered_questions.children_of(ss.id).next().is_some())
    }

    pub fn answers_for(&self, answered_question_id: Uuid) -> Vec<&Answer> {
        let mut answers: Vec<_> = self.answers.children_of(answered_question_id).collect();
        answers.sort_by_key(|a| a.created_at);
        answers
    }

    /// Recommendations of a session, highest weight first.
    pub fn recommendations_for(&self, session_id: Uuid) -> Vec<&SupportRoleRecommendation> {
        let mut recommendations: Vec<_> = self.recommendations.children_of(session_id).collect();
        recommendations.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.support_role_id.as_str().cmp(b.support_role_id.as_str()))
        });
        recommendations
    }
}

// ============================================================================
// Triage
// ============================================================================

impl Tables {
    /// Every triage group of a patient order, oldest first.
    pub fn triage_groups_for(&self, patient_order_id: Uuid) -> Vec<&TriageGroup> {
        let mut groups: Vec<_> = self.triage_groups.children_of(patient_order_id).collect();
        groups.sort_by_key(|g| g.created_at);
        groups
    }

    pub fn active_triage_group(&self, patient_order_id: Uuid) -> Option<&TriageGroup> {
        self.triage_groups
            .children_of(patient_order_id)
            .find(|g| g.active)
    }

    /// Deactivate the current group of the patient order and insert `group`
    /// as the active one.
    pub fn activate_triage_group(&mut self, mut group: TriageGroup) -> TriageGroup {
        let now = jiff::Timestamp::now();
        let active: Vec<Uuid> = self
            .triage_groups
            .children_of(group.patient_order_id)
            .filter(|g| g.active)
            .map(|g| g.id)
            .collect();
        for id in active {
            if let Some(existing) = self.triage_groups.get_mut(&id) {
                existing.active = false;
                existing.deactivated_at = Some(now);
                existing.updated_at = now;
            }
        }
        group.active = true;
        group.deactivated_at = None;
        self.triage_groups.insert(group.clone());
        group
    }
}
