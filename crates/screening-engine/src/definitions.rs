use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::models::flow::{Flow, FlowAttributes, FlowVersion, FlowVersionSpec, NewFlow};
use screening_core::models::question::{AnswerOption, Question};
use screening_core::models::screening::{
    NewScreening, QuestionWithOptions, Screening, ScreeningAttributes, ScreeningVersion,
    ScreeningVersionDetail, ScreeningVersionDraft, ScreeningVersionSpec,
};
use screening_core::models::validation::FieldError;
use screening_rules::output::RuleKind;
use screening_rules::{RuleRegistry, RuleSpec};
use screening_storage::tables::Tables;

use crate::ScreeningEngine;
use crate::catalog;
use crate::error::EngineError;

/// A registered rule as listed to administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub rule_id: String,
    pub kind: RuleKind,
    pub spec: RuleSpec,
}

fn check_rule(
    rules: &RuleRegistry,
    field: &str,
    rule_id: &str,
    expected: RuleKind,
    errors: &mut Vec<FieldError>,
) {
    match rules.kind_of(rule_id) {
        None => errors.push(FieldError::new(field, format!("unknown rule '{rule_id}'"))),
        Some(kind) if kind != expected => errors.push(FieldError::new(
            field,
            format!("rule '{rule_id}' is a {kind} rule, expected {expected}"),
        )),
        Some(_) => {}
    }
}

fn require_name(name: &str) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("name", "name is required"));
    }
    Ok(())
}

// ============================================================================
// Flows
// ============================================================================

impl ScreeningEngine {
    pub fn create_flow(&self, new: NewFlow) -> Result<Flow, EngineError> {
        require_name(&new.name)?;
        let flow = self.store.transact(|tables| {
            Ok::<_, EngineError>(tables.flows.create_definition(
                new.name.trim(),
                FlowAttributes {
                    flow_type: new.flow_type,
                    institution_id: new.institution_id.clone(),
                },
            ))
        })?;
        tracing::info!(flow_id = %flow.id, flow_type = flow.attributes.flow_type.as_str(), "flow created");
        Ok(flow)
    }

    pub fn flow(&self, flow_id: Uuid) -> Result<Flow, EngineError> {
        Ok(self.store.read(|tables| tables.flows.definition(flow_id).cloned())?)
    }

    /// Append an immutable flow version. It serves no session until published.
    pub fn create_flow_version(
        &self,
        flow_id: Uuid,
        spec: FlowVersionSpec,
    ) -> Result<FlowVersion, EngineError> {
        let version = self.store.transact(|tables| {
            tables.flows.definition(flow_id)?;
            validate_flow_version(tables, &spec)?;
            Ok::<_, EngineError>(tables.flows.create_version(flow_id, spec)?)
        })?;
        tracing::info!(
            flow_id = %flow_id,
            flow_version_id = %version.id,
            version_number = version.version_number,
            "flow version created"
        );
        Ok(version)
    }

    pub fn publish_flow_version(
        &self,
        flow_id: Uuid,
        flow_version_id: Uuid,
    ) -> Result<FlowVersion, EngineError> {
        let version = self
            .store
            .transact(|tables| Ok::<_, EngineError>(tables.flows.publish(flow_id, flow_version_id)?))?;
        tracing::info!(
            flow_id = %flow_id,
            flow_version_id = %flow_version_id,
            version_number = version.version_number,
            "flow version published"
        );
        Ok(version)
    }

    pub fn active_flow_version(&self, flow_id: Uuid) -> Result<FlowVersion, EngineError> {
        Ok(self
            .store
            .read(|tables| tables.flows.active_version(flow_id).cloned())?)
    }

    pub fn flow_versions(&self, flow_id: Uuid) -> Result<Vec<FlowVersion>, EngineError> {
        Ok(self.store.read(|tables| {
            tables
                .flows
                .versions_of(flow_id)
                .map(|versions| versions.into_iter().cloned().collect())
        })?)
    }
}

fn validate_flow_version(tables: &Tables, spec: &FlowVersionSpec) -> Result<(), EngineError> {
    let mut errors = Vec::new();
    if tables.screenings.definition(spec.initial_screening_id).is_err() {
        errors.push(FieldError::new(
            "initial_screening_id",
            format!("unknown screening {}", spec.initial_screening_id),
        ));
    }
    check_rule(
        tables.rules(),
        "orchestration_rule",
        &spec.orchestration_rule,
        RuleKind::Orchestration,
        &mut errors,
    );
    if let Some(results_rule) = &spec.results_rule {
        check_rule(tables.rules(), "results_rule", results_rule, RuleKind::Results, &mut errors);
    }
    check_rule(
        tables.rules(),
        "destination_rule",
        &spec.destination_rule,
        RuleKind::Destination,
        &mut errors,
    );
    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(errors))
    }
}

// ============================================================================
// Screenings
// ============================================================================

impl ScreeningEngine {
    pub fn create_screening(&self, new: NewScreening) -> Result<Screening, EngineError> {
        require_name(&new.name)?;
        let screening = self.store.transact(|tables| {
            Ok::<_, EngineError>(tables.screenings.create_definition(
                new.name.trim(),
                ScreeningAttributes {
                    screening_type: new.screening_type.clone(),
                },
            ))
        })?;
        tracing::info!(screening_id = %screening.id, screening_type = %screening.attributes.screening_type, "screening created");
        Ok(screening)
    }

    pub fn screening(&self, screening_id: Uuid) -> Result<Screening, EngineError> {
        Ok(self
            .store
            .read(|tables| tables.screenings.definition(screening_id).cloned())?)
    }

    /// Append a screening version and mint the catalog rows it owns.
    pub fn create_screening_version(
        &self,
        screening_id: Uuid,
        draft: ScreeningVersionDraft,
    ) -> Result<ScreeningVersionDetail, EngineError> {
        let mut errors = Vec::new();
        if draft.questions.is_empty() {
            errors.push(FieldError::new("questions", "at least one question is required"));
        }
        for (index, question) in draft.questions.iter().enumerate() {
            errors.extend(catalog::validate_question_draft(index, question));
        }

        let detail = self.store.transact(|tables| {
            tables.screenings.definition(screening_id)?;
            check_rule(
                tables.rules(),
                "scoring_rule",
                &draft.scoring_rule,
                RuleKind::Scoring,
                &mut errors,
            );
            if !errors.is_empty() {
                return Err(EngineError::Validation(errors));
            }

            let question_ids: Vec<Uuid> = draft.questions.iter().map(|_| Uuid::new_v4()).collect();
            let version = tables.screenings.create_version(
                screening_id,
                ScreeningVersionSpec {
                    scoring_rule: draft.scoring_rule.clone(),
                    question_ids: question_ids.clone(),
                },
            )?;

            let now = jiff::Timestamp::now();
            let mut questions = Vec::with_capacity(draft.questions.len());
            for (position, (question_draft, question_id)) in
                draft.questions.iter().zip(question_ids).enumerate()
            {
                let question = Question {
                    id: question_id,
                    screening_version_id: version.id,
                    answer_format: question_draft.answer_format,
                    content_hint: question_draft.content_hint,
                    question_text: question_draft.question_text.trim().to_string(),
                    intro_text: question_draft.intro_text.clone(),
                    minimum_answer_count: question_draft.minimum_answer_count,
                    maximum_answer_count: question_draft.maximum_answer_count,
                    display_order: position as u32 + 1,
                    config: question_draft.config.clone(),
                    extensions: question_draft.extensions.clone(),
                    created_at: now,
                    updated_at: now,
                };
                let options: Vec<AnswerOption> = question_draft
                    .options
                    .iter()
                    .enumerate()
                    .map(|(option_position, option)| AnswerOption {
                        id: Uuid::new_v4(),
                        question_id,
                        answer_option_text: option.answer_option_text.trim().to_string(),
                        score: option.score,
                        indicates_crisis: option.indicates_crisis,
                        freeform_supplement: option.freeform_supplement.clone(),
                        display_order: option_position as u32 + 1,
                        extensions: option.extensions.clone(),
                        created_at: now,
                        updated_at: now,
                    })
                    .collect();
                questions.push(QuestionWithOptions { question, options });
            }

            for entry in &questions {
                tables.questions.insert(entry.question.clone());
                for option in &entry.options {
                    tables.answer_options.insert(option.clone());
                }
            }
            Ok(ScreeningVersionDetail { version, questions })
        })?;

        tracing::info!(
            screening_id = %screening_id,
            screening_version_id = %detail.version.id,
            version_number = detail.version.version_number,
            questions = detail.questions.len(),
            "screening version created"
        );
        Ok(detail)
    }

    pub fn publish_screening_version(
        &self,
        screening_id: Uuid,
        screening_version_id: Uuid,
    ) -> Result<ScreeningVersion, EngineError> {
        let version = self.store.transact(|tables| {
            Ok::<_, EngineError>(tables.screenings.publish(screening_id, screening_version_id)?)
        })?;
        tracing::info!(
            screening_id = %screening_id,
            screening_version_id = %screening_version_id,
            version_number = version.version_number,
            "screening version published"
        );
        Ok(version)
    }

    pub fn active_screening_version(
        &self,
        screening_id: Uuid,
    ) -> Result<ScreeningVersion, EngineError> {
        Ok(self
            .store
            .read(|tables| tables.screenings.active_version(screening_id).cloned())?)
    }

    /// A screening version with its questions and options in display order.
    pub fn screening_version_detail(
        &self,
        screening_version_id: Uuid,
    ) -> Result<ScreeningVersionDetail, EngineError> {
        Ok(self.store.read(|tables| {
            let version = tables.screenings.version(screening_version_id)?.clone();
            let questions = tables
                .questions_for_version(screening_version_id)
                .into_iter()
                .map(|question| QuestionWithOptions {
                    question: question.clone(),
                    options: tables
                        .options_for_question(question.id)
                        .into_iter()
                        .cloned()
                        .collect(),
                })
                .collect();
            Ok::<_, EngineError>(ScreeningVersionDetail { version, questions })
        })?)
    }
}

// ============================================================================
// Rules
// ============================================================================

impl ScreeningEngine {
    /// Register a rule. Returns `false` when the identical rule already exists.
    pub fn register_rule(&self, rule_id: &str, spec: RuleSpec) -> Result<bool, EngineError> {
        let kind = spec.kind();
        let inserted = self
            .store
            .transact(|tables| Ok::<_, EngineError>(tables.register_rule(rule_id, spec)?))?;
        if inserted {
            tracing::info!(rule_id, kind = %kind, "rule registered");
        }
        Ok(inserted)
    }

    pub fn rule(&self, rule_id: &str) -> Result<RuleEntry, EngineError> {
        self.store
            .read(|tables| {
                tables.rules().get(rule_id).map(|spec| RuleEntry {
                    rule_id: rule_id.to_string(),
                    kind: spec.kind(),
                    spec: spec.clone(),
                })
            })
            .ok_or_else(|| EngineError::not_found("rule", rule_id))
    }

    pub fn rules(&self) -> Vec<RuleEntry> {
        self.store.read(|tables| {
            tables
                .rules()
                .iter()
                .map(|(rule_id, spec)| RuleEntry {
                    rule_id: rule_id.to_string(),
                    kind: spec.kind(),
                    spec: spec.clone(),
                })
                .collect()
        })
    }
}
