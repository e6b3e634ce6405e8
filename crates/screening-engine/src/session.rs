use uuid::Uuid;

use screening_core::models::destination::Destination;
use screening_core::models::flow::{Flow, FlowSelector, FlowType, FlowVersion};
use screening_core::models::recommendation::SupportRoleRecommendation;
use screening_core::models::session::{
    AdvanceOutcome, AdvanceRequest, Answer, AnswerSubmission, AnsweredQuestion, NextQuestion,
    QuestionAnswers, Session, SessionScreening, SessionScreeningState, SessionState, SessionStatus,
    StartSession,
};
use screening_core::models::validation::{FieldError, SubmissionResult};
use screening_rules::error::EvaluationError;
use screening_rules::output::{NextStep, RuleKind};
use screening_rules::snapshot::SessionSnapshot;
use screening_storage::tables::Tables;

use crate::ScreeningEngine;
use crate::catalog::{self, ValidatedAnswer};
use crate::collaborators::{Account, CrisisAlert, CrisisSource};
use crate::error::EngineError;
use crate::projector;
use crate::snapshot;

/// Derive the lifecycle state of a session from its rows.
pub fn session_status(tables: &Tables, session: &Session) -> SessionStatus {
    if session.skipped {
        SessionStatus::Skipped
    } else if session.completed {
        SessionStatus::Completed
    } else if tables.has_answers(session.id) {
        SessionStatus::AwaitingAnswers
    } else {
        SessionStatus::NotStarted
    }
}

fn same_answer_set(stored: &[ValidatedAnswer], submitted: &[ValidatedAnswer]) -> bool {
    let key = |a: &ValidatedAnswer| (a.answer_option_id, a.text.clone());
    let mut stored: Vec<_> = stored.iter().map(key).collect();
    let mut submitted: Vec<_> = submitted.iter().map(key).collect();
    stored.sort();
    submitted.sort();
    stored == submitted
}

fn terminal_state(session: &Session) -> EngineError {
    if session.skipped {
        EngineError::InvalidState(format!("session {} was skipped", session.id))
    } else {
        EngineError::InvalidState(format!("session {} is already complete", session.id))
    }
}

// ============================================================================
// Start
// ============================================================================

impl ScreeningEngine {
    /// Start a session on the active version of the selected flow.
    ///
    /// The flow version is pinned to the session; the initial screening's
    /// active version becomes screening order 1.
    pub fn start_session(&self, request: StartSession) -> Result<Session, EngineError> {
        let accounts = &self.collaborators.accounts;
        let mut errors = Vec::new();
        let target = accounts.account(request.target_account_id);
        if target.is_none() {
            errors.push(FieldError::new("target_account_id", "unknown account"));
        }
        if accounts.account(request.created_by_account_id).is_none() {
            errors.push(FieldError::new("created_by_account_id", "unknown account"));
        }
        if let Some(patient_order_id) = request.patient_order_id
            && !self
                .collaborators
                .patient_orders
                .patient_order_exists(patient_order_id)
        {
            errors.push(FieldError::new("patient_order_id", "unknown patient order"));
        }
        let Some(target) = target.filter(|_| errors.is_empty()) else {
            return Err(EngineError::Validation(errors));
        };

        let flow_id = self.resolve_flow(&request.flow, &target)?;
        let session = self.store.transact(|tables| {
            let flow_version = tables.flows.active_version(flow_id)?.clone();
            let initial_screening_id = flow_version.payload.initial_screening_id;
            let screening_version = tables.screenings.active_version(initial_screening_id)?.clone();

            let now = jiff::Timestamp::now();
            let session = Session {
                id: Uuid::new_v4(),
                flow_id,
                flow_version_id: flow_version.id,
                target_account_id: request.target_account_id,
                created_by_account_id: request.created_by_account_id,
                patient_order_id: request.patient_order_id,
                completed: false,
                completed_at: None,
                skipped: false,
                skipped_at: None,
                crisis_indicated: false,
                crisis_indicated_at: None,
                destination: None,
                created_at: now,
                updated_at: now,
            };
            let first = SessionScreening {
                id: Uuid::new_v4(),
                session_id: session.id,
                screening_id: initial_screening_id,
                screening_version_id: screening_version.id,
                screening_order: 1,
                completed: false,
                completed_at: None,
                score: None,
                created_at: now,
                updated_at: now,
            };
            tables.sessions.insert(session.clone());
            tables.session_screenings.insert(first);
            Ok::<_, EngineError>(session)
        })?;

        tracing::info!(
            session_id = %session.id,
            flow_id = %session.flow_id,
            flow_version_id = %session.flow_version_id,
            target_account_id = %session.target_account_id,
            "session started"
        );
        Ok(session)
    }

    fn resolve_flow(&self, selector: &FlowSelector, account: &Account) -> Result<Uuid, EngineError> {
        let flow_type = match selector {
            FlowSelector::Id(flow_id) => return Ok(*flow_id),
            FlowSelector::Type(flow_type) => *flow_type,
        };
        if let Some(flow_id) = self
            .collaborators
            .institutions
            .flow_for(&account.institution_id, flow_type)
        {
            return Ok(flow_id);
        }

        // Institution-specific flows win over shared ones.
        let institution = Some(account.institution_id.as_str());
        self.store
            .read(|tables| {
                tables
                    .flows
                    .definitions()
                    .filter(|f| f.attributes.flow_type == flow_type && f.active_version_id.is_some())
                    .filter(|f| {
                        f.attributes.institution_id.is_none()
                            || f.attributes.institution_id.as_deref() == institution
                    })
                    .min_by_key(|f| (f.attributes.institution_id.is_none(), f.created_at))
                    .map(|f| f.id)
            })
            .ok_or_else(|| {
                EngineError::not_found(
                    "flow",
                    format!("{} for institution {}", flow_type.as_str(), account.institution_id),
                )
            })
    }
}

// ============================================================================
// Answers
// ============================================================================

impl ScreeningEngine {
    /// Record the answer set for a question of the current screening.
    ///
    /// Replaces any earlier set for the question; an identical set is a
    /// no-op. Selecting a crisis option sets the session's crisis flag.
    pub fn submit_answers(
        &self,
        session_id: Uuid,
        submission: AnswerSubmission,
    ) -> Result<SubmissionResult, EngineError> {
        let _guard = self.session_locks.try_acquire(session_id)?;

        let (result, alert) = self.store.transact(|tables| {
            let session = tables.session(session_id)?.clone();
            if session.is_terminal() {
                return Err(EngineError::validation(
                    "session_id",
                    "This assessment is complete and cannot have its answers changed.",
                ));
            }
            let current = tables
                .current_session_screening(session_id)
                .cloned()
                .ok_or_else(|| EngineError::InvalidState(format!("session {session_id} has no screening")))?;
            let question = tables
                .questions
                .get(&submission.question_id)
                .cloned()
                .ok_or_else(|| EngineError::validation("question_id", "Unknown question."))?;
            if question.screening_version_id != current.screening_version_id {
                return Err(EngineError::validation(
                    "question_id",
                    "You can only supply answers for the current question.",
                ));
            }
            if current.completed {
                return Err(EngineError::validation(
                    "question_id",
                    "This part of the assessment is already complete.",
                ));
            }

            let options = tables.options_for_question(question.id);
            let validated = catalog::validate_answer_set(&question, &options, &submission)
                .map_err(EngineError::Validation)?;
            let selects_crisis = validated.iter().any(|answer| {
                options
                    .iter()
                    .any(|o| o.id == answer.answer_option_id && o.indicates_crisis)
            });

            let now = jiff::Timestamp::now();
            if let Some(existing) = tables.valid_answered_question(current.id, question.id).cloned() {
                let stored: Vec<ValidatedAnswer> = tables
                    .answers_for(existing.id)
                    .into_iter()
                    .map(|a| ValidatedAnswer {
                        answer_option_id: a.answer_option_id,
                        text: a.text.clone(),
                    })
                    .collect();
                if same_answer_set(&stored, &validated) {
                    let result = SubmissionResult {
                        valid: true,
                        answered_question_id: existing.id,
                        changed: false,
                        crisis_indicated: session.crisis_indicated,
                    };
                    return Ok((result, None));
                }
                if let Some(row) = tables.answered_questions.get_mut(&existing.id) {
                    row.valid = false;
                    row.updated_at = now;
                }
            }

            let answered = AnsweredQuestion {
                id: Uuid::new_v4(),
                session_screening_id: current.id,
                question_id: question.id,
                valid: true,
                created_at: now,
                updated_at: now,
            };
            tables.answered_questions.insert(answered.clone());
            for answer in validated {
                let row = Answer {
                    id: Uuid::new_v4(),
                    answered_question_id: answered.id,
                    answer_option_id: answer.answer_option_id,
                    text: answer.text,
                    created_at: now,
                };
                tables.answers.insert(row);
            }

            let row = tables.session_mut(session_id)?;
            row.updated_at = now;
            let newly_flagged = selects_crisis && row.indicate_crisis(now);
            let alert = newly_flagged.then(|| CrisisAlert {
                session_id,
                target_account_id: row.target_account_id,
                patient_order_id: row.patient_order_id,
                source: CrisisSource::AnswerOption,
            });
            let result = SubmissionResult {
                valid: true,
                answered_question_id: answered.id,
                changed: true,
                crisis_indicated: row.crisis_indicated,
            };
            Ok::<_, EngineError>((result, alert))
        })?;

        if let Some(alert) = alert {
            self.notify_crisis(&alert);
        }
        tracing::debug!(
            session_id = %session_id,
            question_id = %submission.question_id,
            changed = result.changed,
            "answers submitted"
        );
        Ok(result)
    }

    fn notify_crisis(&self, alert: &CrisisAlert) {
        tracing::info!(session_id = %alert.session_id, source = ?alert.source, "crisis flag set");
        self.collaborators.crisis.crisis_indicated(alert);
    }

    /// Set the crisis flag from a rule decision.
    fn flag_crisis(&self, session_id: Uuid, source: CrisisSource) -> Result<(), EngineError> {
        let alert = self.store.transact(|tables| {
            let row = tables.session_mut(session_id)?;
            let newly_flagged = row.indicate_crisis(jiff::Timestamp::now());
            Ok::<_, EngineError>(newly_flagged.then(|| CrisisAlert {
                session_id,
                target_account_id: row.target_account_id,
                patient_order_id: row.patient_order_id,
                source,
            }))
        })?;
        if let Some(alert) = alert {
            self.notify_crisis(&alert);
        }
        Ok(())
    }
}

// ============================================================================
// Screening completion and advancing
// ============================================================================

struct CompletionContext {
    session: Session,
    screening: SessionScreening,
    scoring_rule: String,
    is_current: bool,
    unanswered: Vec<FieldError>,
}

impl ScreeningEngine {
    /// Score and complete a session screening. Completing it again returns
    /// the stored score.
    pub async fn complete_screening(&self, session_screening_id: Uuid) -> Result<i32, EngineError> {
        let session_id = self.store.read(|tables| {
            tables
                .session_screening(session_screening_id)
                .map(|ss| ss.session_id)
        })?;
        let _guard = self.session_locks.try_acquire(session_id)?;
        self.complete_screening_locked(session_screening_id).await
    }

    async fn complete_screening_locked(&self, session_screening_id: Uuid) -> Result<i32, EngineError> {
        let context = self.store.read(|tables| {
            let screening = tables.session_screening(session_screening_id)?.clone();
            let session = tables.session(screening.session_id)?.clone();
            let version = tables.screenings.version(screening.screening_version_id)?;
            let is_current = tables
                .current_session_screening(session.id)
                .is_some_and(|current| current.id == screening.id);
            let unanswered = tables
                .questions_for_version(screening.screening_version_id)
                .into_iter()
                .filter(|q| !q.is_optional())
                .filter(|q| tables.valid_answered_question(screening.id, q.id).is_none())
                .map(|q| {
                    FieldError::new(
                        format!("questions.{}", q.id),
                        "You must answer the question to proceed.",
                    )
                })
                .collect();
            Ok::<_, EngineError>(CompletionContext {
                scoring_rule: version.payload.scoring_rule.clone(),
                session,
                screening,
                is_current,
                unanswered,
            })
        })?;

        if context.screening.completed
            && let Some(score) = context.screening.score
        {
            return Ok(score);
        }
        if context.session.is_terminal() {
            return Err(terminal_state(&context.session));
        }
        if !context.is_current {
            return Err(EngineError::InvalidState(format!(
                "session screening {session_screening_id} is not the current screening"
            )));
        }
        if !context.unanswered.is_empty() {
            return Err(EngineError::Validation(context.unanswered));
        }

        let account = self
            .collaborators
            .accounts
            .account(context.session.target_account_id);
        let snapshot = self.session_snapshot(context.session.id, account.as_ref())?;
        let rule_id = context.scoring_rule.as_str();
        let score = self
            .evaluate_rule(rule_id, RuleKind::Scoring, snapshot)
            .await?
            .into_score(rule_id)?;

        let session_id = context.session.id;
        self.store.transact(|tables| {
            let now = jiff::Timestamp::now();
            let row = tables.session_screening_mut(session_screening_id)?;
            row.score = Some(score);
            row.completed = true;
            row.completed_at = Some(now);
            row.updated_at = now;
            tables.session_mut(session_id)?.updated_at = now;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(
            session_id = %session_id,
            session_screening_id = %session_screening_id,
            screening_id = %context.screening.screening_id,
            score,
            "screening completed"
        );
        Ok(score)
    }

    /// Complete the current screening if needed, then ask the flow's
    /// orchestration rule what comes next.
    pub async fn advance(&self, session_id: Uuid) -> Result<AdvanceOutcome, EngineError> {
        self.advance_with(session_id, AdvanceRequest::default()).await
    }

    /// [`advance`](Self::advance) with `force` confirming a pre-completion
    /// prompt the client has already shown.
    pub async fn advance_with(
        &self,
        session_id: Uuid,
        request: AdvanceRequest,
    ) -> Result<AdvanceOutcome, EngineError> {
        let _guard = self.session_locks.try_acquire(session_id)?;

        let (session, current, flow, flow_version) = self.store.read(|tables| {
            let session = tables.session(session_id)?.clone();
            let current = tables
                .current_session_screening(session_id)
                .cloned()
                .ok_or_else(|| EngineError::InvalidState(format!("session {session_id} has no screening")))?;
            let flow_version = tables.flows.version(session.flow_version_id)?.clone();
            let flow = tables.flows.definition(flow_version.definition_id)?.clone();
            Ok::<_, EngineError>((session, current, flow, flow_version))
        })?;
        if session.is_terminal() {
            return Err(terminal_state(&session));
        }
        if !current.completed {
            self.complete_screening_locked(current.id).await?;
        }

        let account = self.collaborators.accounts.account(session.target_account_id);
        let snapshot = self.session_snapshot(session_id, account.as_ref())?;
        let rule_id = flow_version.payload.orchestration_rule.as_str();
        let outcome = self
            .evaluate_rule(rule_id, RuleKind::Orchestration, snapshot)
            .await?
            .into_orchestration(rule_id)?;
        if outcome.crisis_indicated {
            self.flag_crisis(session_id, CrisisSource::Orchestration)?;
        }

        match outcome.next {
            NextStep::Screening { screening_id } => {
                self.append_screening(session_id, screening_id, rule_id)
            }
            NextStep::Finish => {
                if let Some(prompt) = &flow_version.payload.pre_completion_confirmation_prompt
                    && !request.force
                {
                    tracing::debug!(session_id = %session_id, "completion awaiting confirmation");
                    return Ok(AdvanceOutcome::ConfirmationRequired {
                        prompt: prompt.clone(),
                    });
                }
                if outcome.skipped {
                    tracing::info!(session_id = %session_id, rule_id, "orchestration skipped the session");
                    self.skip_locked(session_id, true)?;
                    return Ok(AdvanceOutcome::Skipped);
                }
                let destination = self
                    .finish_session(session_id, &flow, &flow_version, account.as_ref())
                    .await?;
                Ok(AdvanceOutcome::Completed { destination })
            }
        }
    }

    fn append_screening(
        &self,
        session_id: Uuid,
        screening_id: Uuid,
        rule_id: &str,
    ) -> Result<AdvanceOutcome, EngineError> {
        let next = self.store.transact(|tables| {
            let Ok(version) = tables.screenings.active_version(screening_id) else {
                let err = EvaluationError::shape(
                    rule_id,
                    format!("next screening {screening_id} has no active version"),
                );
                tracing::warn!(session_id = %session_id, rule_id, error = %err.message, "rule evaluation failed");
                return Err(EngineError::Evaluation(err));
            };
            let now = jiff::Timestamp::now();
            let next = SessionScreening {
                id: Uuid::new_v4(),
                session_id,
                screening_id,
                screening_version_id: version.id,
                screening_order: tables.next_screening_order(session_id),
                completed: false,
                completed_at: None,
                score: None,
                created_at: now,
                updated_at: now,
            };
            tables.session_screenings.insert(next.clone());
            tables.session_mut(session_id)?.updated_at = now;
            Ok::<_, EngineError>(next)
        })?;

        tracing::info!(
            session_id = %session_id,
            screening_id = %screening_id,
            screening_order = next.screening_order,
            "session advanced"
        );
        Ok(AdvanceOutcome::NextScreening {
            session_screening_id: next.id,
            screening_id,
            screening_order: next.screening_order,
        })
    }

    /// Run results and destination rules, then commit recommendations,
    /// triage, destination and completion together.
    async fn finish_session(
        &self,
        session_id: Uuid,
        flow: &Flow,
        flow_version: &FlowVersion,
        account: Option<&Account>,
    ) -> Result<Destination, EngineError> {
        let snapshot = self.session_snapshot(session_id, account)?;
        let results = match &flow_version.payload.results_rule {
            Some(rule_id) => Some(
                self.evaluate_rule(rule_id, RuleKind::Results, snapshot.clone())
                    .await?
                    .into_results(rule_id)?,
            ),
            None => None,
        };
        let destination = self
            .compute_destination(&flow_version.payload.destination_rule, snapshot)
            .await?;

        let now = jiff::Timestamp::now();
        let session = self.session(session_id)?;
        let recommendations = results
            .as_ref()
            .map(|r| projector::project_recommendations(session_id, &r.support_roles, now))
            .unwrap_or_default();
        let triage = match (&results, flow.attributes.flow_type) {
            (Some(results), FlowType::IntegratedCare) => {
                projector::computed_triage_group(&session, results, now)
            }
            _ => None,
        };
        let _order_guard = match &triage {
            Some(group) => Some(self.patient_order_locks.try_acquire(group.patient_order_id)?),
            None => None,
        };

        let recommendation_count = recommendations.len();
        let triage_group_id = self.store.transact(|tables| {
            for recommendation in recommendations {
                tables.recommendations.insert(recommendation);
            }
            let triage_group_id = triage.map(|group| tables.activate_triage_group(group).id);
            let row = tables.session_mut(session_id)?;
            row.destination = Some(destination.clone());
            row.completed = true;
            row.completed_at = Some(now);
            row.updated_at = now;
            Ok::<_, EngineError>(triage_group_id)
        })?;

        tracing::info!(
            session_id = %session_id,
            destination = ?destination,
            recommendations = recommendation_count,
            triage_group_id = ?triage_group_id,
            "session completed"
        );
        Ok(destination)
    }

    /// Destination for a snapshot; a crisis always routes to crisis.
    async fn compute_destination(
        &self,
        rule_id: &str,
        snapshot: SessionSnapshot,
    ) -> Result<Destination, EngineError> {
        if snapshot.crisis_indicated {
            return Ok(Destination::Crisis);
        }
        Ok(self
            .evaluate_rule(rule_id, RuleKind::Destination, snapshot)
            .await?
            .into_destination(rule_id)?)
    }

    /// Recompute the destination of a completed session.
    pub async fn determine_destination(&self, session_id: Uuid) -> Result<Destination, EngineError> {
        let (session, flow_version) = self.store.read(|tables| {
            let session = tables.session(session_id)?.clone();
            let flow_version = tables.flows.version(session.flow_version_id)?.clone();
            Ok::<_, EngineError>((session, flow_version))
        })?;
        if session.skipped {
            return Err(EngineError::InvalidState(format!(
                "session {session_id} was skipped and has no destination"
            )));
        }
        if !session.completed {
            return Err(EngineError::InvalidState(format!(
                "session {session_id} is not complete"
            )));
        }

        let account = self.collaborators.accounts.account(session.target_account_id);
        let snapshot = self.session_snapshot(session_id, account.as_ref())?;
        self.compute_destination(&flow_version.payload.destination_rule, snapshot)
            .await
    }

    /// Skip a session whose flow version allows it. Terminal.
    pub fn skip_session(&self, session_id: Uuid) -> Result<Session, EngineError> {
        let _guard = self.session_locks.try_acquire(session_id)?;
        self.skip_locked(session_id, false)
    }

    /// `force` skips regardless of the flow version's `skippable`.
    fn skip_locked(&self, session_id: Uuid, force: bool) -> Result<Session, EngineError> {
        let session = self.store.transact(|tables| {
            let session = tables.session(session_id)?;
            if session.is_terminal() {
                return Err(terminal_state(session));
            }
            let flow_version = tables.flows.version(session.flow_version_id)?;
            if !force && !flow_version.payload.skippable {
                return Err(EngineError::InvalidState(format!(
                    "session {session_id} cannot be skipped"
                )));
            }
            let now = jiff::Timestamp::now();
            let row = tables.session_mut(session_id)?;
            row.skipped = true;
            row.skipped_at = Some(now);
            row.completed = true;
            row.completed_at = Some(now);
            row.updated_at = now;
            Ok::<_, EngineError>(row.clone())
        })?;

        tracing::info!(session_id = %session_id, forced = force, "session skipped");
        Ok(session)
    }
}

// ============================================================================
// Reads
// ============================================================================

impl ScreeningEngine {
    pub fn session(&self, session_id: Uuid) -> Result<Session, EngineError> {
        Ok(self
            .store
            .read(|tables| tables.session(session_id).cloned())?)
    }

    fn session_snapshot(
        &self,
        session_id: Uuid,
        account: Option<&Account>,
    ) -> Result<SessionSnapshot, EngineError> {
        self.store.read(|tables| {
            let session = tables.session(session_id)?;
            Ok::<_, EngineError>(snapshot::build(tables, session, account))
        })
    }

    /// Full projection: status, every screening with its valid answers, and
    /// recommendations once complete.
    pub fn session_state(&self, session_id: Uuid) -> Result<SessionState, EngineError> {
        self.store.read(|tables| {
            let session = tables.session(session_id)?.clone();
            let status = session_status(tables, &session);
            let session_screenings = tables.session_screenings_for(session_id);
            let current_session_screening_id = if session.is_terminal() {
                None
            } else {
                session_screenings.last().map(|ss| ss.id)
            };

            let screenings = session_screenings
                .into_iter()
                .map(|ss| {
                    let mut answered = tables.valid_answered_questions(ss.id);
                    answered.sort_by_key(|aq| {
                        tables
                            .questions
                            .get(&aq.question_id)
                            .map_or(u32::MAX, |q| q.display_order)
                    });
                    SessionScreeningState {
                        screening: ss.clone(),
                        answers: answered
                            .into_iter()
                            .map(|aq| QuestionAnswers {
                                question_id: aq.question_id,
                                answered_question_id: aq.id,
                                answers: tables.answers_for(aq.id).into_iter().cloned().collect(),
                            })
                            .collect(),
                    }
                })
                .collect();

            let recommendations = tables
                .recommendations_for(session_id)
                .into_iter()
                .cloned()
                .collect();
            Ok::<_, EngineError>(SessionState {
                session,
                status,
                current_session_screening_id,
                screenings,
                recommendations,
            })
        })
    }

    /// First question of the current screening without a valid answer.
    ///
    /// `None` once the session is terminal or the current screening is
    /// complete and waiting to be advanced.
    pub fn next_unanswered_question(&self, session_id: Uuid) -> Result<Option<NextQuestion>, EngineError> {
        self.store.read(|tables| {
            let session = tables.session(session_id)?;
            if session.is_terminal() {
                return Ok(None);
            }
            let Some(current) = tables.current_session_screening(session_id) else {
                return Ok(None);
            };
            if current.completed {
                return Ok(None);
            }
            let next = tables
                .questions_for_version(current.screening_version_id)
                .into_iter()
                .find(|q| tables.valid_answered_question(current.id, q.id).is_none())
                .map(|question| NextQuestion {
                    session_screening_id: current.id,
                    screening_id: current.screening_id,
                    options: tables
                        .options_for_question(question.id)
                        .into_iter()
                        .cloned()
                        .collect(),
                    question: question.clone(),
                });
            Ok::<_, EngineError>(next)
        })
    }

    /// Recommendations of a session, highest weight first.
    pub fn recommendations(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<SupportRoleRecommendation>, EngineError> {
        self.store.read(|tables| {
            tables.session(session_id)?;
            Ok::<_, EngineError>(tables
                .recommendations_for(session_id)
                .into_iter()
                .cloned()
                .collect())
        })
    }
}
