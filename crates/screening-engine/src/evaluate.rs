use screening_rules::error::EvaluationError;
use screening_rules::output::{RuleKind, RuleOutput};
use screening_rules::snapshot::SessionSnapshot;

use crate::ScreeningEngine;
use crate::error::EngineError;

impl ScreeningEngine {
    /// Evaluate `rule_id` on the blocking pool under the configured limits.
    ///
    /// Failures are logged and returned as retryable evaluation errors.
    pub(crate) async fn evaluate_rule(
        &self,
        rule_id: &str,
        expected: RuleKind,
        snapshot: SessionSnapshot,
    ) -> Result<RuleOutput, EngineError> {
        let session_id = snapshot.session_id;
        let result = self.run_rule(rule_id, expected, snapshot).await;
        match result {
            Ok(output) => {
                tracing::debug!(rule_id, session_id = %session_id, kind = %expected, "rule evaluated");
                Ok(output)
            }
            Err(err) => {
                tracing::warn!(
                    rule_id,
                    session_id = %session_id,
                    kind = %err.kind,
                    error = %err.message,
                    "rule evaluation failed"
                );
                Err(EngineError::Evaluation(err))
            }
        }
    }

    async fn run_rule(
        &self,
        rule_id: &str,
        expected: RuleKind,
        snapshot: SessionSnapshot,
    ) -> Result<RuleOutput, EvaluationError> {
        let spec = self
            .store
            .read(|tables| tables.rules().get(rule_id).cloned())
            .ok_or_else(|| EvaluationError::runtime(rule_id, "unknown rule"))?;
        if spec.kind() != expected {
            return Err(EvaluationError::shape(
                rule_id,
                format!("a {} rule cannot be used as a {expected} rule", spec.kind()),
            ));
        }

        let limits = self.config.limits();
        let id = rule_id.to_string();
        let task = tokio::task::spawn_blocking(move || {
            screening_rules::evaluate(&id, &spec, &snapshot, limits)
        });
        match tokio::time::timeout(limits.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(EvaluationError::runtime(
                rule_id,
                format!("evaluation task failed: {join_error}"),
            )),
            Err(_) => Err(EvaluationError::timeout(
                rule_id,
                format!("no result within {} ms", limits.timeout.as_millis()),
            )),
        }
    }
}
