use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

/// Upper bounds applied to every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationLimits {
    pub timeout: Duration,
    pub max_steps: u32,
}

impl Default for EvaluationLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(250),
            max_steps: 10_000,
        }
    }
}

/// Per-evaluation step counter and deadline.
///
/// Every condition node visited and every answer scanned costs one step.
#[derive(Debug)]
pub struct Budget {
    rule_id: String,
    steps_remaining: u32,
    deadline: Instant,
}

impl Budget {
    pub fn new(rule_id: &str, limits: EvaluationLimits) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            steps_remaining: limits.max_steps,
            deadline: Instant::now() + limits.timeout,
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn charge(&mut self) -> Result<(), EvaluationError> {
        if self.steps_remaining == 0 {
            return Err(EvaluationError::runtime(
                &self.rule_id,
                "step budget exhausted",
            ));
        }
        self.steps_remaining -= 1;
        if Instant::now() >= self.deadline {
            return Err(EvaluationError::timeout(
                &self.rule_id,
                "evaluation deadline exceeded",
            ));
        }
        Ok(())
    }

    pub fn runtime(&self, message: impl Into<String>) -> EvaluationError {
        EvaluationError::runtime(&self.rule_id, message)
    }

    pub fn shape(&self, message: impl Into<String>) -> EvaluationError {
        EvaluationError::shape(&self.rule_id, message)
    }
}
