//! Answer and question-draft validation.
//!
//! Messages are shown to respondents as-is.

use std::collections::HashSet;

use uuid::Uuid;

use screening_core::models::question::{AnswerFormat, AnswerOption, ContentHint, Question, QuestionDraft};
use screening_core::models::session::AnswerSubmission;
use screening_core::models::validation::FieldError;

/// One accepted answer, with its text normalised or discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub answer_option_id: Uuid,
    pub text: Option<String>,
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Validate a submission against a question and its options.
pub fn validate_answer_set(
    question: &Question,
    options: &[&AnswerOption],
    submission: &AnswerSubmission,
) -> Result<Vec<ValidatedAnswer>, Vec<FieldError>> {
    let mut errors = Vec::new();
    let ids = &submission.answer_option_ids;
    let count = ids.len() as u32;
    let min = question.minimum_answer_count;
    let max = question.maximum_answer_count;

    let unique: HashSet<_> = ids.iter().collect();
    if unique.len() != ids.len() {
        errors.push(FieldError::new(
            "answer_option_ids",
            "Each answer can only be chosen once.",
        ));
    }

    // Exactly-one questions get one prompt whichever way the count is off.
    let exactly_one = question.answer_format == AnswerFormat::SingleSelect || (min == 1 && max == 1);
    if exactly_one && count != 1 {
        errors.push(FieldError::new(
            "answer_option_ids",
            "You must answer the question to proceed.",
        ));
    } else if count < min {
        errors.push(FieldError::new(
            "answer_option_ids",
            format!("You must choose at least {min} answer{}.", plural(min)),
        ));
    } else if count > max {
        errors.push(FieldError::new(
            "answer_option_ids",
            format!("You must choose at most {max} answer{}.", plural(max)),
        ));
    }

    let mut answers = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(option) = options.iter().find(|o| o.id == *id && o.question_id == question.id) else {
            errors.push(FieldError::new(
                "answer_option_ids",
                "You can only supply answers for the current question.",
            ));
            continue;
        };

        let text = if question.answer_format == AnswerFormat::FreeformText {
            match required_text(submission, question.content_hint) {
                Ok(text) => Some(text),
                Err(message) => {
                    let message = message.unwrap_or("Please provide a response.");
                    errors.push(FieldError::new("freeform_text", message));
                    continue;
                }
            }
        } else if let Some(supplement) = &option.freeform_supplement {
            match required_text(submission, supplement.content_hint) {
                Ok(text) => Some(text),
                Err(message) => {
                    let message = message.map(str::to_string).unwrap_or_else(|| {
                        format!("Please specify a value for '{}'.", supplement.label)
                    });
                    errors.push(FieldError::new("freeform_text", message));
                    continue;
                }
            }
        } else {
            None
        };

        answers.push(ValidatedAnswer {
            answer_option_id: option.id,
            text,
        });
    }

    if errors.is_empty() { Ok(answers) } else { Err(errors) }
}

/// Text required by a freeform question or supplement.
///
/// `Err(None)` means the text was missing; `Err(Some(_))` that it was malformed.
fn required_text(
    submission: &AnswerSubmission,
    hint: ContentHint,
) -> Result<String, Option<&'static str>> {
    let text = submission
        .freeform_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(None)?;
    normalize_freeform(hint, text).map_err(Some)
}

/// Normalise freeform text for its content hint.
pub fn normalize_freeform(hint: ContentHint, text: &str) -> Result<String, &'static str> {
    let text = text.trim();
    match hint {
        ContentHint::None => Ok(text.to_string()),
        ContentHint::Integer => text
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| "Please enter a whole number."),
        ContentHint::EmailAddress => {
            let valid = match text.split_once('@') {
                Some((local, domain)) => {
                    !local.is_empty()
                        && !domain.contains('@')
                        && domain.contains('.')
                        && !domain.starts_with('.')
                        && !domain.ends_with('.')
                        && !text.chars().any(char::is_whitespace)
                }
                None => false,
            };
            if valid {
                Ok(text.to_string())
            } else {
                Err("Please enter a valid email address.")
            }
        }
        ContentHint::PhoneNumber => normalize_phone(text).ok_or("Please enter a valid phone number."),
    }
}

/// `+` followed by digits; ten-digit numbers are taken as North American.
fn normalize_phone(text: &str) -> Option<String> {
    let (international, rest) = match text.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut digits = String::new();
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return None,
        }
    }
    match (international, digits.len()) {
        (true, 8..=15) => Some(format!("+{digits}")),
        (false, 10) => Some(format!("+1{digits}")),
        (false, 11) if digits.starts_with('1') => Some(format!("+{digits}")),
        _ => None,
    }
}

/// Structural checks for a question draft at `questions[index]`.
pub fn validate_question_draft(index: usize, draft: &QuestionDraft) -> Vec<FieldError> {
    let field = |name: &str| format!("questions[{index}].{name}");
    let mut errors = Vec::new();
    let min = draft.minimum_answer_count;
    let max = draft.maximum_answer_count;
    let option_count = draft.options.len() as u32;

    if draft.question_text.trim().is_empty() {
        errors.push(FieldError::new(field("question_text"), "question text is required"));
    }
    if max == 0 {
        errors.push(FieldError::new(
            field("maximum_answer_count"),
            "maximum answer count must be at least 1",
        ));
    }
    if min > max {
        errors.push(FieldError::new(
            field("minimum_answer_count"),
            "minimum answer count cannot exceed the maximum",
        ));
    }
    if draft.options.is_empty() {
        errors.push(FieldError::new(field("options"), "at least one answer option is required"));
    }

    if draft.answer_format == AnswerFormat::SingleSelect {
        if max > 1 {
            errors.push(FieldError::new(
                field("maximum_answer_count"),
                "single-select questions accept one answer",
            ));
        }
        if min != 1 {
            errors.push(FieldError::new(
                field("minimum_answer_count"),
                "single-select questions require an answer",
            ));
        }
    }
    match draft.answer_format {
        AnswerFormat::FreeformText if option_count != 1 || max != 1 => errors.push(FieldError::new(
            field("options"),
            "freeform questions have exactly one option and accept one answer",
        )),
        AnswerFormat::MultiSelect if max > option_count && option_count > 0 => {
            errors.push(FieldError::new(
                field("maximum_answer_count"),
                "maximum answer count exceeds the number of options",
            ))
        }
        _ => {}
    }

    for (position, option) in draft.options.iter().enumerate() {
        if option.answer_option_text.trim().is_empty() {
            errors.push(FieldError::new(
                field(&format!("options[{position}].answer_option_text")),
                "answer option text is required",
            ));
        }
        if let Some(supplement) = &option.freeform_supplement
            && supplement.label.trim().is_empty()
        {
            errors.push(FieldError::new(
                field(&format!("options[{position}].freeform_supplement.label")),
                "supplement label is required",
            ));
        }
    }

    errors
}
