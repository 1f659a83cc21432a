//! Validation utilities for the Warehouse ROI platform

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::models::{find_question, QuestionType};
use crate::roi::{parse_answer, MAX_NUMERIC_ANSWER};
use crate::types::Answers;

/// Why a set of answers was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    #[error("answer to {0} must be one of the listed options")]
    InvalidOption(String),

    #[error("answer to {0} must be a non-negative number")]
    InvalidNumber(String),
}

impl AnswerError {
    pub fn question_id(&self) -> &str {
        match self {
            AnswerError::UnknownQuestion(id)
            | AnswerError::InvalidOption(id)
            | AnswerError::InvalidNumber(id) => id,
        }
    }
}

// ============================================================================
// Questionnaire Validations
// ============================================================================

/// Check every answer against the question catalogue.
/// `null` and empty strings are accepted as "not answered".
pub fn validate_answers(answers: &Answers) -> Result<(), AnswerError> {
    for (id, value) in answers {
        let question =
            find_question(id).ok_or_else(|| AnswerError::UnknownQuestion(id.clone()))?;

        if is_blank(value) {
            continue;
        }

        match question.question_type {
            QuestionType::Radio => {
                let chosen = parse_answer(value)
                    .ok_or_else(|| AnswerError::InvalidOption(id.clone()))?;
                if !question
                    .options
                    .iter()
                    .any(|option| chosen == Decimal::from(option.value))
                {
                    return Err(AnswerError::InvalidOption(id.clone()));
                }
            }
            QuestionType::Number => {
                // Values a Decimal cannot hold would score as zero
                let in_range = parse_answer(value).is_some_and(|number| {
                    !number.is_sign_negative() && number <= Decimal::from(MAX_NUMERIC_ANSWER)
                });
                if !in_range {
                    return Err(AnswerError::InvalidNumber(id.clone()));
                }
            }
        }
    }
    Ok(())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate username format: 3-50 characters, alphanumeric plus `.`, `_`, `-`
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 50 {
        return Err("Username must be at most 50 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("Username may only contain letters, digits, '.', '_' and '-'");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate company name is present after trimming
pub fn validate_company_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Company name cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers(pairs: &[(&str, Value)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_valid_answers() {
        let a = answers(&[
            ("annual_revenue", json!("12.5")),
            ("fte_count", json!(40)),
            ("inv_accuracy", json!("3")),
            ("ops_picking", json!(0)),
            ("labor_planning", json!(null)),
            ("tech_wms", json!("")),
        ]);
        assert!(validate_answers(&a).is_ok());
    }

    #[test]
    fn test_unknown_question_rejected() {
        let a = answers(&[("favourite_colour", json!("blue"))]);
        assert_eq!(
            validate_answers(&a),
            Err(AnswerError::UnknownQuestion("favourite_colour".to_string()))
        );
    }

    #[test]
    fn test_radio_answer_outside_options_rejected() {
        let a = answers(&[("inv_accuracy", json!(5))]);
        assert!(matches!(validate_answers(&a), Err(AnswerError::InvalidOption(_))));

        let a = answers(&[("inv_accuracy", json!("great"))]);
        assert!(matches!(validate_answers(&a), Err(AnswerError::InvalidOption(_))));

        let a = answers(&[("inv_accuracy", json!(2.5))]);
        assert!(matches!(validate_answers(&a), Err(AnswerError::InvalidOption(_))));
    }

    #[test]
    fn test_number_answer_rejected() {
        let a = answers(&[("fte_count", json!(-3))]);
        assert_eq!(
            validate_answers(&a),
            Err(AnswerError::InvalidNumber("fte_count".to_string()))
        );

        let a = answers(&[("fte_count", json!("lots"))]);
        assert!(validate_answers(&a).is_err());

        let a = answers(&[("annual_revenue", json!(1e15))]);
        assert!(validate_answers(&a).is_err());

        // Beyond Decimal range
        for huge in [json!(1e30), json!("1e30"), json!("100000000000000000000000000000000")] {
            let a = answers(&[("annual_revenue", huge)]);
            assert_eq!(
                validate_answers(&a),
                Err(AnswerError::InvalidNumber("annual_revenue".to_string()))
            );
        }
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("j.doe-2").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_company_name() {
        assert!(validate_company_name("Acme Logistics").is_ok());
        assert!(validate_company_name("   ").is_err());
    }
}
