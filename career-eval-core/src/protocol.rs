//! Response grammar for the model's text completion.
//!
//! The model is instructed to answer with two labelled fields:
//!
//! ```text
//! Score: <integer 0-100>
//! Explanation: <free text, may span lines>
//! ```
//!
//! Matching is not anchored. Everything after the first `Explanation:` marker
//! that follows the score is taken as the explanation, trimmed. A completion
//! that lacks either marker, or whose score is outside `0..=100`, is
//! unparsable.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MAX_SCORE: u8 = 100;

lazy_static! {
    static ref COMPLETION_PATTERN: Regex =
        Regex::new(r"(?s)Score:\s*([0-9]+).*?Explanation:\s*(.*)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EvaluationResult {
    /// Risk score, higher means more risk
    #[schema(minimum = 0, maximum = 100)]
    pub score: u8,
    pub explanation: String,
}

/// Why a completion could not be turned into an [`EvaluationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("Failed to parse AI response")]
    NoMatch,

    #[error("Invalid score: {value}")]
    InvalidScore { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(EvaluationResult),
    Unparsable {
        raw_text: String,
        reason: ParseFailure,
    },
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Single pass over `text` against the two-field grammar.
pub fn parse_completion(text: &str) -> ParseOutcome {
    let Some(captures) = COMPLETION_PATTERN.captures(text) else {
        return unparsable(text, ParseFailure::NoMatch);
    };

    let digits = &captures[1];
    let score = match digits.parse::<u32>() {
        Ok(score) if score <= u32::from(MAX_SCORE) => score as u8,
        _ => {
            return unparsable(
                text,
                ParseFailure::InvalidScore {
                    value: digits.to_string(),
                },
            );
        }
    };

    ParseOutcome::Parsed(EvaluationResult {
        score,
        explanation: captures[2].trim().to_string(),
    })
}

fn unparsable(text: &str, reason: ParseFailure) -> ParseOutcome {
    ParseOutcome::Unparsable {
        raw_text: text.to_string(),
        reason,
    }
}
