//! Error types for date expression parsing and evaluation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateExprError {
    /// The input did not match the grammar.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The evaluator built a date the calendar rejects.
    #[error("Calculation error: {0}")]
    Calc(String),

    #[error("Invalid week start: {0} (expected 1-7, Monday = 1)")]
    InvalidWeekStart(u32),
}

impl DateExprError {
    /// `true` for grammar failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, DateExprError::Parse(_))
    }

    /// `true` for evaluation failures.
    pub fn is_calc(&self) -> bool {
        matches!(self, DateExprError::Calc(_))
    }
}

pub type Result<T> = std::result::Result<T, DateExprError>;
