//! Entry points that compose the grammar and the evaluator.
//!
//! The reference instant defaults to the current time, read when the
//! expression is evaluated. Pass an explicit reference for reproducible
//! results.

use chrono::{DateTime, FixedOffset, TimeZone, Utc, Weekday};

use crate::ast::Expr;
use crate::calc;
use crate::error::{DateExprError, Result};
use crate::grammar;

/// Options for [`parse`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Instant the expression is relative to. `None` means "now".
    pub reference: Option<DateTime<FixedOffset>>,
    /// First day of the week for `sow`/`eow`. Defaults to Monday.
    pub week_start: WeekStart,
}

impl ParseOptions {
    pub fn with_reference<Tz: TimeZone>(mut self, reference: DateTime<Tz>) -> Self {
        self.reference = Some(reference.fixed_offset());
        self
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = WeekStart(week_start);
        self
    }

    /// Set the week start from an ISO weekday number (1 = Monday ... 7 = Sunday).
    ///
    /// # Errors
    ///
    /// Returns [`DateExprError::InvalidWeekStart`] outside 1-7.
    pub fn with_week_start_number(self, number: u32) -> Result<Self> {
        Ok(self.with_week_start(week_start_from_iso(number)?))
    }

    fn resolved_reference(&self) -> DateTime<FixedOffset> {
        self.reference.unwrap_or_else(|| Utc::now().fixed_offset())
    }
}

/// First day of the week. Monday unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekStart(pub Weekday);

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart(Weekday::Mon)
    }
}

/// Map an ISO weekday number (1 = Monday ... 7 = Sunday) to a [`Weekday`].
///
/// # Errors
///
/// Returns [`DateExprError::InvalidWeekStart`] outside 1-7.
pub fn week_start_from_iso(number: u32) -> Result<Weekday> {
    match number {
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        7 => Ok(Weekday::Sun),
        n => Err(DateExprError::InvalidWeekStart(n)),
    }
}

/// Parse and evaluate a date expression.
///
/// # Errors
///
/// Returns [`DateExprError::Parse`] if the text is not a valid expression, or
/// [`DateExprError::Calc`] if evaluation leaves chrono's date range.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use datexpr::{parse, ParseOptions};
///
/// let reference = DateTime::parse_from_rfc3339("2026-06-15T10:30:00Z").unwrap();
/// let options = ParseOptions::default().with_reference(reference);
///
/// let result = parse("+7d", &options).unwrap();
/// assert_eq!(result.to_rfc3339(), "2026-06-22T10:30:00+00:00");
/// ```
pub fn parse(text: &str, options: &ParseOptions) -> Result<DateTime<FixedOffset>> {
    let expr = grammar::parse(text)?;
    calc::evaluate(&expr, &options.resolved_reference(), options.week_start.0)
}

/// Like [`parse`], but panics on failure.
///
/// # Panics
///
/// Panics with a message containing `text` and the underlying error.
pub fn parse_or_panic(text: &str, options: &ParseOptions) -> DateTime<FixedOffset> {
    match parse(text, options) {
        Ok(result) => result,
        Err(err) => panic!("cannot resolve date expression '{text}': {err}"),
    }
}

/// Parse without evaluating, for inspecting how an expression was read.
///
/// # Errors
///
/// Returns [`DateExprError::Parse`] if the text is not a valid expression.
pub fn parse_ast(text: &str) -> Result<Expr> {
    grammar::parse(text)
}
