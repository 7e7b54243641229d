//! Grammar for Taskwarrior-style date expressions.
//!
//! The input is trimmed and lowercased, then matched against a fixed list of
//! alternatives in order. The first alternative whose own grammar matches a
//! prefix is committed: if it leaves input behind, the parse fails with a
//! trailing-input error rather than falling through to a later alternative.
//!
//! Order matters in two places:
//!
//! - Between alternatives: ISO durations come first so `p...` is never read
//!   as a keyword, and ordinals come before durations so `1st` is not `1s`.
//! - Inside each keyword table: longer literals come before their prefixes
//!   (`monday` before `mon`, `mins` before `min`), and the minutes family
//!   comes before the months family so the `m` in `min` is not read as
//!   months.

use chrono::{Month, Weekday};
use tracing::{debug, trace};

use crate::ast::{Boundary, Duration, Expr, IsoDuration, Sign, Synonym, Unit};
use crate::error::{DateExprError, Result};

// ── Keyword tables ──────────────────────────────────────────────────────────

const BOUNDARY_TOKENS: &[(&str, Boundary)] = &[
    ("socw", Boundary::StartOfWeek),
    ("eocw", Boundary::EndOfWeek),
    ("socm", Boundary::StartOfMonth),
    ("eocm", Boundary::EndOfMonth),
    ("socy", Boundary::StartOfYear),
    ("eocy", Boundary::EndOfYear),
    ("sow", Boundary::StartOfWeek),
    ("eow", Boundary::EndOfWeek),
    ("som", Boundary::StartOfMonth),
    ("eom", Boundary::EndOfMonth),
    ("soy", Boundary::StartOfYear),
    ("eoy", Boundary::EndOfYear),
    ("soq", Boundary::StartOfQuarter),
    ("eoq", Boundary::EndOfQuarter),
    ("eod", Boundary::EndOfDay),
];

const SYNONYM_TOKENS: &[(&str, Synonym)] = &[
    ("now", Synonym::Now),
    ("today", Synonym::Today),
    ("yesterday", Synonym::Yesterday),
    ("tomorrow", Synonym::Tomorrow),
];

const WEEKDAY_TOKENS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("sun", Weekday::Sun),
];

const MONTH_TOKENS: &[(&str, Month)] = &[
    ("january", Month::January),
    ("february", Month::February),
    ("march", Month::March),
    ("april", Month::April),
    ("may", Month::May),
    ("june", Month::June),
    ("july", Month::July),
    ("august", Month::August),
    ("september", Month::September),
    ("october", Month::October),
    ("november", Month::November),
    ("december", Month::December),
    ("jan", Month::January),
    ("feb", Month::February),
    ("mar", Month::March),
    ("apr", Month::April),
    ("jun", Month::June),
    ("jul", Month::July),
    ("aug", Month::August),
    ("sep", Month::September),
    ("oct", Month::October),
    ("nov", Month::November),
    ("dec", Month::December),
];

const UNIT_TOKENS: &[(&str, Unit)] = &[
    ("seconds", Unit::Seconds),
    ("second", Unit::Seconds),
    ("secs", Unit::Seconds),
    ("sec", Unit::Seconds),
    ("s", Unit::Seconds),
    ("mins", Unit::Minutes),
    ("min", Unit::Minutes),
    ("hours", Unit::Hours),
    ("hour", Unit::Hours),
    ("hrs", Unit::Hours),
    ("hr", Unit::Hours),
    ("h", Unit::Hours),
    ("days", Unit::Days),
    ("day", Unit::Days),
    ("d", Unit::Days),
    ("weeks", Unit::Weeks),
    ("week", Unit::Weeks),
    ("wks", Unit::Weeks),
    ("wk", Unit::Weeks),
    ("w", Unit::Weeks),
    ("months", Unit::Months),
    ("month", Unit::Months),
    ("mths", Unit::Months),
    ("mth", Unit::Months),
    ("mo", Unit::Months),
    ("m", Unit::Months),
    ("years", Unit::Years),
    ("year", Unit::Years),
    ("yrs", Unit::Years),
    ("yr", Unit::Years),
    ("y", Unit::Years),
];

const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

// ── Alternatives ────────────────────────────────────────────────────────────

/// Outcome of matching one grammar rule at the start of the input.
#[derive(Debug, PartialEq)]
enum Step<'a, T> {
    /// The rule matched; carries the value and the unconsumed input.
    Matched(T, &'a str),
    /// The rule's shape matched but its value is not allowed.
    Rejected(String),
    NoMatch,
}

type Alternative = for<'a> fn(&'a str) -> Step<'a, Expr>;

/// Top-level alternatives, tried in this order.
const ALTERNATIVES: &[(&str, Alternative)] = &[
    ("iso-8601 duration", try_iso_duration),
    ("period boundary", try_boundary),
    ("synonym", try_synonym),
    ("weekday", try_weekday),
    ("month", try_month),
    ("ordinal", try_ordinal),
    ("duration", try_durations),
];

/// Parse a date expression into an [`Expr`].
///
/// Leading and trailing whitespace is ignored and matching is
/// case-insensitive. Whitespace inside the expression is not allowed.
///
/// # Errors
///
/// Returns [`DateExprError::Parse`] if no alternative matches, if the
/// matching alternative leaves trailing input, if an ordinal is outside
/// 1-31, or if an ISO-8601 duration has no components.
///
/// # Examples
///
/// ```
/// use datexpr::ast::{Duration, Expr, Sign, Unit};
/// use datexpr::grammar::parse;
///
/// let expr = parse("30min").unwrap();
/// assert_eq!(expr, Expr::Duration(Duration::new(Sign::Plus, 30, Unit::Minutes)));
/// ```
pub fn parse(text: &str) -> Result<Expr> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(DateExprError::Parse("empty date expression".to_string()));
    }

    let mut rejection = None;
    for &(name, alternative) in ALTERNATIVES {
        match alternative(&normalized) {
            Step::Matched(expr, "") => {
                debug!(input = %normalized, rule = name, %expr, "parsed date expression");
                return Ok(expr);
            }
            Step::Matched(_, rest) => {
                debug!(input = %normalized, rule = name, rest, "trailing input after match");
                return Err(DateExprError::Parse(format!(
                    "unexpected trailing input: {rest}"
                )));
            }
            Step::Rejected(reason) => {
                trace!(input = %normalized, rule = name, %reason, "alternative rejected");
                rejection.get_or_insert(reason);
            }
            Step::NoMatch => {}
        }
    }

    debug!(input = %normalized, "no alternative matched");
    Err(DateExprError::Parse(rejection.unwrap_or_else(|| {
        format!("unrecognized date expression: '{}'", text.trim())
    })))
}

/// `P` followed by either a week part alone, or a date part and an optional
/// `T` time part.
fn try_iso_duration(input: &str) -> Step<'_, Expr> {
    let Some(body) = input.strip_prefix('p') else {
        return Step::NoMatch;
    };
    match iso_components(body) {
        Ok((iso, rest)) if iso.is_empty() => {
            if rest.is_empty() {
                Step::Rejected("empty ISO-8601 duration".to_string())
            } else {
                Step::NoMatch
            }
        }
        Ok((iso, rest)) => Step::Matched(Expr::Iso(iso), rest),
        Err(reason) => Step::Rejected(reason),
    }
}

fn iso_components(body: &str) -> std::result::Result<(IsoDuration, &str), String> {
    let mut iso = IsoDuration::default();

    if let Some((weeks, rest)) = designated(body, 'w')? {
        iso.weeks = Some(weeks);
        return Ok((iso, rest));
    }

    let mut rest = body;
    for (designator, slot) in [
        ('y', &mut iso.years),
        ('m', &mut iso.months),
        ('d', &mut iso.days),
    ] {
        if let Some((n, after)) = designated(rest, designator)? {
            *slot = Some(n);
            rest = after;
        }
    }

    if let Some(time) = rest.strip_prefix('t') {
        rest = time;
        for (designator, slot) in [
            ('h', &mut iso.hours),
            ('m', &mut iso.minutes),
            ('s', &mut iso.seconds),
        ] {
            if let Some((n, after)) = designated(rest, designator)? {
                *slot = Some(n);
                rest = after;
            }
        }
    }

    Ok((iso, rest))
}

/// Match `<digits><designator>`. Consumes nothing if the designator differs.
fn designated(input: &str, designator: char) -> std::result::Result<Option<(u64, &str)>, String> {
    let Some((digits, after)) = split_digits(input) else {
        return Ok(None);
    };
    match after.strip_prefix(designator) {
        Some(rest) => Ok(Some((parse_amount(digits)?, rest))),
        None => Ok(None),
    }
}

fn try_boundary(input: &str) -> Step<'_, Expr> {
    keyword(input, BOUNDARY_TOKENS, Expr::Boundary)
}

fn try_synonym(input: &str) -> Step<'_, Expr> {
    keyword(input, SYNONYM_TOKENS, Expr::Synonym)
}

fn try_weekday(input: &str) -> Step<'_, Expr> {
    keyword(input, WEEKDAY_TOKENS, Expr::Weekday)
}

fn try_month(input: &str) -> Step<'_, Expr> {
    keyword(input, MONTH_TOKENS, Expr::Month)
}

/// `<digits>` followed by `st`, `nd`, `rd` or `th`. The suffix is not
/// checked against the number, so `2st` is day 2.
fn try_ordinal(input: &str) -> Step<'_, Expr> {
    let Some((digits, after)) = split_digits(input) else {
        return Step::NoMatch;
    };
    let Some(rest) = ORDINAL_SUFFIXES
        .iter()
        .find_map(|&suffix| after.strip_prefix(suffix))
    else {
        return Step::NoMatch;
    };
    match digits.parse::<u32>() {
        Ok(day @ 1..=31) => Step::Matched(Expr::Ordinal(day), rest),
        _ => Step::Rejected(format!("ordinal day out of range (1-31): {digits}")),
    }
}

/// One or more duration terms written back to back, kept in written order.
fn try_durations(input: &str) -> Step<'_, Expr> {
    let mut terms = Vec::new();
    let mut rest = input;
    loop {
        match duration_term(rest) {
            Step::Matched(term, after) => {
                terms.push(term);
                rest = after;
            }
            Step::Rejected(reason) => return Step::Rejected(reason),
            Step::NoMatch => break,
        }
    }

    match terms.len() {
        0 => Step::NoMatch,
        1 => Step::Matched(Expr::Duration(terms[0]), rest),
        _ => Step::Matched(Expr::Chained(terms), rest),
    }
}

/// `[+-]<digits><unit>`; a missing sign means `+`.
fn duration_term(input: &str) -> Step<'_, Duration> {
    let (sign, unsigned) = match input.as_bytes().first() {
        Some(b'+') => (Sign::Plus, &input[1..]),
        Some(b'-') => (Sign::Minus, &input[1..]),
        _ => (Sign::Plus, input),
    };
    let Some((digits, after)) = split_digits(unsigned) else {
        return Step::NoMatch;
    };
    let Some((unit, rest)) = match_keyword(after, UNIT_TOKENS) else {
        return Step::NoMatch;
    };
    match parse_amount(digits) {
        Ok(amount) => Step::Matched(Duration::new(sign, amount, unit), rest),
        Err(reason) => Step::Rejected(reason),
    }
}

// ── Lexing helpers ──────────────────────────────────────────────────────────

fn keyword<'a, T: Copy>(
    input: &'a str,
    table: &[(&str, T)],
    wrap: fn(T) -> Expr,
) -> Step<'a, Expr> {
    match match_keyword(input, table) {
        Some((value, rest)) => Step::Matched(wrap(value), rest),
        None => Step::NoMatch,
    }
}

/// First table entry whose literal prefixes the input.
fn match_keyword<'a, T: Copy>(input: &'a str, table: &[(&str, T)]) -> Option<(T, &'a str)> {
    table
        .iter()
        .find_map(|&(literal, value)| input.strip_prefix(literal).map(|rest| (value, rest)))
}

/// Split a leading run of ASCII digits. `None` if there is none.
fn split_digits(input: &str) -> Option<(&str, &str)> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    (end > 0).then(|| input.split_at(end))
}

fn parse_amount(digits: &str) -> std::result::Result<u64, String> {
    digits
        .parse()
        .map_err(|_| format!("amount out of range: {digits}"))
}

// ── Tests ───────────────────────────────────────────────────────────────────
