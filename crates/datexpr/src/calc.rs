//! Evaluation of parsed expressions against a reference instant.
//!
//! All arithmetic happens in the reference's UTC offset, which stays fixed
//! for the whole evaluation. Seconds through weeks are exact elapsed time;
//! months and years move the calendar date through [`add_months`] and keep
//! the time of day.
//!
//! Boundaries and keyword results land on whole seconds: `00:00:00` for
//! starts and `23:59:59` for ends.

use chrono::{
    DateTime, Datelike, FixedOffset, Month, NaiveDate, NaiveDateTime, TimeZone, Weekday,
};
use tracing::debug;

use crate::ast::{Boundary, Duration, Expr, IsoDuration, Sign, Synonym, Unit};
use crate::error::{DateExprError, Result};

/// Evaluate `expr` relative to `reference`.
///
/// `week_start` only affects the week boundaries (`sow`, `eow`). Named
/// weekdays always resolve to the next occurrence strictly after the
/// reference date.
///
/// # Errors
///
/// Returns [`DateExprError::Calc`] if a constructed date falls outside the
/// range chrono can represent, or a duration amount overflows.
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Weekday};
/// use datexpr::calc::evaluate;
/// use datexpr::grammar::parse;
///
/// let reference = DateTime::parse_from_rfc3339("2026-06-15T10:30:00Z").unwrap();
/// let result = evaluate(&parse("eom").unwrap(), &reference, Weekday::Mon).unwrap();
/// assert_eq!(result.to_rfc3339(), "2026-06-30T23:59:59+00:00");
/// ```
pub fn evaluate<Tz: TimeZone>(
    expr: &Expr,
    reference: &DateTime<Tz>,
    week_start: Weekday,
) -> Result<DateTime<FixedOffset>> {
    let reference = reference.fixed_offset();

    let result = match expr {
        Expr::Duration(d) => apply_duration(reference, d),
        Expr::Chained(terms) => terms.iter().try_fold(reference, apply_duration),
        Expr::Synonym(s) => resolve_synonym(reference, *s),
        Expr::Weekday(w) => next_weekday(reference, *w),
        Expr::Month(m) => next_month_start(reference, *m),
        Expr::Ordinal(day) => next_day_of_month(reference, *day),
        Expr::Boundary(b) => resolve_boundary(reference, *b, week_start),
        Expr::Iso(iso) => apply_iso(reference, iso),
    }?;

    debug!(%expr, %reference, %result, "evaluated date expression");
    Ok(result)
}

// ── Durations ───────────────────────────────────────────────────────────────

fn apply_duration(at: DateTime<FixedOffset>, d: &Duration) -> Result<DateTime<FixedOffset>> {
    shift(at, d.sign, d.amount, d.unit)
}

/// Apply ISO components in order: years, months, weeks, days, hours,
/// minutes, seconds.
fn apply_iso(at: DateTime<FixedOffset>, iso: &IsoDuration) -> Result<DateTime<FixedOffset>> {
    iso.components()
        .try_fold(at, |acc, (unit, amount)| shift(acc, Sign::Plus, amount, unit))
}

fn shift(
    at: DateTime<FixedOffset>,
    sign: Sign,
    amount: u64,
    unit: Unit,
) -> Result<DateTime<FixedOffset>> {
    let overflow = || DateExprError::Calc(format!("duration out of range: {amount} {unit:?}"));
    let signed = i64::try_from(amount).map_err(|_| overflow())? * sign.factor();

    match unit.fixed_seconds() {
        Some(per_unit) => {
            let delta = signed
                .checked_mul(per_unit)
                .and_then(chrono::Duration::try_seconds)
                .ok_or_else(overflow)?;
            at.checked_add_signed(delta).ok_or_else(|| {
                DateExprError::Calc(format!("invalid date: {at} {signed:+} {unit:?}"))
            })
        }
        None => {
            let months = match unit {
                Unit::Years => signed.checked_mul(12).ok_or_else(overflow)?,
                _ => signed,
            };
            let date = add_months(at.date_naive(), months).ok_or_else(|| {
                DateExprError::Calc(format!(
                    "invalid date: {} {months:+} months",
                    at.date_naive()
                ))
            })?;
            localize(date.and_time(at.time()), at.offset())
        }
    }
}

/// Move `date` by `months` calendar months.
///
/// The day of month is kept when the target month has it, otherwise it is
/// clamped to the target month's last day: Jan 31 + 1 month is Feb 28, or
/// Feb 29 in a leap year. Returns `None` outside chrono's date range.
///
/// ```
/// use chrono::NaiveDate;
/// use datexpr::calc::add_months;
///
/// let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(add_months(jan31, 1), NaiveDate::from_ymd_opt(2024, 2, 29));
/// ```
pub fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(date.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, date.day().min(last.day()))
}

// ── Keywords ────────────────────────────────────────────────────────────────

fn resolve_synonym(at: DateTime<FixedOffset>, synonym: Synonym) -> Result<DateTime<FixedOffset>> {
    let today = at.date_naive();
    match synonym {
        Synonym::Now => Ok(at),
        Synonym::Today => start_of(today, at.offset()),
        Synonym::Yesterday => start_of(step_days(today, -1)?, at.offset()),
        Synonym::Tomorrow => start_of(step_days(today, 1)?, at.offset()),
    }
}

/// Next `target` weekday strictly after the reference date, at midnight.
fn next_weekday(at: DateTime<FixedOffset>, target: Weekday) -> Result<DateTime<FixedOffset>> {
    let current = i64::from(at.weekday().number_from_monday());
    let target = i64::from(target.number_from_monday());

    let days_ahead = if target > current {
        target - current
    } else {
        7 - current + target
    };
    // Same weekday means next week, never today.
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };

    start_of(step_days(at.date_naive(), days_ahead)?, at.offset())
}

/// First day of `target`: this year if the month is still ahead, else next
/// year. The current month counts as passed.
fn next_month_start(at: DateTime<FixedOffset>, target: Month) -> Result<DateTime<FixedOffset>> {
    let month = target.number_from_month();
    let year = if month > at.month() {
        at.year()
    } else {
        at.year() + 1
    };
    start_of(ymd(year, month, 1)?, at.offset())
}

/// Day `day` of this month if it is still ahead, else of next month. Clamped
/// to the length of the chosen month.
fn next_day_of_month(at: DateTime<FixedOffset>, day: u32) -> Result<DateTime<FixedOffset>> {
    let (year, month) = if day <= at.day() {
        following_month(at.year(), at.month())
    } else {
        (at.year(), at.month())
    };
    let last = last_day_of_month(year, month)
        .ok_or_else(|| DateExprError::Calc(format!("invalid date: {year}-{month:02}")))?;
    start_of(ymd(year, month, day.min(last.day()))?, at.offset())
}

// ── Period boundaries ───────────────────────────────────────────────────────

fn resolve_boundary(
    at: DateTime<FixedOffset>,
    boundary: Boundary,
    week_start: Weekday,
) -> Result<DateTime<FixedOffset>> {
    let offset = at.offset();
    let today = at.date_naive();
    let (year, month) = (at.year(), at.month());
    let quarter_first_month = ((month - 1) / 3) * 3 + 1;

    let date = match boundary {
        Boundary::StartOfWeek => week_start_date(today, week_start)?,
        Boundary::EndOfWeek => step_days(week_start_date(today, week_start)?, 6)?,
        Boundary::StartOfMonth => ymd(year, month, 1)?,
        Boundary::EndOfMonth => last_day(year, month)?,
        Boundary::StartOfQuarter => ymd(year, quarter_first_month, 1)?,
        Boundary::EndOfQuarter => last_day(year, quarter_first_month + 2)?,
        Boundary::StartOfYear => ymd(year, 1, 1)?,
        Boundary::EndOfYear => ymd(year, 12, 31)?,
        Boundary::EndOfDay => today,
    };

    if boundary.is_end() {
        end_of(date, offset)
    } else {
        start_of(date, offset)
    }
}

/// The most recent `week_start` on or before `date`.
fn week_start_date(date: NaiveDate, week_start: Weekday) -> Result<NaiveDate> {
    let current = i64::from(date.weekday().num_days_from_monday());
    let start = i64::from(week_start.num_days_from_monday());
    step_days(date, -(current - start).rem_euclid(7))
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = following_month(year, month);
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

fn last_day(year: i32, month: u32) -> Result<NaiveDate> {
    last_day_of_month(year, month)
        .ok_or_else(|| DateExprError::Calc(format!("invalid date: end of {year}-{month:02}")))
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateExprError::Calc(format!("invalid date: {year}-{month:02}-{day:02}")))
}

fn step_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    chrono::Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| DateExprError::Calc(format!("invalid date: {date} {days:+} days")))
}

fn start_of(date: NaiveDate, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    at_hms(date, 0, 0, 0, offset)
}

fn end_of(date: NaiveDate, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    at_hms(date, 23, 59, 59, offset)
}

fn at_hms(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    second: u32,
    offset: &FixedOffset,
) -> Result<DateTime<FixedOffset>> {
    let naive = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| DateExprError::Calc(format!("invalid time on {date}")))?;
    localize(naive, offset)
}

fn localize(naive: NaiveDateTime, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| DateExprError::Calc(format!("invalid date: {naive} {offset}")))
}

// ── Tests ───────────────────────────────────────────────────────────────────
