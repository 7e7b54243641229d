//! Parsed representation of a single date expression.
//!
//! [`Expr`] is a closed set of variants. The grammar returns exactly one of
//! them per input and the evaluator matches them exhaustively.

use std::fmt;

use chrono::{Month, Weekday};
use serde::Serialize;

// ── Durations ───────────────────────────────────────────────────────────────

/// Direction of a duration. A duration written without a sign is `Plus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// `+1` or `-1`.
    pub fn factor(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }
}

/// Unit of a duration term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Unit {
    /// Length of one unit in seconds, for the fixed-length units.
    ///
    /// Months and years depend on the calendar and return `None`.
    pub fn fixed_seconds(self) -> Option<i64> {
        match self {
            Unit::Seconds => Some(1),
            Unit::Minutes => Some(60),
            Unit::Hours => Some(3_600),
            Unit::Days => Some(86_400),
            Unit::Weeks => Some(604_800),
            Unit::Months | Unit::Years => None,
        }
    }

    /// Shortest token the grammar accepts for this unit.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Unit::Seconds => "s",
            Unit::Minutes => "min",
            Unit::Hours => "h",
            Unit::Days => "d",
            Unit::Weeks => "w",
            Unit::Months => "m",
            Unit::Years => "y",
        }
    }
}

/// One `<sign><amount><unit>` term, e.g. `-3d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub sign: Sign,
    pub amount: u64,
    pub unit: Unit,
}

impl Duration {
    pub fn new(sign: Sign, amount: u64, unit: Unit) -> Self {
        Duration { sign, amount, unit }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.sign {
            Sign::Plus => '+',
            Sign::Minus => '-',
        };
        write!(f, "{sign}{}{}", self.amount, self.unit.abbreviation())
    }
}

// ── ISO-8601 durations ──────────────────────────────────────────────────────

/// An ISO-8601 duration such as `P1Y2M3DT4H`.
///
/// Only the components that were written are present. The grammar never
/// produces `weeks` together with `years`, `months` or `days`, and never
/// produces a value with every component absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IsoDuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl IsoDuration {
    /// Present components in application order: years, months, weeks, days,
    /// hours, minutes, seconds.
    pub fn components(&self) -> impl Iterator<Item = (Unit, u64)> {
        [
            (Unit::Years, self.years),
            (Unit::Months, self.months),
            (Unit::Weeks, self.weeks),
            (Unit::Days, self.days),
            (Unit::Hours, self.hours),
            (Unit::Minutes, self.minutes),
            (Unit::Seconds, self.seconds),
        ]
        .into_iter()
        .filter_map(|(unit, amount)| amount.map(|n| (unit, n)))
    }

    pub fn is_empty(&self) -> bool {
        self.components().next().is_none()
    }

    fn has_time_part(&self) -> bool {
        self.hours.is_some() || self.minutes.is_some() || self.seconds.is_some()
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        let date_part = [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ];
        for (n, designator) in date_part {
            if let Some(n) = n {
                write!(f, "{n}{designator}")?;
            }
        }
        if self.has_time_part() {
            f.write_str("T")?;
            for (n, designator) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if let Some(n) = n {
                    write!(f, "{n}{designator}")?;
                }
            }
        }
        Ok(())
    }
}

// ── Keywords ────────────────────────────────────────────────────────────────

/// Fixed keywords anchored on the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Synonym {
    Now,
    Today,
    Yesterday,
    Tomorrow,
}

impl Synonym {
    pub fn as_str(self) -> &'static str {
        match self {
            Synonym::Now => "now",
            Synonym::Today => "today",
            Synonym::Yesterday => "yesterday",
            Synonym::Tomorrow => "tomorrow",
        }
    }
}

/// Start or end of the period containing the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    StartOfWeek,
    EndOfWeek,
    StartOfMonth,
    EndOfMonth,
    StartOfQuarter,
    EndOfQuarter,
    StartOfYear,
    EndOfYear,
    EndOfDay,
}

impl Boundary {
    /// Canonical short token (`sow`, `eom`, ...).
    pub fn token(self) -> &'static str {
        match self {
            Boundary::StartOfWeek => "sow",
            Boundary::EndOfWeek => "eow",
            Boundary::StartOfMonth => "som",
            Boundary::EndOfMonth => "eom",
            Boundary::StartOfQuarter => "soq",
            Boundary::EndOfQuarter => "eoq",
            Boundary::StartOfYear => "soy",
            Boundary::EndOfYear => "eoy",
            Boundary::EndOfDay => "eod",
        }
    }

    /// Whether the boundary resolves to 23:59:59 rather than 00:00:00.
    pub fn is_end(self) -> bool {
        matches!(
            self,
            Boundary::EndOfWeek
                | Boundary::EndOfMonth
                | Boundary::EndOfQuarter
                | Boundary::EndOfYear
                | Boundary::EndOfDay
        )
    }
}

// ── Expr ────────────────────────────────────────────────────────────────────

/// A parsed date expression.
///
/// A single duration term parses to [`Expr::Duration`]; two or more terms
/// written back to back parse to [`Expr::Chained`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Expr {
    Duration(Duration),
    Chained(Vec<Duration>),
    Synonym(Synonym),
    Weekday(Weekday),
    Month(Month),
    /// Day of month, always within 1-31.
    Ordinal(u32),
    Boundary(Boundary),
    Iso(IsoDuration),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Duration(d) => fmt::Display::fmt(d, f),
            Expr::Chained(terms) => terms.iter().try_for_each(|d| fmt::Display::fmt(d, f)),
            Expr::Synonym(s) => f.write_str(s.as_str()),
            Expr::Weekday(w) => f.write_str(weekday_name(*w)),
            Expr::Month(m) => f.write_str(&m.name().to_lowercase()),
            Expr::Ordinal(day) => write!(f, "{day}{}", ordinal_suffix(*day)),
            Expr::Boundary(b) => f.write_str(b.token()),
            Expr::Iso(iso) => fmt::Display::fmt(iso, f),
        }
    }
}

fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_chained_keeps_order() {
        let expr = Expr::Chained(vec![
            Duration::new(Sign::Plus, 1, Unit::Days),
            Duration::new(Sign::Minus, 2, Unit::Hours),
            Duration::new(Sign::Plus, 30, Unit::Minutes),
        ]);
        assert_eq!(expr.to_string(), "+1d-2h+30min");
    }

    #[test]
    fn test_display_ordinal_suffixes() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .into_iter()
            .map(|d| Expr::Ordinal(d).to_string())
            .collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }

    #[test]
    fn test_display_iso_with_time_part() {
        let iso = IsoDuration {
            years: Some(1),
            days: Some(3),
            minutes: Some(40),
            ..Default::default()
        };
        assert_eq!(Expr::Iso(iso).to_string(), "P1Y3DT40M");
    }

    #[test]
    fn test_display_iso_weeks_only() {
        let iso = IsoDuration {
            weeks: Some(2),
            ..Default::default()
        };
        assert_eq!(iso.to_string(), "P2W");
    }

    #[test]
    fn test_iso_components_fixed_order() {
        let iso = IsoDuration {
            seconds: Some(5),
            years: Some(1),
            hours: Some(2),
            ..Default::default()
        };
        let units: Vec<Unit> = iso.components().map(|(u, _)| u).collect();
        assert_eq!(units, [Unit::Years, Unit::Hours, Unit::Seconds]);
        assert!(!iso.is_empty());
        assert!(IsoDuration::default().is_empty());
    }

    #[test]
    fn test_display_keywords() {
        assert_eq!(Expr::Synonym(Synonym::Yesterday).to_string(), "yesterday");
        assert_eq!(Expr::Weekday(Weekday::Thu).to_string(), "thursday");
        assert_eq!(Expr::Month(Month::September).to_string(), "september");
        assert_eq!(Expr::Boundary(Boundary::EndOfQuarter).to_string(), "eoq");
    }

    #[test]
    fn test_boundary_end_flag() {
        assert!(Boundary::EndOfDay.is_end());
        assert!(Boundary::EndOfWeek.is_end());
        assert!(!Boundary::StartOfQuarter.is_end());
    }

    #[test]
    fn test_serialize_duration_shape() {
        let expr = Expr::Duration(Duration::new(Sign::Minus, 7, Unit::Days));
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "duration",
                "value": { "sign": "minus", "amount": 7, "unit": "days" }
            })
        );
    }

    #[test]
    fn test_serialize_iso_skips_absent_components() {
        let expr = Expr::Iso(IsoDuration {
            months: Some(2),
            ..Default::default()
        });
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "iso", "value": { "months": 2 } })
        );
    }
}
