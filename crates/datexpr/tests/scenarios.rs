//! End-to-end resolution through the public API.

use chrono::{DateTime, FixedOffset, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use datexpr::{parse, parse_ast, Boundary, DateExprError, Expr, ParseOptions};

/// Monday, June 15, 2026, 10:30:00 UTC
fn options() -> ParseOptions {
    ParseOptions::default().with_reference(Utc.with_ymd_and_hms(2026, 6, 15, 10, 30, 0).unwrap())
}

fn resolve(text: &str) -> String {
    parse(text, &options()).unwrap().to_rfc3339()
}

fn dt(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

#[test]
fn test_scenario_plus_seven_days() {
    assert_eq!(resolve("+7d"), "2026-06-22T10:30:00+00:00");
}

#[test]
fn test_scenario_end_of_month() {
    assert_eq!(resolve("eom"), "2026-06-30T23:59:59+00:00");
}

#[test]
fn test_scenario_monday_is_next_week() {
    assert_eq!(resolve("monday"), "2026-06-22T00:00:00+00:00");
}

#[test]
fn test_scenario_31st_clamped() {
    assert_eq!(resolve("31st"), "2026-06-30T00:00:00+00:00");
}

#[test]
fn test_scenario_iso_duration() {
    assert_eq!(resolve("P1Y2M3DT12H40M50S"), "2027-08-18T23:10:50+00:00");
}

#[test]
fn test_scenario_invalid_inputs() {
    for text in ["invalid", ""] {
        let err = parse(text, &options()).unwrap_err();
        assert!(
            matches!(err, DateExprError::Parse(_)),
            "{text:?} gave {err:?}"
        );
    }
}

#[test]
fn test_socw_is_start_of_week() {
    assert_eq!(parse_ast("socw").unwrap(), Expr::Boundary(Boundary::StartOfWeek));
    assert_eq!(resolve("socw"), resolve("sow"));
}

#[test]
fn test_mixed_case_input() {
    assert_eq!(resolve("  ToMoRRoW "), "2026-06-16T00:00:00+00:00");
    assert_eq!(resolve("p1D"), "2026-06-16T10:30:00+00:00");
}

#[test]
fn test_sunday_week_start() {
    let options = options().with_week_start(Weekday::Sun);
    let eow = parse("eow", &options).unwrap();
    assert_eq!(eow, dt("2026-06-20T23:59:59Z"));
}

#[test]
fn test_offset_stays_fixed_across_dst() {
    // Saturday March 7, 2026, 22:00 EST. US clocks spring forward overnight,
    // but arithmetic stays in the reference's -05:00 offset.
    let reference = New_York.with_ymd_and_hms(2026, 3, 7, 22, 0, 0).unwrap();
    let options = ParseOptions::default().with_reference(reference);

    let next_day = parse("+1d", &options).unwrap();
    assert_eq!(next_day.to_rfc3339(), "2026-03-08T22:00:00-05:00");

    let tomorrow = parse("tomorrow", &options).unwrap();
    assert_eq!(tomorrow.to_rfc3339(), "2026-03-08T00:00:00-05:00");

    let month_later = parse("+1m", &options).unwrap();
    assert_eq!(month_later.to_rfc3339(), "2026-04-07T22:00:00-05:00");
}

#[test]
fn test_results_are_reproducible() {
    let first = parse("-2w3d+4h", &options()).unwrap();
    let second = parse("-2w3d+4h", &options()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, dt("2026-06-04T14:30:00Z"));
}

#[test]
fn test_trailing_input_message() {
    let err = parse("eomx", &options()).unwrap_err();
    assert_eq!(err.to_string(), "Parse error: unexpected trailing input: x");
}

#[test]
fn test_parse_ast_json() {
    let expr = parse_ast("+1d-1h").unwrap();
    let json = serde_json::to_string(&expr).unwrap();
    assert_eq!(
        json,
        r#"{"type":"chained","value":[{"sign":"plus","amount":1,"unit":"days"},{"sign":"minus","amount":1,"unit":"hours"}]}"#
    );
}

#[test]
fn test_concurrent_calls_are_independent() {
    let handles: Vec<_> = ["+1d", "eom", "friday", "P2W", "15th"]
        .into_iter()
        .map(|text| std::thread::spawn(move || (text, parse(text, &options()).unwrap())))
        .collect();
    for handle in handles {
        let (text, result) = handle.join().unwrap();
        assert_eq!(result, parse(text, &options()).unwrap(), "input {text}");
    }
}
