//! # datexpr
//!
//! Taskwarrior-style date expressions resolved to concrete instants.
//!
//! An expression such as `+7d`, `eom`, `monday`, `15th` or `P1Y2M` is parsed
//! into an [`Expr`] and then evaluated against a reference instant. Both
//! steps are pure: given an explicit reference the result is reproducible,
//! and the UTC offset of the reference is kept through all arithmetic.
//!
//! ## Modules
//!
//! - [`grammar`] — text → [`Expr`], with a fixed disambiguation order
//! - [`calc`] — [`Expr`] + reference + week start → instant
//! - [`ast`] — the closed set of expression variants
//! - [`api`] — [`parse`], [`parse_or_panic`] and [`parse_ast`] with [`ParseOptions`]
//! - [`error`] — Error types
//!
//! ```
//! use chrono::DateTime;
//! use datexpr::{parse, ParseOptions};
//!
//! let reference = DateTime::parse_from_rfc3339("2026-06-15T10:30:00Z").unwrap();
//! let options = ParseOptions::default().with_reference(reference);
//!
//! assert_eq!(parse("monday", &options).unwrap().to_rfc3339(), "2026-06-22T00:00:00+00:00");
//! assert_eq!(parse("31st", &options).unwrap().to_rfc3339(), "2026-06-30T00:00:00+00:00");
//! ```

pub mod api;
pub mod ast;
pub mod calc;
pub mod error;
pub mod grammar;

pub use api::{parse, parse_ast, parse_or_panic, week_start_from_iso, ParseOptions, WeekStart};
pub use ast::{Boundary, Duration, Expr, IsoDuration, Sign, Synonym, Unit};
pub use calc::{add_months, evaluate};
pub use error::{DateExprError, Result};
