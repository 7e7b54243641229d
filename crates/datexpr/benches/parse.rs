use std::hint::black_box;

use chrono::{DateTime, Weekday};
use criterion::{criterion_group, criterion_main, Criterion};
use datexpr::{evaluate, grammar};

const INPUTS: &[&str] = &[
    "+7d",
    "-1y2m3w4d5h6min7s",
    "eocm",
    "wednesday",
    "september",
    "31st",
    "P1Y2M3DT12H40M50S",
];

fn bench_grammar(c: &mut Criterion) {
    c.bench_function("grammar_parse", |b| {
        b.iter(|| {
            for input in INPUTS {
                black_box(grammar::parse(black_box(input)).unwrap());
            }
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let reference = DateTime::parse_from_rfc3339("2026-06-15T10:30:00Z").unwrap();
    let exprs: Vec<_> = INPUTS.iter().map(|s| grammar::parse(s).unwrap()).collect();
    c.bench_function("evaluate", |b| {
        b.iter(|| {
            for expr in &exprs {
                black_box(evaluate(black_box(expr), &reference, Weekday::Mon).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_grammar, bench_evaluate);
criterion_main!(benches);
