use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reg_deriv::pattern::{digit, or, seq, text};
use reg_deriv::{Matcher, RegexGraph};
use serde_json::Value;

fn phone_number() -> Value {
    let mut items = vec![or(vec![
        seq(vec![text("("), digit(), digit(), digit(), text(") ")]),
        text(""),
    ])];
    items.extend([digit(), digit(), digit(), text("-")]);
    items.extend([digit(), digit(), digit(), digit()]);
    seq(items)
}

fn criterion_benchmark_phone_numbers(c: &mut Criterion) {
    let regex = RegexGraph::compile(&phone_number()).unwrap();
    let subjects = ["(415) 555-1212", "555-1212", "squirrel", "(415) 555-121x"];
    let oracle = regex::Regex::new(r"^(\([0-9]{3}\) )?[0-9]{3}-[0-9]{4}$").unwrap();
    let expected: Vec<bool> = subjects.iter().map(|s| oracle.is_match(s)).collect();

    c.bench_function("match phone numbers", |b| {
        b.iter(|| {
            let actual: Vec<bool> = subjects
                .iter()
                .map(|s| regex.is_match(black_box(s)))
                .collect();
            assert_eq!(expected, actual)
        })
    });
}

fn criterion_benchmark_long_repetition(c: &mut Criterion) {
    let regex = RegexGraph::parse("(abc)*d").unwrap();
    let subject = "abc".repeat(10_000) + "d";

    c.bench_function("match long repetition", |b| {
        b.iter(|| assert!(regex.is_match(black_box(&subject))))
    });
}

criterion_group!(
    benches,
    criterion_benchmark_phone_numbers,
    criterion_benchmark_long_repetition
);
criterion_main!(benches);
