//! Pipeline performance benchmarks.
//!
//! Measures parsing, detection, correction, and full runs on synthetic
//! customer tables of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cleanroom::correction::CorrectionEngine;
use cleanroom::matching::FuzzyMatcher;
use cleanroom::{DetectionEngine, MockProvider, Parser, Pipeline, PipelineConfig, Vocabularies};

/// Generate a messy customer CSV with the specified number of rows.
fn generate_customers(rows: usize) -> String {
    let mut data = String::from(
        "first_name,last_name,email,phone,gender,marital_status,age,loyalty_points,country,city\n",
    );

    let first_names = ["john", "Jane", " ", "bob", "ALICE", "nan"];
    let genders = ["Male", "Female", "F", "other", ""];
    let statuses = ["Single", "married", "Divorced", "?"];
    let countries = ["United States", "untied states", "Germny", "india", "Atlantis", ""];
    let cities = ["Gotham", "new york", "Springfeld", "Metropolis", "Unknown"];

    for row in 0..rows {
        let age = match row % 7 {
            0 => "-5".to_string(),
            1 => String::new(),
            _ => (18 + row % 60).to_string(),
        };
        let phone = match row % 4 {
            0 => format!("555-{:04}", row % 10_000),
            1 => format!("+1 (555) 010-{:04}", row % 10_000),
            2 => "12-34".to_string(),
            _ => format!("{:07}", row),
        };
        data.push_str(&format!(
            "{},Doe,user{}@example.com,{},{},{},{},{},{},{}\n",
            first_names[row % first_names.len()],
            row,
            phone,
            genders[row % genders.len()],
            statuses[row % statuses.len()],
            age,
            (row as i64 * 37) % 2_000 - 100,
            countries[row % countries.len()],
            cities[row % cities.len()],
        ));
    }

    data
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = Parser::new();

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_customers(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| parser.parse_bytes(black_box(data.as_bytes()), b',').unwrap())
        });
    }

    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let engine = DetectionEngine::new(&Vocabularies::default());

    for rows in [100, 1_000, 10_000].iter() {
        let dataset = Parser::new()
            .parse_bytes(generate_customers(*rows).as_bytes(), b',')
            .unwrap();
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, dataset| {
            b.iter(|| engine.detect(black_box(dataset.clone())))
        });
    }

    group.finish();
}

fn bench_correct(c: &mut Criterion) {
    let mut group = c.benchmark_group("correct");
    let engine = CorrectionEngine::new(&PipelineConfig::default());

    for rows in [100, 1_000, 10_000].iter() {
        let dataset = Parser::new()
            .parse_bytes(generate_customers(*rows).as_bytes(), b',')
            .unwrap();
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, dataset| {
            b.iter(|| engine.correct(black_box(dataset.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_fuzzy_match(c: &mut Criterion) {
    let vocabularies = Vocabularies::default();
    let matcher = FuzzyMatcher::new(70.0);

    c.bench_function("fuzzy_match_country", |b| {
        b.iter(|| matcher.resolve(black_box("untied kingdom"), &vocabularies.countries))
    });
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(20);
    let pipeline = Pipeline::new().with_llm(MockProvider::new());

    for rows in [100, 1_000].iter() {
        let dataset = Parser::new()
            .parse_bytes(generate_customers(*rows).as_bytes(), b',')
            .unwrap();
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, dataset| {
            b.iter(|| pipeline.run(black_box(dataset.clone())).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_detect,
    bench_correct,
    bench_fuzzy_match,
    bench_full_run
);
criterion_main!(benches);
