//! Mapping and cleaning performance benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldmap::mapping::{FuzzyConfig, MapperConfig};
use fieldmap::{clean_cell, DataTable, FieldRule, FieldType, RuleSet, SynonymMapper, ValidationEngine};

/// Raw values as they show up in legacy maintenance exports.
const DATE_SAMPLES: &[&str] = &[
    "2024-01-05",
    "01/05/2024",
    "1/5/24",
    "5 Jan 2024",
    "January 5, 2024",
    "2024-01-05 13:45:10",
    "2024-01-05T08:30:00Z",
    "20240105",
    "not-a-date",
    "",
];

const NUMBER_SAMPLES: &[&str] = &["12", "12.50", "$1,200.00", "-3", "1,234,567", "ten", "n/a"];

/// Headers from a typical export.
const HEADERS: &[&str] = &[
    "Equipment",
    "WO #",
    "WO Date",
    "Date Completed",
    "Work Description",
    "Urgency",
    "WO Status",
    "Man Hours",
    "Total Cost",
    "Technician",
    "Notes",
    "Asset Clss",
];

fn generate_table(rows: usize) -> DataTable {
    let headers = HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = (0..rows)
        .map(|i| {
            vec![
                format!("P-{}", i),
                format!("WO-{}", i),
                DATE_SAMPLES[i % DATE_SAMPLES.len()].to_string(),
                "2024-02-01".to_string(),
                "Replace seal".to_string(),
                ["Low", "High", "Urgent"][i % 3].to_string(),
                ["Open", "Closed", "Pending"][i % 3].to_string(),
                NUMBER_SAMPLES[i % NUMBER_SAMPLES.len()].to_string(),
                "$250.00".to_string(),
                "J. Smith".to_string(),
                String::new(),
                "Pump".to_string(),
            ]
        })
        .collect();
    DataTable::new(headers, rows)
}

/// Benchmark per-cell cleaning.
fn bench_clean_cell(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_cell");
    let date = FieldRule::new("Work Order Date", FieldType::Date).with_required(true);
    let number = FieldRule::new("Cost", FieldType::Number);
    let status = FieldRule::new("Status", FieldType::Text)
        .with_reference_values(["Open", "In Progress", "On Hold", "Closed"]);

    group.bench_function("dates_10", |b| {
        b.iter(|| {
            for sample in DATE_SAMPLES {
                black_box(clean_cell(sample, &date));
            }
        })
    });

    group.bench_function("numbers_7", |b| {
        b.iter(|| {
            for sample in NUMBER_SAMPLES {
                black_box(clean_cell(sample, &number));
            }
        })
    });

    group.bench_function("reference_text", |b| {
        b.iter(|| black_box(clean_cell("Pending", &status)))
    });

    group.finish();
}

/// Benchmark column mapping.
fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    let rules = RuleSet::builtin_cmms().unwrap();

    let exact = SynonymMapper::new();
    group.bench_function("synonyms_12_columns", |b| {
        b.iter(|| black_box(exact.map_columns(HEADERS, &rules)))
    });

    let fuzzy = SynonymMapper::with_config(&MapperConfig {
        fuzzy: Some(FuzzyConfig::default()),
        ..MapperConfig::default()
    });
    group.bench_function("fuzzy_12_columns", |b| {
        b.iter(|| black_box(fuzzy.map_columns(HEADERS, &rules)))
    });

    group.finish();
}

/// Benchmark full validation at different table sizes.
fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    let rules = RuleSet::builtin_cmms().unwrap();
    let engine = ValidationEngine::new();

    for rows in [100, 1_000, 10_000] {
        let table = generate_table(rows);
        let mapping = SynonymMapper::new().map_table(&table, &rules);
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| black_box(engine.validate(table, &mapping, &rules)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clean_cell, bench_mapping, bench_validation);
criterion_main!(benches);
