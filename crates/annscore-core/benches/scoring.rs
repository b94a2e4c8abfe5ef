use criterion::{black_box, criterion_group, criterion_main, Criterion};

use annscore_core::model::Mode;
use annscore_core::normalize::normalize;
use annscore_core::parser::parse_str;
use annscore_core::scorer::ScoreAccumulator;
use annscore_core::statistics::{cohen_kappa, confusion_counts};

fn make_labels(n: usize) -> (Vec<String>, Vec<String>) {
    let labels = ["Task", "Process", "Material", "NONE"];
    let gold = (0..n).map(|i| labels[i % 4].to_string()).collect();
    let pred = (0..n).map(|i| labels[(i / 2) % 4].to_string()).collect();
    (gold, pred)
}

fn bench_confusion_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("confusion_counts");
    let targets = vec![
        "Task".to_string(),
        "Process".to_string(),
        "Material".to_string(),
    ];

    for size in [100usize, 1000, 10_000] {
        let (gold, pred) = make_labels(size);
        group.bench_function(format!("rows={size}"), |b| {
            b.iter(|| confusion_counts(black_box(&gold), black_box(&pred), black_box(&targets)))
        });
    }

    group.finish();
}

fn bench_cohen_kappa(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohen_kappa");

    for size in [100usize, 1000, 10_000] {
        let (gold, pred) = make_labels(size);
        group.bench_function(format!("rows={size}"), |b| {
            b.iter(|| cohen_kappa(black_box(&gold), black_box(&pred)))
        });
    }

    group.finish();
}

fn bench_accumulator(c: &mut Criterion) {
    let mut doc = String::new();
    for i in 0..500usize {
        let start = i * 10;
        doc.push_str(&format!("T{}\tTask {} {}\tx\n", i + 1, start, start + 5));
    }
    let gold = normalize(parse_str(&doc), Mode::Full);

    c.bench_function("accumulate_and_finalize", |b| {
        b.iter(|| {
            let mut acc = ScoreAccumulator::new(Mode::Full);
            acc.add_document(black_box(&gold), black_box(&gold));
            acc.finalize()
        })
    });
}

criterion_group!(
    benches,
    bench_confusion_counts,
    bench_cohen_kappa,
    bench_accumulator
);
criterion_main!(benches);
