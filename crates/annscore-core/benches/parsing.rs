use criterion::{black_box, criterion_group, criterion_main, Criterion};

use annscore_core::model::Mode;
use annscore_core::normalize::normalize;
use annscore_core::parser::parse_str;

fn make_document(entities: usize, relations: usize) -> String {
    let mut doc = String::new();
    for i in 0..entities {
        let start = i * 10;
        doc.push_str(&format!("T{}\tTask {} {}\ttoken{}\n", i + 1, start, start + 5, i));
    }
    for i in 0..relations {
        doc.push_str(&format!(
            "R{}\tHyponym-of Arg1:T{} Arg2:T{}\n",
            i + 1,
            i % entities + 1,
            (i + 1) % entities + 1
        ));
    }
    doc
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_str");

    for size in [10usize, 100, 1000] {
        let doc = make_document(size, size / 5);
        group.bench_function(format!("entities={size}"), |b| {
            b.iter(|| parse_str(black_box(&doc)))
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [10usize, 100, 1000] {
        let parsed = parse_str(&make_document(size, size / 5));
        group.bench_function(format!("entities={size}"), |b| {
            b.iter(|| normalize(black_box(parsed.clone()), Mode::Full))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_normalize);
criterion_main!(benches);
