//! Benchmarks for timeline generation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use typereel::TimelineGenerator;
use typereel::schema::{LimitSpec, SpeedProfile};

fn synthetic_source(lines: usize) -> String {
    let mut out = String::new();
    for i in 0..lines {
        let indent = "\t".repeat(i % 4);
        out.push_str(&format!("{indent}value_{i} = compute({i}) + {i}\n"));
    }
    out
}

fn bench_basic_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("basic_pass");

    for lines in [10usize, 100, 1000] {
        let text = synthetic_source(lines);
        let generator = TimelineGenerator::new(
            &text,
            SpeedProfile::Constant {
                chars_per_sec: 30.0,
                duration: None,
            },
            24,
            1.2,
            1.0,
            1.0,
        );

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{lines}_lines")),
            &lines,
            |b, _| {
                b.iter(|| generator.basic_pass(black_box(1.0)));
            },
        );
    }

    group.finish();
}

fn bench_duration_search(c: &mut Criterion) {
    let text = synthetic_source(100);
    let generator = TimelineGenerator::new(
        &text,
        SpeedProfile::Constant {
            chars_per_sec: 30.0,
            duration: None,
        },
        24,
        1.2,
        0.0,
        0.0,
    );

    c.bench_function("duration_search", |b| {
        b.iter(|| generator.generate(black_box(LimitSpec::Duration(30.0))));
    });
}

criterion_group!(benches, bench_basic_pass, bench_duration_search);
criterion_main!(benches);
