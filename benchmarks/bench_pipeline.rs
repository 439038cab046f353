use std::hint::black_box;
use std::io;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use linesift::error::Result;
use linesift::sequential;
use linesift::{FilterSpec, LineRecord, OutputMode, ParallelConfig, ParallelProcessor};

const LINES: usize = 50_000;

fn sample_lines() -> Vec<String> {
    (0..LINES)
        .map(|i| match i % 5 {
            0 => format!("2024-03-01T12:00:{:02}Z ERROR request {} failed: timeout", i % 60, i),
            1 => format!("2024-03-01T12:00:{:02}Z WARN request {} slow", i % 60, i),
            _ => format!("2024-03-01T12:00:{:02}Z INFO request {} ok status=200", i % 60, i),
        })
        .collect()
}

fn records(lines: &[String]) -> impl Iterator<Item = Result<LineRecord>> + Send + '_ {
    lines
        .iter()
        .enumerate()
        .map(|(seq, text)| Ok(LineRecord::new(seq as u64, text.as_str())))
}

fn bench_sequential(c: &mut Criterion) {
    let lines = sample_lines();
    let predicate = FilterSpec::new(Some(r"ERROR|WARN".to_string()), false)
        .compile()
        .unwrap();

    let mut group = c.benchmark_group("sequential");
    group.throughput(Throughput::Elements(LINES as u64));
    group.bench_function("print", |b| {
        b.iter(|| {
            let stats =
                sequential::run(records(&lines), &predicate, OutputMode::Print, &mut io::sink())
                    .unwrap();
            black_box(stats);
        });
    });
    group.finish();
}

fn bench_parallel_workers(c: &mut Criterion) {
    let lines = sample_lines();
    let predicate = FilterSpec::new(Some(r"ERROR|WARN".to_string()), false)
        .compile()
        .unwrap();

    let mut group = c.benchmark_group("parallel");
    group.throughput(Throughput::Elements(LINES as u64));
    for workers in [1usize, 2, 4, 8] {
        for mode in [OutputMode::Print, OutputMode::Count] {
            let processor = ParallelProcessor::new(ParallelConfig::default().with_workers(workers));
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode).to_lowercase(), workers),
                &workers,
                |b, _| {
                    b.iter(|| {
                        let stats = processor
                            .process(records(&lines), &predicate, mode, &mut io::sink())
                            .unwrap();
                        black_box(stats);
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_small_buffers(c: &mut Criterion) {
    let lines = sample_lines();
    let predicate = FilterSpec::new(Some("request".to_string()), true)
        .compile()
        .unwrap();

    let mut group = c.benchmark_group("buffer_size");
    for buffer_size in [1usize, 64, 10_000] {
        let processor = ParallelProcessor::new(
            ParallelConfig::default()
                .with_workers(4)
                .with_buffer_size(buffer_size),
        );
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &buffer_size,
            |b, _| {
                b.iter(|| {
                    let stats = processor
                        .process(records(&lines), &predicate, OutputMode::Print, &mut io::sink())
                        .unwrap();
                    black_box(stats);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential,
    bench_parallel_workers,
    bench_small_buffers
);
criterion_main!(benches);
