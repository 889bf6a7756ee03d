use std::hint::black_box;
use std::path::PathBuf;

use ai_history_recovery::filters::apply::apply_filters;
use ai_history_recovery::filters::parser::parse_filter;
use ai_history_recovery::models::RecoveredFile;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const EXTENSIONS: &[&str] = &["py", "rs", "md", "ts", "tmp"];

/// Generate synthetic RecoveredFile data
fn generate_files(num_files: usize) -> Vec<RecoveredFile> {
    (0..num_files)
        .map(|i| {
            let ext = EXTENSIONS[i % EXTENSIONS.len()];
            let name = format!("file_{}.{}", i, ext);
            RecoveredFile {
                location: PathBuf::from(format!("/recovery/session_{}/{}", i % 20, name)),
                name,
                file_type: ext.to_string(),
                size_bytes: (i as u64 * 37) % 50_000,
                created: Some(format!("2026-01-{:02}T10:00:00", i % 28 + 1)),
                last_modified: Some(format!("2026-02-{:02}T10:00:00", i % 28 + 1)),
                edits: i % 15,
                sessions: (0..(i % 4 + 1)).map(|s| format!("session-{}", (i + s) % 20)).collect(),
            }
        })
        .collect()
}

fn bench_filter_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_application");

    let cases = [
        ("extension_filter", "ext:py ext:rs"),
        ("edits_range_filter", "edits:3..10"),
        ("datetime_filter", "after:2026-02-10 before:2026-02-20"),
        ("session_filter", "-session:session-1 -session:session-2"),
        ("combined_filter", "ext:py size:1000.. edits:2.. after:2026-02-05 -session:session-3"),
    ];

    for (name, query) in cases {
        let filter = parse_filter(query).unwrap();
        for size in [1_000, 10_000, 50_000].iter() {
            let files = generate_files(*size);

            group.throughput(Throughput::Elements(*size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), size, |b, _| {
                b.iter(|| apply_filters(black_box(files.clone()), black_box(&filter)));
            });
        }
    }

    group.finish();
}

fn bench_filter_parsing(c: &mut Criterion) {
    c.bench_function("parse_filter", |b| {
        b.iter(|| {
            parse_filter(black_box(
                "ext:py -ext:tmp edits:2..10 size:..100000 after:\"2026-02-01 09:00\" session:abc",
            ))
        })
    });
}

criterion_group!(benches, bench_filter_application, bench_filter_parsing);
criterion_main!(benches);
