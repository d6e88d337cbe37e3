use std::fs;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use enc_fixture::{parse_fixture, render_fixture, OutputFormat};

fn parse_bench(c: &mut Criterion) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/enc/oneangle_10k_50bins_nu1-00.py");
    let source = fs::read_to_string(path).unwrap();
    let fixture = parse_fixture(&source).unwrap();

    c.bench_function("parse_oneangle_fixture", |b| {
        b.iter(|| black_box(parse_fixture(black_box(&source)).unwrap()));
    });

    c.bench_function("render_oneangle_fixture", |b| {
        b.iter(|| black_box(render_fixture(&fixture, OutputFormat::Python)));
    });
}

criterion_group!(benches, parse_bench);
criterion_main!(benches);
