use criterion::{Criterion, criterion_group, criterion_main};
use reqcat_parser::declarations::scan;
use std::hint::black_box;

const SAMPLE_DOCUMENT: &str = "\
require ‘preface’
require ‘chapters/setup’

Chapter one. The setup from the previous part is assumed to be done; when it
is not, go back and (require ‘chapters/setup’) finish it first.

Lines that only mention required reading or use 'ascii quotes' are ignored.
require ‘appendix/unclosed
";

fn bench_scan_small(c: &mut Criterion) {
    c.bench_function("scan_small_document", |b| {
        b.iter(|| scan(black_box(SAMPLE_DOCUMENT)))
    });
}

fn bench_scan_large(c: &mut Criterion) {
    let large = SAMPLE_DOCUMENT.repeat(1_000);

    c.bench_function("scan_large_document", |b| {
        b.iter(|| scan(black_box(&large)))
    });
}

criterion_group!(benches, bench_scan_small, bench_scan_large);
criterion_main!(benches);
