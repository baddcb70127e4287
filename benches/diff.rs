//! Benchmarks for the minimal text diff.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use codefence::sync::compute_change;

fn bench_diff_single_keystroke(c: &mut Criterion) {
    let old = "function max(a, b) {\n  return a > b ? a : b\n}";
    let new = "function maxi(a, b) {\n  return a > b ? a : b\n}";
    c.bench_function("diff_single_keystroke", |b| {
        b.iter(|| compute_change(black_box(old), black_box(new)))
    });
}

fn bench_diff_large_equal(c: &mut Criterion) {
    let text: String = "let value = compute(input);\n".repeat(2_000);
    c.bench_function("diff_large_equal", |b| {
        b.iter(|| compute_change(black_box(&text), black_box(&text)))
    });
}

fn bench_diff_large_middle_edit(c: &mut Criterion) {
    let old: String = "let value = compute(input);\n".repeat(2_000);
    let mut new = old.clone();
    let mid = new.len() / 2;
    new.insert_str(mid, "changed");
    c.bench_function("diff_large_middle_edit", |b| {
        b.iter(|| compute_change(black_box(&old), black_box(&new)))
    });
}

criterion_group!(
    benches,
    bench_diff_single_keystroke,
    bench_diff_large_equal,
    bench_diff_large_middle_edit
);
criterion_main!(benches);
