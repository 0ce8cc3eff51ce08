use criterion::{Criterion, criterion_group, criterion_main};

mod vending_bench;

fn run_benchmarks(c: &mut Criterion) {
    vending_bench::register_benchmarks(c);
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
