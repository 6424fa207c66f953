//! Criterion benchmarks for portfolio capital calculations.
//!
//! Measures the engine over portfolios of increasing size and the
//! distribution of a portfolio adjustment.

use capital_risk::adjustment::AdjustmentBook;
use capital_risk::distribution::{distribute, AdjustmentRequest, DistributionMethod};
use capital_risk::engine::{CapitalEngine, RwaOptions};
use capital_risk::portfolio::{Counterparty, CounterpartyId, Portfolio, PortfolioBuilder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn build_portfolio(size: usize) -> Portfolio {
    let counterparties = (0..size).map(|i| {
        let pd = 0.0005 + (i % 200) as f64 * 0.0005;
        let maturity = 1.0 + (i % 5) as f64;
        Counterparty::new(
            CounterpartyId::new(format!("CP{:06}", i)),
            pd,
            0.45,
            1_000_000.0 + i as f64,
            maturity,
        )
        .expect("valid benchmark counterparty")
    });
    PortfolioBuilder::new()
        .add_counterparties(counterparties)
        .build()
        .expect("unique benchmark ids")
}

/// Benchmark the engine across portfolio sizes.
fn bench_compute_portfolio(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_portfolio");
    let engine = CapitalEngine::new(RwaOptions::default());
    let book = AdjustmentBook::new();

    for size in [100_usize, 1_000, 10_000] {
        let portfolio = build_portfolio(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &portfolio, |b, p| {
            b.iter(|| engine.compute_portfolio(black_box(p), &book));
        });
    }

    group.finish();
}

/// Benchmark distribution of an absolute adjustment.
fn bench_distribute(c: &mut Criterion) {
    let portfolio = build_portfolio(10_000);
    let results = CapitalEngine::default().compute_portfolio(&portfolio, &AdjustmentBook::new());
    let selected: Vec<CounterpartyId> = portfolio.ids().cloned().collect();
    let request = AdjustmentRequest::absolute(-1_000_000.0, DistributionMethod::Proportional);

    c.bench_function("distribute_10000", |b| {
        b.iter(|| distribute(black_box(&results), &selected, &request));
    });
}

criterion_group!(benches, bench_compute_portfolio, bench_distribute);
criterion_main!(benches);
