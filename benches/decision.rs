//! Benchmarks for the signal decision path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liquidity_radar::config::SignalConfig;
use liquidity_radar::quotes::Quote;
use liquidity_radar::signal::SignalMachine;
use rust_decimal_macros::dec;

fn quote(symbol: &str, volume: rust_decimal::Decimal) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price: dec!(2.50),
        volume,
        percent_change: dec!(1.5),
    }
}

fn benchmark_holding_observation(c: &mut Criterion) {
    let mut machine = SignalMachine::new(SignalConfig::default(), dec!(50000));
    let now = chrono::Utc::now();
    machine.observe(&quote("SNDL", dec!(120000)), true, now);

    // in-band observation: ratio check plus history push, no transition
    let obs = quote("SNDL", dec!(118000));
    c.bench_function("observe_holding", |b| {
        b.iter(|| machine.observe(black_box(&obs), true, now))
    });
}

fn benchmark_entry_exit_cycle(c: &mut Criterion) {
    let now = chrono::Utc::now();
    let entry = quote("SNDL", dec!(120000));
    let crash = quote("SNDL", dec!(30000));

    c.bench_function("entry_exit_cycle", |b| {
        b.iter(|| {
            let mut machine = SignalMachine::new(SignalConfig::default(), dec!(50000));
            machine.observe(black_box(&entry), true, now);
            machine.observe(black_box(&crash), true, now)
        })
    });
}

criterion_group!(
    benches,
    benchmark_holding_observation,
    benchmark_entry_exit_cycle
);
criterion_main!(benches);
