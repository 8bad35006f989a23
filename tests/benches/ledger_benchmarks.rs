//! # Asset Ledger Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `lifecycle` | create + commit, transfer + commit |
//! | `queries` | full listing and history reconstruction by size |
//! | `dispatch` | invocation parsing and JSON rendering |

use asset_transfer::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

fn admin() -> Principal {
    Principal::admin("admin")
}

fn populated(assets: usize) -> (InMemoryLedger, AssetTransferService) {
    let ledger = InMemoryLedger::new();
    let service = AssetTransferService::default();
    let mut tx = ledger.begin();
    for i in 0..assets {
        service
            .create_asset(
                &mut tx,
                &admin(),
                AssetDraft::new(format!("asset{i:06}"), "blue", 5, "Tom", 300),
            )
            .unwrap();
    }
    tx.commit().unwrap();
    (ledger, service)
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.measurement_time(Duration::from_secs(5));

    let ledger = InMemoryLedger::new();
    let service = AssetTransferService::default();
    let mut next = 0u64;
    group.bench_function("create_commit", |b| {
        b.iter(|| {
            next += 1;
            let mut tx = ledger.begin();
            service
                .create_asset(
                    &mut tx,
                    &admin(),
                    AssetDraft::new(format!("bench{next}"), "blue", 5, "Tom", 300),
                )
                .unwrap();
            black_box(tx.commit().unwrap())
        })
    });

    let (ledger, service) = populated(1);
    group.bench_function("transfer_commit", |b| {
        b.iter(|| {
            let mut tx = ledger.begin();
            service
                .transfer_asset(&mut tx, &admin(), "asset000000", "Max")
                .unwrap();
            black_box(tx.commit().unwrap())
        })
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for size in [10usize, 100, 1_000] {
        let (ledger, service) = populated(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("get_all_assets", size), &size, |b, _| {
            b.iter(|| {
                let tx = ledger.begin();
                black_box(service.get_all_assets(&tx).unwrap())
            })
        });
    }

    for versions in [10usize, 100, 1_000] {
        let (ledger, service) = populated(1);
        for _ in 0..versions {
            let mut tx = ledger.begin();
            service
                .transfer_asset(&mut tx, &admin(), "asset000000", "Max")
                .unwrap();
            tx.commit().unwrap();
        }
        group.throughput(Throughput::Elements(versions as u64));
        group.bench_with_input(
            BenchmarkId::new("get_asset_history", versions),
            &versions,
            |b, _| {
                b.iter(|| {
                    let tx = ledger.begin();
                    black_box(service.get_asset_history(&tx, "asset000000").unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let ledger = InMemoryLedger::new();
    let dispatcher = ContractDispatcher::new(AssetTransferService::default());
    let caller = X509Credential::from_common_name("admin");
    {
        let mut tx = ledger.begin();
        dispatcher.invoke(&mut tx, &caller, "InitLedger", &[]).unwrap();
        tx.commit().unwrap();
    }
    let args = vec!["asset3".to_string()];

    group.bench_function("read_asset", |b| {
        b.iter(|| {
            let mut tx = ledger.begin();
            black_box(dispatcher.invoke(&mut tx, &caller, "ReadAsset", &args).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lifecycle, bench_queries, bench_dispatch);
criterion_main!(benches);
