//! # Sealed-Ledger Benchmarks
//!
//! | Operation | Cost driver |
//! |-----------|-------------|
//! | Append | SHA-256 + Ed25519 sign/verify + registry lookup |
//! | Full audit | one verify per block |
//! | Search | linear scan, deeper levels read more payload |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lg_02_key_registry::{KeyRegistry, KvKeyRegistry};
use lg_03_offchain_storage::{FileOffChainStore, OffChainConfig};
use lg_05_chain_store::{AppendOptions, ChainConfig, ChainStore};
use lg_07_search::{SearchConfig, SearchCriteria, SearchIndex, SearchLevel};
use shared_crypto::{Ed25519KeyPair, KdfParams};
use shared_storage::InMemoryKVStore;
use tempfile::TempDir;

struct Bench {
    chain: Arc<ChainStore>,
    offchain: Arc<FileOffChainStore>,
    signer: Ed25519KeyPair,
    public_key: String,
    _temp: TempDir,
}

fn setup(blocks: usize) -> Bench {
    let temp = TempDir::new().expect("temp dir");
    let offchain = Arc::new(
        FileOffChainStore::open(OffChainConfig::new(temp.path().join("offchain")).with_threshold(4096))
            .expect("off-chain store"),
    );
    let registry = Arc::new(KvKeyRegistry::new_in_memory());
    let signer = Ed25519KeyPair::from_seed([42u8; 32]);
    let public_key = signer.public_key().to_hex();
    registry.add_key(&public_key, "bench");

    let chain = Arc::new(
        ChainStore::open(
            ChainConfig::default().with_kdf(KdfParams::insecure_for_tests()),
            Box::new(InMemoryKVStore::new()),
            registry,
            offchain.clone(),
        )
        .expect("chain store"),
    );

    for i in 0..blocks {
        let data = if i % 10 == 9 {
            format!("{} archived telemetry frame {}", "#".repeat(5000), i)
        } else {
            format!("sensor reading {} within tolerance", i)
        };
        chain
            .append(&data, &signer, &public_key, AppendOptions::new())
            .expect("append");
    }

    Bench {
        chain,
        offchain,
        signer,
        public_key,
        _temp: temp,
    }
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-05-append");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    let b = setup(0);
    group.bench_function("inline_64b", |bench| {
        let payload = "x".repeat(64);
        bench.iter(|| {
            b.chain
                .append(black_box(&payload), &b.signer, &b.public_key, AppendOptions::new())
                .expect("append")
        })
    });
    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-04-audit");
    group.measurement_time(Duration::from_secs(5));

    for size in [100usize, 1_000] {
        let b = setup(size);
        group.throughput(Throughput::Elements(size as u64 + 1));
        group.bench_with_input(BenchmarkId::new("validate_chain", size), &size, |bench, _| {
            bench.iter(|| black_box(b.chain.validate_chain()))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-07-search");
    group.measurement_time(Duration::from_secs(5));

    let b = setup(500);
    let index = SearchIndex::new(b.chain.clone(), b.offchain.clone(), SearchConfig::default());
    let criteria = SearchCriteria::term("telemetry");

    for level in SearchLevel::ALL {
        group.bench_with_input(BenchmarkId::new("term", level), &level, |bench, &level| {
            bench.iter(|| index.search(black_box(&criteria), level, None).expect("search"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_append, bench_audit, bench_search);
criterion_main!(benches);
