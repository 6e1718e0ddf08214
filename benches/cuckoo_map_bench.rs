use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use cuckoo_hashmap::CuckooMap;
use std::collections::HashMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn keys(seed: u64, n: usize) -> Vec<u32> {
    lcg(seed).map(|x| (x >> 32) as u32 | 1).take(n).collect()
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    let ks = keys(1, 100_000);

    c.bench_function("cuckoo::insert_fresh_100k", |b| {
        b.iter_batched(
            || CuckooMap::<u64>::with_seed(14, 0xFEED),
            |mut m| {
                for (i, &k) in ks.iter().enumerate() {
                    m.insert(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("std::insert_fresh_100k", |b| {
        b.iter_batched(
            HashMap::<u32, u64>::new,
            |mut m| {
                for (i, &k) in ks.iter().enumerate() {
                    m.insert(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    let ks = keys(7, 100_000);
    let queries: Vec<u32> = lcg(0x9e3779b97f4a7c15)
        .take(10_000)
        .map(|s| ks[(s as usize) % ks.len()])
        .collect();

    let mut cm: CuckooMap<u64> = CuckooMap::with_seed(14, 0xFEED);
    let mut sm: HashMap<u32, u64> = HashMap::new();
    for (i, &k) in ks.iter().enumerate() {
        cm.insert(k, i as u64);
        sm.insert(k, i as u64);
    }

    c.bench_function("cuckoo::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &queries {
                black_box(cm.get(k));
            }
        })
    });

    c.bench_function("std::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &queries {
                black_box(sm.get(&k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    let ks = keys(11, 100_000);
    // Even keys only, so odd queries always miss.
    let mut cm: CuckooMap<u64> = CuckooMap::with_seed(14, 0xFEED);
    for (i, &k) in ks.iter().enumerate() {
        cm.insert(k & !1, i as u64);
    }
    let misses: Vec<u32> = keys(0xdead_beef, 10_000);

    c.bench_function("cuckoo::get_miss_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &misses {
                black_box(cm.get(k));
            }
        })
    });
}

fn bench_remove_insert_churn_10k(c: &mut Criterion) {
    let ks = keys(5, 10_000);

    c.bench_function("cuckoo::churn_10k", |b| {
        b.iter_batched(
            || {
                let mut m: CuckooMap<u64> = CuckooMap::with_seed(11, 0xFEED);
                for (i, &k) in ks.iter().enumerate() {
                    m.insert(k, i as u64);
                }
                m
            },
            |mut m| {
                for &k in &ks {
                    m.remove(k);
                }
                for (i, &k) in ks.iter().enumerate() {
                    m.insert(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k, bench_get_miss_10k, bench_remove_insert_churn_10k
}
criterion_main!(benches_insert, benches_ops);
