use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lshcache::{CacheConfig, LshCache, ModulusPolicy};

fn sample_doc(id: usize) -> Vec<String> {
    let words = [
        "you", "can", "put", "lipstick", "on", "a", "pig", "but", "it's", "still",
        "they", "were", "going", "to", "send", "us", "binders", "full", "of", "women",
    ];
    (0..120)
        .map(|i| words[(i * 7 + id * 13) % words.len()].to_string())
        .chain(std::iter::once(format!("doc{id}")))
        .collect()
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("lsh_cache");

    for size in [100usize, 1000] {
        let docs: Vec<Vec<String>> = (0..size).map(sample_doc).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &docs, |b, docs| {
            b.iter(|| {
                let mut cache: LshCache<usize> =
                    LshCache::new(CacheConfig::default()).expect("cache");
                for (id, doc) in docs.iter().enumerate() {
                    cache.insert(&id, black_box(doc), id as i64).expect("insert");
                }
                cache
            })
        });
    }

    for (name, parallel) in [("check_sequential", false), ("check_parallel", true)] {
        let config = CacheConfig::default()
            .with_modulus(ModulusPolicy::Fixed(1 << 20))
            .with_parallel(parallel);
        let mut cache: LshCache<usize> = LshCache::new(config).expect("cache");
        for id in 0..1000 {
            cache.insert(&id, &sample_doc(id), id as i64).expect("insert");
        }
        let probe = sample_doc(5000);
        group.bench_function(name, |b| {
            b.iter(|| cache.check(&usize::MAX, black_box(&probe)).expect("check"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cache);
criterion_main!(benches);
