use core::hash::BuildHasherDefault;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use prime_hash::HashTable as PrimeHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Distribution;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

type SipBuildHasher = BuildHasherDefault<SipHasher>;

const SIZES: &[usize] = &[(1 << 8), (1 << 10), (1 << 12), (1 << 14), (1 << 16)];

struct Workload {
    keys: Vec<String>,
    misses: Vec<String>,
    values: Vec<Vec<u8>>,
}

impl Workload {
    fn new(size: usize) -> Self {
        let mut rng = OsRng;
        let mut key = || format!("key_{:016X}", rng.try_next_u64().unwrap());
        let keys = (0..size).map(|_| key()).collect();
        let misses = (0..size).map(|_| key()).collect();
        let values = (0..size)
            .map(|i| (i as u64).to_le_bytes().repeat(4))
            .collect();
        Workload {
            keys,
            misses,
            values,
        }
    }

    fn prime_table(&self) -> PrimeHashTable<'_> {
        let mut table = PrimeHashTable::new();
        for (key, value) in self.keys.iter().zip(&self.values) {
            table.insert(key, value).unwrap();
        }
        table
    }

    fn hashbrown_map(&self) -> HashbrownMap<String, &[u8], SipBuildHasher> {
        let mut map = HashbrownMap::with_hasher(SipBuildHasher::default());
        for (key, value) in self.keys.iter().zip(&self.values) {
            map.insert(key.clone(), &value[..]);
        }
        map
    }
}

fn bench_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let workload = Workload::new(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("prime_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut order: Vec<usize> = (0..size).collect();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    order
                },
                |order| {
                    let mut table = PrimeHashTable::new();
                    for i in order {
                        black_box(table.insert(&workload.keys[i], &workload.values[i])).unwrap();
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut order: Vec<usize> = (0..size).collect();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    order
                },
                |order| {
                    let mut map = HashbrownMap::with_hasher(SipBuildHasher::default());
                    for i in order {
                        black_box(
                            map.insert(workload.keys[i].clone(), &workload.values[i][..]),
                        );
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_hit_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let workload = Workload::new(size);
        let table = workload.prime_table();
        let map = workload.hashbrown_map();
        group.throughput(Throughput::Elements(2 * size as u64));

        group.bench_function(format!("prime_hash/{size}"), |b| {
            b.iter(|| {
                for (hit, miss) in workload.keys.iter().zip(&workload.misses) {
                    black_box(table.get(hit));
                    black_box(table.get(miss));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hit, miss) in workload.keys.iter().zip(&workload.misses) {
                    black_box(map.get(hit.as_str()));
                    black_box(map.get(miss.as_str()));
                }
            })
        });
    }

    group.finish();
}

fn bench_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("erase");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let workload = Workload::new(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("prime_hash/{size}"), |b| {
            b.iter_batched(
                || workload.prime_table(),
                |mut table| {
                    for key in &workload.keys {
                        black_box(table.erase(key)).unwrap();
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || workload.hashbrown_map(),
                |mut map| {
                    for key in &workload.keys {
                        black_box(map.remove(key.as_str()));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Inserts, lookups and erases over a Zipf-skewed key space twice the size of
/// the table, so hot keys churn through tombstones.
fn bench_mixed_zipf(c: &mut Criterion) {
    const OPS: usize = 4096;

    let mut group = c.benchmark_group("mixed_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));
    group.throughput(Throughput::Elements(OPS as u64));

    for &size in SIZES {
        let workload = Workload::new(2 * size);
        let distr = Zipf::new(workload.keys.len() as f64, 1.0).unwrap();
        let mut rng = SmallRng::from_os_rng();
        let script: Vec<(u8, usize)> = (0..OPS)
            .map(|_| {
                let op = rng.random_range(0..3u8);
                let key = distr.sample(&mut rng) as usize - 1;
                (op, key)
            })
            .collect();

        group.bench_function(format!("prime_hash/{size}"), |b| {
            b.iter(|| {
                let mut table = PrimeHashTable::new();
                for &(op, i) in &script {
                    let key = &workload.keys[i];
                    match op {
                        0 => {
                            let _ = black_box(table.insert(key, &workload.values[i]));
                        }
                        1 => {
                            black_box(table.get(key));
                        }
                        _ => {
                            let _ = black_box(table.erase(key));
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut map = HashbrownMap::with_hasher(SipBuildHasher::default());
                for &(op, i) in &script {
                    let key = &workload.keys[i];
                    match op {
                        0 => {
                            black_box(map.entry(key.clone()).or_insert(&workload.values[i][..]));
                        }
                        1 => {
                            black_box(map.get(key.as_str()));
                        }
                        _ => {
                            black_box(map.remove(key.as_str()));
                        }
                    }
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random,
    bench_find_hit_miss,
    bench_erase,
    bench_mixed_zipf,
);
criterion_main!(benches);
