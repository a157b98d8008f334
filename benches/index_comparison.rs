use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use chain_index::HashIndex;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::distr;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Distribution;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

#[derive(Clone)]
struct Record {
    key: String,
    _value: u64,
}

impl Record {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }
}

fn hash_str(key: &str) -> u64 {
    let mut hasher = SipHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn make_records(size: usize) -> Vec<Record> {
    let mut rng = OsRng;
    (0..size)
        .map(|_| Record::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn bucket_count(size: usize) -> usize {
    size.next_power_of_two()
}

fn build_hash_index(records: &[Record]) -> HashIndex {
    let mut index: HashIndex =
        HashIndex::with_sizes(bucket_count(records.len()), records.len());
    for (i, record) in records.iter().enumerate() {
        index.insert(hash_str(&record.key), i as u32);
    }
    index
}

fn build_hashbrown(records: &[Record]) -> HashbrownHashTable<u32> {
    let mut table = HashbrownHashTable::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        table.insert_unique(hash_str(&record.key), i as u32, |&p| {
            hash_str(&records[p as usize].key)
        });
    }
    table
}

fn build_std(records: &[Record]) -> StdHashMap<String, u32> {
    let mut map = StdHashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        map.insert(record.key.clone(), i as u32);
    }
    map
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let records = make_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter(|| black_box(build_hash_index(&records)))
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(build_hashbrown(&records)))
        });
        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| black_box(build_std(&records)))
        });
    }

    group.finish();
}

fn bench_find_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_hit");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let records = make_records(size);
        let mut lookups: Vec<(u64, String)> = records
            .iter()
            .map(|r| (hash_str(&r.key), r.key.clone()))
            .collect();
        lookups.shuffle(&mut SmallRng::from_os_rng());

        let index = build_hash_index(&records);
        let table = build_hashbrown(&records);
        let map = build_std(&records);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &lookups {
                    black_box(index.find(*hash, key.as_str(), &records[..], |k, r| r.key == *k));
                }
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &lookups {
                    black_box(table.find(*hash, |&p| records[p as usize].key == *key));
                }
            })
        });
        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                for (_, key) in &lookups {
                    black_box(map.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_find_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let records = make_records(size);
        let misses: Vec<(u64, String)> = make_records(size)
            .into_iter()
            .map(|r| (hash_str(&r.key), r.key))
            .collect();

        let index = build_hash_index(&records);
        let table = build_hashbrown(&records);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &misses {
                    black_box(index.find(*hash, key.as_str(), &records[..], |k, r| r.key == *k));
                }
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &misses {
                    black_box(table.find(*hash, |&p| records[p as usize].key == *key));
                }
            })
        });
    }

    group.finish();
}

fn bench_find_zipf(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let records = make_records(size);
        let mut rng = SmallRng::from_os_rng();
        let zipf = Zipf::new(size as f64, 1.1).unwrap();
        let lookups: Vec<(u64, String)> = (0..size)
            .map(|_| {
                let rank = zipf.sample(&mut rng) as usize - 1;
                let key = records[rank].key.clone();
                (hash_str(&key), key)
            })
            .collect();

        let index = build_hash_index(&records);
        let table = build_hashbrown(&records);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &lookups {
                    black_box(index.find(*hash, key.as_str(), &records[..], |k, r| r.key == *k));
                }
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, key) in &lookups {
                    black_box(table.find(*hash, |&p| records[p as usize].key == *key));
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
        let records = make_records(size);
        let mut order: Vec<u32> = (0..size as u32).collect();
        order.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter_batched(
                || build_hash_index(&records),
                |mut index| {
                    for &p in &order {
                        index.erase(hash_str(&records[p as usize].key), p);
                    }
                    black_box(index)
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || build_hashbrown(&records),
                |mut table| {
                    for &p in &order {
                        let hash = hash_str(&records[p as usize].key);
                        if let Ok(entry) = table.find_entry(hash, |&q| q == p) {
                            black_box(entry.remove());
                        }
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_ordered_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_insert");

    // Shifting is linear in the index size, so keep these small.
    for &size in &SIZES[..2] {
        let records = make_records(size);
        let mut rng = SmallRng::from_os_rng();
        let positions: Vec<usize> = (0..64)
            .map(|_| rng.sample(distr::Uniform::new(0, size).unwrap()))
            .collect();
        let extra = make_records(64);

        group.throughput(Throughput::Elements(positions.len() as u64));
        group.bench_function(format!("chain_index/{size}"), |b| {
            b.iter_batched(
                || (records.clone(), build_hash_index(&records)),
                |(mut records, mut index)| {
                    for (&at, record) in positions.iter().zip(&extra) {
                        index.insert_at_index(hash_str(&record.key), at as u32);
                        records.insert(at, record.clone());
                    }
                    black_box((records, index))
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("hashbrown_rebuild/{size}"), |b| {
            b.iter_batched(
                || records.clone(),
                |mut records| {
                    let mut table = build_hashbrown(&records);
                    for (&at, record) in positions.iter().zip(&extra) {
                        records.insert(at, record.clone());
                        table = build_hashbrown(&records);
                    }
                    black_box((records, table))
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_find_hit,
    bench_find_miss,
    bench_find_zipf,
    bench_erase,
    bench_ordered_insert,
);

criterion_main!(benches);
