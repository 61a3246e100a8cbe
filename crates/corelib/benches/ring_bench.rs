use corelib::{HashRing, RingBuilder};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_1k", |b| {
        b.iter(|| {
            let mut ring: HashRing<u64> = RingBuilder::new().with_probe_seed(7).build();
            for i in 0..1_000u64 {
                ring.load(black_box(i)).unwrap();
            }
            ring
        })
    });
}

fn bench_access(c: &mut Criterion) {
    let mut ring: HashRing<u64> = RingBuilder::new().with_probe_seed(7).build();
    for i in 0..1_000u64 {
        ring.load(i).unwrap();
    }
    let capacity = ring.capacity();
    let mut index = 0usize;
    c.bench_function("access_successor", |b| {
        b.iter(|| {
            index = (index + 1) % capacity;
            *ring.access(black_box(index)).unwrap()
        })
    });
}

fn bench_remove_by_value(c: &mut Criterion) {
    c.bench_function("load_remove_256", |b| {
        b.iter(|| {
            let mut ring: HashRing<u64> = RingBuilder::new().with_probe_seed(7).build();
            for i in 0..256u64 {
                ring.load(i).unwrap();
            }
            for i in 0..256u64 {
                assert!(ring.remove(&i, |a, b| a == b));
            }
            ring
        })
    });
}

criterion_group!(benches, bench_load, bench_access, bench_remove_by_value);
criterion_main!(benches);
