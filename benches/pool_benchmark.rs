//! # Pool Allocator Benchmark
//!
//! Run with: `cargo bench`

#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oscar::{GenericMemoryProvider, MarkCtx, Pool, PoolId};

const CELL_SIZE: usize = 16;

fn no_roots() -> Box<dyn FnMut(&mut MarkCtx<'_>) -> i32> {
    Box::new(|_ctx| 0)
}

/// A mark callback that keeps every id in `roots` alive, so the pool under
/// test cannot reclaim anything until the bench drops the shared list.
fn keep_alive(roots: Rc<RefCell<Vec<PoolId>>>) -> Box<dyn FnMut(&mut MarkCtx<'_>) -> i32> {
    Box::new(move |ctx| {
        for &id in roots.borrow().iter() {
            ctx.mark(id);
        }
        0
    })
}

fn silent_free_hook() -> Box<dyn FnMut(PoolId, &[u8])> {
    Box::new(|_id, _payload| {})
}

/// Benchmark: construct a growable pool of varying initial capacity.
fn bench_pool_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_construction");

    for capacity in [16usize, 1_024, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    black_box(
                        Pool::new_growable(
                            CELL_SIZE,
                            capacity,
                            Box::new(GenericMemoryProvider),
                            no_roots(),
                            silent_free_hook(),
                        )
                        .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: allocate until the free list is drained, never collecting.
fn bench_alloc_from_free_list(c: &mut Criterion) {
    c.bench_function("alloc_from_free_list_100K", |b| {
        b.iter(|| {
            let roots = Rc::new(RefCell::new(Vec::new()));
            let mut pool = Pool::new_growable(
                CELL_SIZE,
                100_000,
                Box::new(GenericMemoryProvider),
                keep_alive(roots.clone()),
                silent_free_hook(),
            )
            .unwrap();
            for _ in 0..100_000 {
                let id = pool.alloc();
                roots.borrow_mut().push(id);
                black_box(id);
            }
        });
    });
}

/// Benchmark: repeated alloc against a one-cell pool, forcing a collection
/// on every call.
fn bench_alloc_forces_collection(c: &mut Criterion) {
    c.bench_function("alloc_forces_collection_10K", |b| {
        b.iter(|| {
            let mut pool = Pool::new_growable(
                CELL_SIZE,
                1,
                Box::new(GenericMemoryProvider),
                no_roots(),
                silent_free_hook(),
            )
            .unwrap();
            for _ in 0..10_000 {
                black_box(pool.alloc());
            }
        });
    });
}

/// Benchmark: growth protocol under sustained allocation pressure.
fn bench_growth_under_pressure(c: &mut Criterion) {
    c.bench_function("growth_1K_to_100K", |b| {
        b.iter(|| {
            let roots = Rc::new(RefCell::new(Vec::new()));
            let mut pool = Pool::new_growable(
                CELL_SIZE,
                1_024,
                Box::new(GenericMemoryProvider),
                keep_alive(roots.clone()),
                silent_free_hook(),
            )
            .unwrap();
            for _ in 0..100_000 {
                let id = pool.alloc();
                roots.borrow_mut().push(id);
            }
            black_box(pool.count())
        });
    });
}

/// Benchmark: force_gc over a fully live pool (mark dominates, sweep is a
/// no-op scan).
fn bench_force_gc_all_live(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_gc_all_live");

    for capacity in [1_000usize, 100_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let roots = Rc::new(RefCell::new(Vec::new()));
                let mut pool = Pool::new_growable(
                    CELL_SIZE,
                    capacity,
                    Box::new(GenericMemoryProvider),
                    keep_alive(roots.clone()),
                    silent_free_hook(),
                )
                .unwrap();
                for _ in 0..capacity {
                    let id = pool.alloc();
                    roots.borrow_mut().push(id);
                }
                b.iter(|| {
                    black_box(pool.force_gc().unwrap());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: `get` access patterns once the pool is fully populated.
fn bench_get_access(c: &mut Criterion) {
    const COUNT: usize = 100_000;
    let roots = Rc::new(RefCell::new(Vec::new()));
    let mut pool = Pool::new_growable(
        CELL_SIZE,
        COUNT,
        Box::new(GenericMemoryProvider),
        keep_alive(roots.clone()),
        silent_free_hook(),
    )
    .unwrap();
    let ids: Vec<PoolId> = (0..COUNT)
        .map(|_| {
            let id = pool.alloc();
            roots.borrow_mut().push(id);
            id
        })
        .collect();

    let mut group = c.benchmark_group("get_access");

    group.bench_function("sequential_100K", |b| {
        b.iter(|| {
            let mut touched = 0usize;
            for &id in &ids {
                if pool.get(id).is_some() {
                    touched += 1;
                }
            }
            black_box(touched)
        });
    });

    let shuffled: Vec<PoolId> = {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        (0..COUNT)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                i.hash(&mut hasher);
                PoolId::from_u32((hasher.finish() as usize % COUNT) as u32)
            })
            .collect()
    };

    group.bench_function("random_10K", |b| {
        b.iter(|| {
            let mut touched = 0usize;
            for &id in shuffled.iter().take(10_000) {
                if pool.get(id).is_some() {
                    touched += 1;
                }
            }
            black_box(touched)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pool_construction,
    bench_alloc_from_free_list,
    bench_alloc_forces_collection,
    bench_growth_under_pressure,
    bench_force_gc_all_live,
    bench_get_access,
);

criterion_main!(benches);
