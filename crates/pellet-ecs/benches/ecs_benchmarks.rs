//! Criterion benchmarks for entity churn and signature queries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pellet_ecs::prelude::*;

#[derive(Debug, Clone, Default)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Default)]
struct Speed(f32);

#[derive(Debug, Clone, Default)]
struct Direction {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Default)]
struct Block;

/// A full world where every third entity is a mover and the rest are blocks.
fn populated_world(capacity: usize) -> World {
    let mut world = World::with_config(WorldConfig {
        max_entities: capacity,
        max_components: 32,
    });
    for i in 0..capacity {
        let e = world.create();
        world.set(e, Position { x: i as f32, y: 0.0 }).unwrap();
        if i % 3 == 0 {
            world.set(e, Speed(1.0)).unwrap();
            world.set(e, Direction { x: 0.0, y: 1.0 }).unwrap();
        } else {
            world.set(e, Block).unwrap();
        }
    }
    world
}

fn bench_create_destroy(c: &mut Criterion) {
    c.bench_function("create_destroy_255", |b| {
        let mut world = World::new();
        b.iter(|| {
            for _ in 0..255 {
                black_box(world.create());
            }
            world.clear();
        });
    });
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for capacity in [255usize, 1_024, 4_096] {
        let mut world = populated_world(capacity);
        let movers = world.signature_of::<(Position, Speed, Direction)>().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| black_box(world.filter(&movers)));
        });
    }
    group.finish();
}

fn bench_move_movers(c: &mut Criterion) {
    let mut world = populated_world(1_024);
    let movers = world.signature_of::<(Position, Speed, Direction)>().unwrap();
    c.bench_function("move_movers_1k", |b| {
        b.iter(|| {
            for e in world.filter(&movers) {
                let speed = world.get::<Speed>(e).map_or(0.0, |s| s.0);
                let (dx, dy) = world.get::<Direction>(e).map_or((0.0, 0.0), |d| (d.x, d.y));
                if let Some(pos) = world.get_mut::<Position>(e) {
                    pos.x += dx * speed;
                    pos.y += dy * speed;
                }
            }
        });
    });
}

fn bench_clone(c: &mut Criterion) {
    c.bench_function("clone_entity", |b| {
        let mut world = populated_world(8);
        let proto = world.entities()[0];
        let spare = world.entities()[7];
        world.destroy(spare);
        b.iter(|| {
            let copy = world.clone_entity(proto);
            world.destroy(black_box(copy));
        });
    });
}

criterion_group!(
    benches,
    bench_create_destroy,
    bench_filter,
    bench_move_movers,
    bench_clone,
);
criterion_main!(benches);
