//! Property tests for ECS operations.
//!
//! These tests use `proptest` to generate random sequences of entity and
//! component operations and verify that world invariants hold after each
//! step.

use std::collections::HashSet;

use pellet_ecs::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct Pos {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Vel {
    dx: i32,
    dy: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Tag(u32);

const CAPACITY: usize = 16;

/// Operations we can perform on the world.
#[derive(Debug, Clone)]
enum EcsOp {
    Create,
    Destroy(usize),
    SetPos(usize, i32, i32),
    SetVel(usize, i32, i32),
    SetTag(usize, u32),
    RemoveVel(usize),
    Clone(usize),
    Clear,
}

fn ecs_op_strategy() -> impl Strategy<Value = EcsOp> {
    prop_oneof![
        4 => Just(EcsOp::Create),
        2 => (0..32usize).prop_map(EcsOp::Destroy),
        3 => (0..32usize, -100..100i32, -100..100i32).prop_map(|(i, x, y)| EcsOp::SetPos(i, x, y)),
        3 => (0..32usize, -5..5i32, -5..5i32).prop_map(|(i, dx, dy)| EcsOp::SetVel(i, dx, dy)),
        2 => (0..32usize, any::<u32>()).prop_map(|(i, t)| EcsOp::SetTag(i, t)),
        1 => (0..32usize).prop_map(EcsOp::RemoveVel),
        1 => (0..32usize).prop_map(EcsOp::Clone),
        1 => Just(EcsOp::Clear),
    ]
}

/// Pick the `i`-th live entity (modulo), if any.
fn pick(world: &World, i: usize) -> Option<Entity> {
    let live = world.entities();
    (!live.is_empty()).then(|| live[i % live.len()])
}

fn check_invariants(world: &mut World) {
    let live = world.entities().to_vec();

    // Live ids are unique, valid, and the pools partition the id range.
    let unique: HashSet<Entity> = live.iter().copied().collect();
    assert_eq!(unique.len(), live.len());
    assert!(live.iter().all(|e| e.is_valid()));
    assert_eq!(world.live_count() + world.available_count(), CAPACITY);

    // filter never duplicates and never returns a non-match.
    let sig = world.signature_of::<(Pos, Vel)>().unwrap();
    let matched = world.filter(&sig);
    let matched_set: HashSet<Entity> = matched.iter().copied().collect();
    assert_eq!(matched_set.len(), matched.len());
    for &e in &live {
        let expected = world.exists::<Pos>(e) && world.exists::<Vel>(e);
        assert_eq!(matched_set.contains(&e), expected);
        assert_eq!(world.fulfils(e, &sig), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn ecs_random_ops_preserve_invariants(ops in prop::collection::vec(ecs_op_strategy(), 1..60)) {
        let mut world = World::with_config(WorldConfig {
            max_entities: CAPACITY,
            max_components: 4,
        });

        for op in ops {
            match op {
                EcsOp::Create => {
                    let full = world.available_count() == 0;
                    let e = world.create();
                    prop_assert_eq!(e.is_valid(), !full);
                    if e.is_valid() {
                        // A fresh or recycled id never carries components.
                        prop_assert!(!world.exists::<Pos>(e));
                        prop_assert!(!world.exists::<Vel>(e));
                        prop_assert!(!world.exists::<Tag>(e));
                    }
                }
                EcsOp::Destroy(i) => {
                    if let Some(e) = pick(&world, i) {
                        prop_assert!(world.destroy(e));
                        prop_assert!(!world.is_live(e));
                    }
                }
                EcsOp::SetPos(i, x, y) => {
                    if let Some(e) = pick(&world, i) {
                        world.set(e, Pos { x, y }).unwrap();
                        prop_assert_eq!(world.get::<Pos>(e), Some(&Pos { x, y }));
                    }
                }
                EcsOp::SetVel(i, dx, dy) => {
                    if let Some(e) = pick(&world, i) {
                        world.set(e, Vel { dx, dy }).unwrap();
                    }
                }
                EcsOp::SetTag(i, t) => {
                    if let Some(e) = pick(&world, i) {
                        world.set(e, Tag(t)).unwrap();
                    }
                }
                EcsOp::RemoveVel(i) => {
                    if let Some(e) = pick(&world, i) {
                        world.remove::<Vel>(e);
                        prop_assert!(!world.exists::<Vel>(e));
                    }
                }
                EcsOp::Clone(i) => {
                    if let Some(src) = pick(&world, i) {
                        let copy = world.clone_entity(src);
                        if copy.is_valid() {
                            prop_assert_eq!(world.exists::<Pos>(copy), world.exists::<Pos>(src));
                            prop_assert_eq!(world.exists::<Vel>(copy), world.exists::<Vel>(src));
                            prop_assert_eq!(world.exists::<Tag>(copy), world.exists::<Tag>(src));
                            if world.exists::<Pos>(src) {
                                prop_assert_eq!(world.get::<Pos>(copy), world.get::<Pos>(src));
                            }
                        }
                    }
                }
                EcsOp::Clear => {
                    world.clear();
                    prop_assert_eq!(world.live_count(), 0);
                }
            }
            check_invariants(&mut world);
        }
    }

    #[test]
    fn signature_equality_is_order_independent(ids in prop::collection::vec(0..96usize, 0..12)) {
        let forward: Vec<ComponentId> = ids.iter().map(|&i| ComponentId::from_index(i)).collect();
        let mut backward = forward.clone();
        backward.reverse();
        prop_assert_eq!(Signature::from_ids(&forward), Signature::from_ids(&backward));
        let expected_count = ids.iter().max().map_or(0, |m| m + 1);
        prop_assert_eq!(Signature::from_ids(&forward).count(), expected_count);
    }
}
