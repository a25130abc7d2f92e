//! Property tests for the collision helpers.
//!
//! Shapes are generated over a small integer-valued grid so that distances
//! compare exactly and the properties below hold without tolerance games.

use pellet_engine::prelude::*;
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    (-50i32..50).prop_map(|v| v as f32)
}

fn extent() -> impl Strategy<Value = f32> {
    (1i32..30).prop_map(|v| v as f32)
}

fn circle() -> impl Strategy<Value = Circle> {
    (coord(), coord(), extent()).prop_map(|(x, y, r)| Circle::new(x, y, r))
}

fn rect() -> impl Strategy<Value = Rect> {
    (coord(), coord(), extent(), extent()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn is_unit_or_zero(v: Vec2) -> bool {
    let len = v.length();
    v == Vec2::ZERO || (len - 1.0).abs() < 1e-4
}

proptest! {
    #[test]
    fn circle_hits_are_symmetric(a in circle(), b in circle()) {
        let ab = circle_vs_circle(a, b);
        let ba = circle_vs_circle(b, a);
        prop_assert_eq!(ab.is_some(), ba.is_some());
        if let (Some(n1), Some(n2)) = (ab, ba) {
            prop_assert_eq!(n1, -n2);
            prop_assert!(is_unit_or_zero(n1));
        }
    }

    #[test]
    fn rect_normals_are_axis_aligned_units(c in circle(), r in rect()) {
        if let Some(n) = circle_vs_rect(c, r) {
            prop_assert!(is_unit_or_zero(n));
            // Outside the rectangle, the normal never points back into it.
            if !r.contains(c.center) {
                let nearest = r.clamp(c.center);
                prop_assert!(dot(n, c.center - nearest) >= 0.0);
            }
        }
    }

    #[test]
    fn rect_miss_means_far_from_every_edge(c in circle(), r in rect()) {
        if circle_vs_rect(c, r).is_none() {
            let nearest = r.clamp(c.center);
            prop_assert!((c.center - nearest).length_squared() > c.radius * c.radius);
        }
    }

    #[test]
    fn capsule_hit_implies_body_or_cap_hit(c in circle(), center in (coord(), coord()), half in (extent(), extent())) {
        let capsule = Capsule::new(Vec2::new(center.0, center.1), Vec2::new(half.0, half.1));
        let [left, right] = capsule.caps();
        let any = circle_vs_rect(c, capsule.body()).is_some()
            || circle_vs_circle(c, left).is_some()
            || circle_vs_circle(c, right).is_some();
        prop_assert_eq!(circle_vs_capsule(c, capsule).is_some(), any);
    }

    #[test]
    fn reflect_preserves_speed(dx in -1.0f32..1.0, dy in -1.0f32..1.0, axis in 0usize..4) {
        let normal = [
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, -1.0),
        ][axis];
        let d = Vec2::new(dx, dy);
        let out = reflect(d, normal);
        prop_assert!((out.length() - d.length()).abs() < 1e-5);
        prop_assert!((dot(out, normal) + dot(d, normal)).abs() < 1e-5);
    }
}
