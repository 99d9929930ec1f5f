//! Property-based invariant tests for geometry primitives.
//!
//! Coordinates are whole pixels so every comparison is exact.
//!
//! ## Invariants
//!
//! 1. Union is commutative and contains both operands
//! 2. Inflate by positive padding strictly grows and keeps the center
//! 3. Translate round-trips and moves the center by the same offset
//! 4. `contains` is half-open

use guidepost_core::{Point, Rect};
use proptest::prelude::*;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-2000i32..2000, -2000i32..2000, 0i32..800, 0i32..800).prop_map(|(x, y, w, h)| {
        Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
    })
}

fn covers(outer: &Rect, inner: &Rect) -> bool {
    outer.left() <= inner.left()
        && outer.top() <= inner.top()
        && outer.right() >= inner.right()
        && outer.bottom() >= inner.bottom()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn union_is_commutative_and_covering(a in arb_rect(), b in arb_rect()) {
        let ab = a.union(&b);
        prop_assert_eq!(ab, b.union(&a));
        prop_assert!(covers(&ab, &a));
        prop_assert!(covers(&ab, &b));
    }

    #[test]
    fn inflate_grows_around_center(r in arb_rect(), padding in 1i32..64) {
        let padding = f64::from(padding);
        let grown = r.inflate(padding);
        prop_assert!(covers(&grown, &r));
        prop_assert!(!grown.is_empty());
        prop_assert_eq!(grown.center(), r.center());
    }

    #[test]
    fn translate_round_trips(r in arb_rect(), dx in -500i32..500, dy in -500i32..500) {
        let (dx, dy) = (f64::from(dx), f64::from(dy));
        let moved = r.translate(dx, dy);
        prop_assert_eq!(moved.translate(-dx, -dy), r);
        prop_assert_eq!(moved.center(), Point::new(r.center_x() + dx, r.center_y() + dy));
    }

    #[test]
    fn contains_is_half_open(r in arb_rect()) {
        prop_assume!(!r.is_empty());
        prop_assert!(r.contains(Point::new(r.left(), r.top())));
        prop_assert!(!r.contains(Point::new(r.right(), r.top())));
        prop_assert!(!r.contains(Point::new(r.left(), r.bottom())));
    }
}
