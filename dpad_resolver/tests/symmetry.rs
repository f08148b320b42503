// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two separated siblings always reach each other in opposite directions.

use dpad_focus_tree::{FocusKey, FocusProps, FocusTree};
use dpad_resolver::{Direction, Resolver};
use kurbo::Rect;
use proptest::prelude::*;

/// Two non-overlapping boxes, the second placed after the first along the main axis,
/// with some drift across it.
#[derive(Clone, Debug)]
struct Pair {
    first: Rect,
    second: Rect,
    horizontal: bool,
}

fn pair() -> impl Strategy<Value = Pair> {
    (
        -500.0_f64..500.0,
        -500.0_f64..500.0,
        1.0_f64..200.0,
        1.0_f64..200.0,
        1.0_f64..200.0,
        1.0_f64..200.0,
        0.0_f64..100.0,
        -50.0_f64..50.0,
        any::<bool>(),
    )
        .prop_map(|(x, y, w1, h1, w2, h2, gap, drift, horizontal)| {
            let first = Rect::new(x, y, x + w1, y + h1);
            let second = if horizontal {
                let x2 = first.x1 + gap;
                Rect::new(x2, y + drift, x2 + w2, y + drift + h2)
            } else {
                let y2 = first.y1 + gap;
                Rect::new(x + drift, y2, x + drift + w2, y2 + h2)
            };
            Pair {
                first,
                second,
                horizontal,
            }
        })
}

proptest! {
    #[test]
    fn siblings_resolve_symmetrically(p in pair()) {
        let mut tree = FocusTree::new();
        let a = tree.register(FocusKey::from("a"), None, FocusProps::leaf()).unwrap();
        let b = tree.register(FocusKey::from("b"), None, FocusProps::leaf()).unwrap();
        tree.update_layout("a", p.first).unwrap();
        tree.update_layout("b", p.second).unwrap();

        let toward = if p.horizontal { Direction::Right } else { Direction::Down };
        let resolver = Resolver::new();
        prop_assert_eq!(resolver.resolve(&tree, a, toward), Some(b));
        prop_assert_eq!(resolver.resolve(&tree, b, toward.opposite()), Some(a));
        // Past the far side there is nothing.
        prop_assert_eq!(resolver.resolve(&tree, b, toward), None);
        prop_assert_eq!(resolver.resolve(&tree, a, toward.opposite()), None);
    }
}
