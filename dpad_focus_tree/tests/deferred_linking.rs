// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registering children before their parents ends in the same tree as
//! registering parents first.

use dpad_focus_tree::{FocusKey, FocusProps, FocusTree};
use proptest::prelude::*;

/// A random forest: node `i` has parent `parents[i]`, always an earlier node.
fn forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1_usize..24).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop_oneof![Just(None), (0..i).prop_map(Some)].boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn name(i: usize) -> FocusKey {
    FocusKey::from(format!("n{i}"))
}

fn build(parents: &[Option<usize>], order: &[usize]) -> FocusTree {
    let mut tree = FocusTree::new();
    for &i in order {
        tree.register(name(i), parents[i].map(name), FocusProps::leaf())
            .unwrap();
    }
    tree
}

/// Parent key of every node plus the sorted child keys of every node.
fn shape(tree: &FocusTree, n: usize) -> Vec<(Option<FocusKey>, Vec<FocusKey>)> {
    (0..n)
        .map(|i| {
            let id = tree.id_of(name(i).as_str()).unwrap();
            let parent = tree
                .parent_of(id)
                .and_then(|p| tree.key_of(p))
                .cloned();
            let mut children: Vec<FocusKey> = tree
                .children_of(id)
                .iter()
                .map(|&c| tree.key_of(c).unwrap().clone())
                .collect();
            children.sort();
            (parent, children)
        })
        .collect()
}

proptest! {
    #[test]
    fn children_first_matches_parents_first(
        (parents, order) in forest().prop_flat_map(|parents| {
            let n = parents.len();
            (Just(parents), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let n = parents.len();
        let topological: Vec<usize> = (0..n).collect();
        let canonical = build(&parents, &topological);
        let shuffled = build(&parents, &order);

        prop_assert_eq!(shuffled.pending_len(), 0);
        prop_assert_eq!(shape(&canonical, n), shape(&shuffled, n));
        for i in 0..n {
            let id = shuffled.id_of(name(i).as_str()).unwrap();
            prop_assert!(shuffled.is_linked(id));
        }
    }

    #[test]
    fn reverse_registration_preserves_sibling_order(width in 1_usize..12) {
        // Tiles mount before their row, in document order, the way a
        // component tree commits children before parents.
        let mut tree = FocusTree::new();
        for i in 0..width {
            tree.register(name(i), Some(FocusKey::from("row")), FocusProps::leaf()).unwrap();
        }
        let row = tree.register(FocusKey::from("row"), None, FocusProps::container()).unwrap();
        let keys: Vec<FocusKey> = tree
            .children_of(row)
            .iter()
            .map(|&c| tree.key_of(c).unwrap().clone())
            .collect();
        prop_assert_eq!(keys, (0..width).map(name).collect::<Vec<_>>());
    }
}
