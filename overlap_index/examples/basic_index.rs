// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Overlap Index: insert, move, collect damage, and query an R-tree.

use overlap_index::{Aabb2D, Index};

fn main() {
    let mut idx = Index::<f64, u32>::with_rtree();
    let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
    let _k2 = idx.insert(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2);
    let _ = idx.take_damage();

    // Move box 1 out of the way.
    idx.update(k1, Aabb2D::new(20.0, 0.0, 30.0, 10.0));
    let dmg = idx.take_damage();
    println!(
        "damage: added={:?}, removed={:?}, moved={:?}",
        dmg.added, dmg.removed, dmg.moved
    );

    let hits: Vec<_> = idx.query_point(6.0, 6.0).collect();
    println!("hits at (6,6): {hits:?}");

    idx.visit_nodes(|bbox, depth| println!("node depth={depth} bbox={bbox:?}"));
}
