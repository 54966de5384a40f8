// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! k-d tree basics.
//!
//! Build a tree over a triangle mesh, list each region's cells, and locate points.
//!
//! Run:
//! - `cargo run -p understory_demos --example kd_tree_basics`

use glam::DVec3;
use understory_kd_tree::{BoundsKind, BuildLog, CellKind, PolyMesh, SpatialTree, TreeConfig};

fn main() {
    // A 32 x 32 grid of quads, each split into two triangles.
    let n = 32;
    let mut mesh = PolyMesh::default();
    for y in 0..=n {
        for x in 0..=n {
            let h = (f64::from(x) * 0.3).sin() * (f64::from(y) * 0.2).cos();
            mesh.push_point(DVec3::new(f64::from(x), f64::from(y), h));
        }
    }
    let stride = (n + 1) as usize;
    for y in 0..n as usize {
        for x in 0..n as usize {
            let a = y * stride + x;
            let (b, c, d) = (a + 1, a + stride + 1, a + stride);
            let _ = mesh.push_cell(CellKind::Triangle, &[a, b, c]);
            let _ = mesh.push_cell(CellKind::Triangle, &[a, c, d]);
        }
    }

    let mut tree = SpatialTree::with_config(TreeConfig {
        min_cells_per_region: 128,
        ..TreeConfig::default()
    });
    let mut log = BuildLog::new();
    tree.build_with_log(&[&mesh], &mut log).unwrap();
    for e in log.entries() {
        println!("{:>14}: {:?}", e.label, e.elapsed);
    }
    println!(
        "{} triangles in {} regions over {} levels",
        mesh.cell_count(),
        tree.num_regions(),
        tree.num_levels()
    );

    let lists = tree.create_cell_lists(0, &mesh, None, true);
    for (slot, &region) in lists.regions.iter().enumerate() {
        let b = tree.region_bounds(region, BoundsKind::Spatial).unwrap();
        println!(
            "region {region:>2}: {:>4} owned, {:>3} boundary, x {:.2}..{:.2} y {:.2}..{:.2}",
            lists.owned[slot].len(),
            lists.boundary_of(region).map_or(0, <[usize]>::len),
            b.min.x,
            b.max.x,
            b.min.y,
            b.max.y,
        );
    }

    let p = DVec3::new(10.2, 20.7, 0.0);
    let region = tree.region_containing_point(p).unwrap();
    let owned = lists.owned_by(region).unwrap();
    println!("{p} lies in region {region}, which owns {} triangles", owned.len());

    // Any subtree's ids collapse to a single box.
    let root = tree.node(tree.root().unwrap()).unwrap();
    let (left, _) = root.children().unwrap();
    let (lo, hi) = tree.node(left).unwrap().id_range();
    let ids: Vec<usize> = (lo..=hi).collect();
    let boxes = tree.min_convex_subregions(&ids, BoundsKind::Spatial);
    assert_eq!(boxes.len(), 1, "left subtree should be one box");
    println!("regions {lo}..={hi} cover {:?}", boxes[0].to_bounds());
}
