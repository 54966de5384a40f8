// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frustum culling and depth ordering.
//!
//! Select the regions a camera sees through part of its viewport, then order them for
//! back-to-front compositing.
//!
//! Run:
//! - `cargo run -p understory_demos --example kd_tree_depth_order`

use glam::DVec3;
use understory_kd_tree::{
    BoundsKind, Camera, OrderDirection, PerspectiveCamera, PointCloud, SpatialTree, TreeConfig,
    Viewport,
};

fn main() {
    // Points on a helix wound around the z axis.
    let points: Vec<DVec3> = (0..20_000)
        .map(|i| {
            let t = f64::from(i) * 0.01;
            DVec3::new(50.0 * t.cos(), 50.0 * t.sin(), t)
        })
        .collect();
    let cloud = PointCloud::new(points);

    let mut tree = SpatialTree::with_config(TreeConfig {
        min_cells_per_region: 500,
        ..TreeConfig::default()
    });
    tree.build(&[&cloud]).unwrap();
    println!("{} regions", tree.num_regions());

    let camera = PerspectiveCamera::look_at(
        DVec3::new(0.0, -400.0, 100.0),
        DVec3::new(0.0, 0.0, 100.0),
        DVec3::Z,
    );
    println!("camera at {} looking along {}", camera.position(), camera.view_direction());

    let left_half = Viewport::new(-1.0, 0.0, -1.0, 1.0);
    let visible = tree.regions_intersecting_frustum(&camera, &left_half, BoundsKind::Data);
    println!("left half of the view sees {} regions", visible.len());

    let order =
        tree.depth_order_regions(Some(visible.as_slice()), &camera, OrderDirection::BackToFront);
    for region in &order {
        let b = tree.region_bounds(*region, BoundsKind::Data).unwrap();
        println!("draw region {region:>2} centred at {:.1}", b.center());
    }

    // Order again from the eye position itself.
    let from_eye =
        tree.order_from_position(Some(visible.as_slice()), camera.eye, OrderDirection::FrontToBack);
    println!("nearest region from the eye: {:?}", from_eye.first());
}
