// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Polytope: build a convex region and classify boxes against it.

use glam::DVec3;
use understory_polytope::{Aabb3, ConvexRegion};

fn main() {
    // A wedge: the unit cube cut by the plane x + y = 1.
    let cube = ConvexRegion::from_box(&Aabb3::new(DVec3::ZERO, DVec3::ONE));
    let mut planes = cube.planes().to_vec();
    planes.extend(understory_polytope::Plane::new(DVec3::new(1.0, 1.0, 0.0), DVec3::X));
    let wedge = ConvexRegion::new(planes);
    println!("wedge vertices: {:?}", wedge.vertices());

    for b in [
        Aabb3::new(DVec3::splat(0.1), DVec3::splat(0.3)),
        Aabb3::new(DVec3::new(0.8, 0.8, 0.0), DVec3::ONE),
        Aabb3::new(DVec3::splat(-1.0), DVec3::splat(2.0)),
    ] {
        println!("{:?} -> {:?}", b.to_bounds(), wedge.relation(&b));
    }
}
