// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact overlap tests between simple primitives and axis-aligned boxes.
//!
//! These are the fallbacks used once cheap bounding-box rejection and acceptance have
//! failed to decide. Segments and triangles use closed boxes: touching counts as overlap.

use glam::DVec3;

use crate::types::Aabb3;

/// True if any of `points` lies in the half-open box.
pub fn points_intersect_box(points: &[DVec3], b: &Aabb3) -> bool {
    points.iter().any(|&p| b.contains_point(p))
}

/// Slab test for the closed segment `p..q` against the closed box.
pub fn segment_intersects_box(p: DVec3, q: DVec3, b: &Aabb3) -> bool {
    let d = q - p;
    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;
    for i in 0..3 {
        if d[i] == 0.0 {
            if p[i] < b.min[i] || p[i] > b.max[i] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d[i];
        let mut near = (b.min[i] - p[i]) * inv;
        let mut far = (b.max[i] - p[i]) * inv;
        if near > far {
            core::mem::swap(&mut near, &mut far);
        }
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return false;
        }
    }
    true
}

/// True if any segment of the open polyline touches the box.
pub fn polyline_intersects_box(points: &[DVec3], b: &Aabb3) -> bool {
    match points {
        [] => false,
        [p] => b.contains_point_closed(*p),
        _ => points
            .windows(2)
            .any(|w| segment_intersects_box(w[0], w[1], b)),
    }
}

/// Separating-axis test for a triangle against a box.
///
/// Tests the three box face normals, the triangle normal, and the nine cross products of
/// triangle edges with box axes. Degenerate triangles fall back to the axes that remain.
pub fn triangle_intersects_box(tri: [DVec3; 3], b: &Aabb3) -> bool {
    let center = b.center();
    let half = 0.5 * b.extent();
    let v = tri.map(|p| p - center);

    let separated_on = |axis: DVec3| {
        if axis == DVec3::ZERO {
            return false;
        }
        let d = v.map(|p| p.dot(axis));
        let lo = d[0].min(d[1]).min(d[2]);
        let hi = d[0].max(d[1]).max(d[2]);
        let r = half.dot(axis.abs());
        lo > r || hi < -r
    };

    if DVec3::AXES.into_iter().any(separated_on) {
        return false;
    }
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
    if separated_on(edges[0].cross(edges[1])) {
        return false;
    }
    for e in edges {
        for a in DVec3::AXES {
            if separated_on(e.cross(a)) {
                return false;
            }
        }
    }
    true
}

/// Polygon test by fan triangulation from the first vertex. Assumes a convex, planar polygon.
pub fn polygon_intersects_box(points: &[DVec3], b: &Aabb3) -> bool {
    match points {
        [] => false,
        [p] => b.contains_point_closed(*p),
        [p, q] => segment_intersects_box(*p, *q, b),
        [first, rest @ ..] => rest
            .windows(2)
            .any(|w| triangle_intersects_box([*first, w[0], w[1]], b)),
    }
}

/// Triangle strip test; each run of three consecutive vertices is a triangle.
pub fn triangle_strip_intersects_box(points: &[DVec3], b: &Aabb3) -> bool {
    if points.len() < 3 {
        return polyline_intersects_box(points, b);
    }
    points
        .windows(3)
        .any(|w| triangle_intersects_box([w[0], w[1], w[2]], b))
}
