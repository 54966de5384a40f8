// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D convex hulls of axis projections.
//!
//! A convex polytope projected onto a coordinate plane is a convex polygon. Comparing that
//! polygon against the projected box gives a cheap separating test that catches most of the
//! cases the face planes alone cannot decide.

use glam::DVec3;
use kurbo::{Point, Rect};

use crate::types::{Aabb3, Axis};

/// Project `p` onto the coordinate plane perpendicular to `axis`.
///
/// The remaining two components keep their cyclic order: `X -> (y, z)`, `Y -> (z, x)`,
/// `Z -> (x, y)`.
pub fn project(p: DVec3, axis: Axis) -> Point {
    match axis {
        Axis::X => Point::new(p.y, p.z),
        Axis::Y => Point::new(p.z, p.x),
        Axis::Z => Point::new(p.x, p.y),
    }
}

/// Project a box onto the coordinate plane perpendicular to `axis`.
pub fn project_box(b: &Aabb3, axis: Axis) -> Rect {
    let p0 = project(b.min, axis);
    let p1 = project(b.max, axis);
    Rect::new(p0.x, p0.y, p1.x, p1.y)
}

/// Counter-clockwise convex hull (Andrew's monotone chain) without collinear vertices.
///
/// Inputs with fewer than three distinct points are returned sorted and deduplicated.
pub fn convex_hull(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let turn = |o: Point, a: Point, b: Point| (a - o).cross(b - o);
    let mut hull: Vec<Point> = Vec::with_capacity(points.len() + 1);
    for &p in &points {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    // The last point repeats the first.
    hull.pop();
    hull
}

/// True if some edge of the counter-clockwise `hull` has the whole rectangle on its outer side.
///
/// Rectangle corners lying exactly on the edge line count as outside, matching the strict
/// box overlap convention. Hulls with fewer than three vertices never separate.
pub fn hull_separates_rect(hull: &[Point], rect: Rect) -> bool {
    if hull.len() < 3 {
        return false;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    (0..hull.len()).any(|i| {
        let a = hull[i];
        let edge = hull[(i + 1) % hull.len()] - a;
        corners.iter().all(|&c| edge.cross(c - a) <= 0.0)
    })
}
