// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convex regions bounded by half-space planes, and their intersection test against boxes.

use std::sync::OnceLock;

use glam::{DMat3, DVec3};
use kurbo::Point;

use crate::hull::{convex_hull, hull_separates_rect, project, project_box};
use crate::plane::Plane;
use crate::types::{Aabb3, Axis};

/// Tolerance for deciding that a point lies on a plane rather than outside it.
///
/// Vertices computed as triple-plane intersections do not evaluate to exactly zero.
pub const PLANE_EPSILON: f64 = 1e-5;

/// How an axis-aligned box relates to a [`ConvexRegion`].
///
/// The variant also records which stage of [`ConvexRegion::relation`] decided the outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoxRelation {
    /// No shared point (or the region is degenerate).
    Disjoint,
    /// The box encloses the region's bounding box.
    BoxEnclosesRegion,
    /// The box lies inside every face plane of the region.
    BoxInsideRegion,
    /// Some overlap that no cheaper stage could classify.
    Overlapping,
}

impl BoxRelation {
    /// True for every relation except [`BoxRelation::Disjoint`].
    pub const fn intersects(self) -> bool {
        !matches!(self, Self::Disjoint)
    }
}

#[derive(Clone, Debug)]
struct Geometry {
    vertices: Vec<DVec3>,
    bounds: Aabb3,
    /// Convex hull of the vertices projected along each axis, indexed by [`Axis::index`].
    hulls: [Vec<Point>; 3],
}

/// A convex polytope given by outward-facing half-space planes.
///
/// The vertex set is derived on first use, either from vertices supplied at construction
/// or by intersecting every triple of planes. Supplying vertices (for example a frustum's
/// eight corners) avoids the cubic search.
///
/// A region needs at least four planes and four vertices to bound a volume. Degenerate
/// regions log an error and report [`BoxRelation::Disjoint`] for every query.
#[derive(Clone, Debug)]
pub struct ConvexRegion {
    planes: Vec<Plane>,
    supplied_vertices: Option<Vec<DVec3>>,
    geometry: OnceLock<Option<Geometry>>,
}

impl ConvexRegion {
    /// Create a region from planes; vertices are computed lazily.
    pub fn new(planes: Vec<Plane>) -> Self {
        Self {
            planes,
            supplied_vertices: None,
            geometry: OnceLock::new(),
        }
    }

    /// Create a region from planes and its known corner vertices.
    pub fn with_vertices(planes: Vec<Plane>, vertices: Vec<DVec3>) -> Self {
        Self {
            planes,
            supplied_vertices: Some(vertices),
            geometry: OnceLock::new(),
        }
    }

    /// The six-plane region equal to a box.
    pub fn from_box(b: &Aabb3) -> Self {
        let mut planes = Vec::with_capacity(6);
        for axis in DVec3::AXES {
            planes.push(Plane {
                normal: -axis,
                origin: b.min,
            });
            planes.push(Plane {
                normal: axis,
                origin: b.max,
            });
        }
        Self::with_vertices(planes, b.corners().to_vec())
    }

    /// Region bounded by a view frustum.
    ///
    /// Corners are the near rectangle followed by the far rectangle, each in the order
    /// `(x0, y0)`, `(x1, y0)`, `(x1, y1)`, `(x0, y1)`. Faces are oriented away from the
    /// corner centroid, so either winding works.
    pub fn from_frustum_corners(corners: [DVec3; 8]) -> Self {
        const FACES: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 3, 7, 4],
            [1, 2, 6, 5],
            [0, 1, 5, 4],
            [3, 2, 6, 7],
        ];
        let interior = corners.iter().copied().sum::<DVec3>() / 8.0;
        let planes = FACES
            .iter()
            .filter_map(|f| {
                let pts = f.map(|i| corners[i]);
                Plane::from_polygon(&pts).map(|p| p.facing_away_from(interior))
            })
            .collect();
        Self::with_vertices(planes, corners.to_vec())
    }

    /// Region bounded by the faces of a convex polyhedron.
    ///
    /// `faces` index into `points`. Faces with fewer than three vertices or a zero normal
    /// are skipped, which may leave the region degenerate.
    pub fn from_polyhedron(points: &[DVec3], faces: &[Vec<usize>]) -> Self {
        if points.is_empty() {
            return Self::new(Vec::new());
        }
        let interior = points.iter().copied().sum::<DVec3>() / points.len() as f64;
        let planes = faces
            .iter()
            .filter_map(|face| {
                let pts: Option<Vec<DVec3>> =
                    face.iter().map(|&i| points.get(i).copied()).collect();
                Plane::from_polygon(&pts?).map(|p| p.facing_away_from(interior))
            })
            .collect();
        Self::with_vertices(planes, points.to_vec())
    }

    /// The bounding planes.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// The polytope vertices, computing them on first use. Empty if degenerate.
    pub fn vertices(&self) -> &[DVec3] {
        self.geometry()
            .map(|g| g.vertices.as_slice())
            .unwrap_or_default()
    }

    /// Bounding box of the vertices, if the region is not degenerate.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.geometry().map(|g| g.bounds)
    }

    /// True if `p` is inside or on every plane (within [`PLANE_EPSILON`]).
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.planes.len() >= 4 && self.planes.iter().all(|pl| pl.evaluate(p) <= PLANE_EPSILON)
    }

    /// Whether the region and the box share any point.
    pub fn intersects_box(&self, b: &Aabb3) -> bool {
        self.relation(b).intersects()
    }

    /// Classify a box against the region.
    ///
    /// Stages, each short-circuiting:
    /// 1. box versus the region's bounding box (strict overlap),
    /// 2. box enclosing the region's bounding box,
    /// 3. per face plane: the box corner furthest against the normal lies outside, so the
    ///    box is outside that face; otherwise track whether the furthest corner along the
    ///    normal is inside every face,
    /// 4. all faces inside,
    /// 5. separating edges of the projected hulls along each axis.
    pub fn relation(&self, b: &Aabb3) -> BoxRelation {
        if self.planes.len() < 4 {
            log::error!(
                "convex region needs at least 4 planes, has {}",
                self.planes.len()
            );
            return BoxRelation::Disjoint;
        }
        let Some(geom) = self.geometry() else {
            log::error!("convex region does not bound a volume");
            return BoxRelation::Disjoint;
        };

        if !b.intersects(&geom.bounds) {
            return BoxRelation::Disjoint;
        }
        if b.encloses(&geom.bounds) {
            return BoxRelation::BoxEnclosesRegion;
        }

        let mut all_inside = true;
        for plane in &self.planes {
            let (p, n) = b.extreme_corners(plane.normal);
            if plane.evaluate(n) >= 0.0 {
                return BoxRelation::Disjoint;
            }
            if plane.evaluate(p) > 0.0 {
                all_inside = false;
            }
        }
        if all_inside {
            return BoxRelation::BoxInsideRegion;
        }

        for axis in Axis::ALL {
            if hull_separates_rect(&geom.hulls[axis.index()], project_box(b, axis)) {
                return BoxRelation::Disjoint;
            }
        }
        BoxRelation::Overlapping
    }

    fn geometry(&self) -> Option<&Geometry> {
        self.geometry
            .get_or_init(|| {
                let vertices = match &self.supplied_vertices {
                    Some(v) => v.clone(),
                    None => compute_vertices(&self.planes),
                };
                if vertices.len() < 4 {
                    return None;
                }
                let bounds = Aabb3::from_points(vertices.iter().copied());
                let hulls = Axis::ALL.map(|axis| {
                    convex_hull(vertices.iter().map(|&v| project(v, axis)).collect())
                });
                Some(Geometry {
                    vertices,
                    bounds,
                    hulls,
                })
            })
            .as_ref()
    }
}

/// Intersect every triple of planes, keeping points inside all half-spaces once each.
fn compute_vertices(planes: &[Plane]) -> Vec<DVec3> {
    let mut out: Vec<DVec3> = Vec::new();
    let n = planes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let Some(p) = intersect_three(&planes[i], &planes[j], &planes[k]) else {
                    continue;
                };
                if planes.iter().any(|pl| pl.evaluate(p) > PLANE_EPSILON) {
                    continue;
                }
                if out.iter().any(|q| q.distance(p) <= PLANE_EPSILON) {
                    continue;
                }
                out.push(p);
            }
        }
    }
    out
}

fn intersect_three(a: &Plane, b: &Plane, c: &Plane) -> Option<DVec3> {
    let m = DMat3::from_cols(a.normal, b.normal, c.normal).transpose();
    let det = m.determinant();
    if det.abs() < 1e-12 {
        return None;
    }
    let d = DVec3::new(a.offset(), b.offset(), c.offset());
    Some(m.inverse() * d)
}
