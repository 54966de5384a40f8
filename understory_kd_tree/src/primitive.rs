// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive sets: the datasets a tree partitions.
//!
//! The tree only needs a count, a centroid, and a bounding box per primitive to build.
//! Exact cell-versus-region tests additionally need the primitive's geometry, which is
//! returned as a [`Primitive`].

use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;
use understory_polytope::Aabb3;

static STAMP: AtomicU64 = AtomicU64::new(1);

/// A fresh, process-wide increasing modification stamp.
pub fn next_stamp() -> u64 {
    STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Geometry of one primitive, grouped by topological dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Zero-dimensional: one or more isolated points.
    Vertices(Vec<DVec3>),
    /// One-dimensional: a connected chain of segments (a single line has two points).
    PolyLine(Vec<DVec3>),
    /// Two-dimensional: a planar convex polygon (a triangle has three points).
    Polygon(Vec<DVec3>),
    /// Two-dimensional: triangles `(i, i + 1, i + 2)` for every `i`.
    TriangleStrip(Vec<DVec3>),
    /// Three-dimensional: a convex solid given by its points and faces of point indices.
    Polyhedron {
        /// Solid corner points.
        points: Vec<DVec3>,
        /// Faces as indices into `points`.
        faces: Vec<Vec<usize>>,
    },
}

impl Primitive {
    /// Topological dimension (0 to 3).
    pub fn dimension(&self) -> usize {
        match self {
            Self::Vertices(_) => 0,
            Self::PolyLine(_) => 1,
            Self::Polygon(_) | Self::TriangleStrip(_) => 2,
            Self::Polyhedron { .. } => 3,
        }
    }

    /// All points of the primitive.
    pub fn points(&self) -> &[DVec3] {
        match self {
            Self::Vertices(p) | Self::PolyLine(p) | Self::Polygon(p) | Self::TriangleStrip(p) => p,
            Self::Polyhedron { points, .. } => points,
        }
    }

    /// Bounding box of the points.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(self.points().iter().copied())
    }

    /// Representative point: the primitive evaluated at its parametric center.
    ///
    /// Chains and strips use the middle segment or triangle, polygons their area centroid,
    /// and solids the center of their bounds. Empty primitives yield the origin.
    pub fn centroid(&self) -> DVec3 {
        let pts = self.points();
        if pts.is_empty() {
            return DVec3::ZERO;
        }
        match self {
            Self::Vertices(p) => p[p.len() / 2],
            Self::PolyLine(p) => {
                if p.len() == 1 {
                    return p[0];
                }
                let i = (p.len() - 2) / 2;
                p[i].lerp(p[i + 1], 0.5)
            }
            Self::Polygon(p) => polygon_centroid(p),
            Self::TriangleStrip(p) => {
                if p.len() < 3 {
                    return average(p);
                }
                let i = (p.len() - 3) / 2;
                (p[i] + p[i + 1] + p[i + 2]) / 3.0
            }
            Self::Polyhedron { .. } => self.bounds().center(),
        }
    }
}

fn average(points: &[DVec3]) -> DVec3 {
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}

/// Area-weighted centroid of a fan triangulation; the vertex average when the area vanishes.
fn polygon_centroid(points: &[DVec3]) -> DVec3 {
    let mut weighted = DVec3::ZERO;
    let mut total = 0.0;
    for w in 1..points.len().saturating_sub(1) {
        let (a, b, c) = (points[0], points[w], points[w + 1]);
        let area = (b - a).cross(c - a).length();
        weighted += area * (a + b + c) / 3.0;
        total += area;
    }
    if total > f64::EPSILON {
        weighted / total
    } else {
        average(points)
    }
}

/// A dataset the tree can partition.
pub trait PrimitiveSet {
    /// Number of primitives.
    fn len(&self) -> usize;

    /// True when there are no primitives.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geometry of primitive `i`.
    fn primitive(&self, i: usize) -> Primitive;

    /// Centroid of primitive `i`; decides which single region owns it.
    fn centroid(&self, i: usize) -> DVec3 {
        self.primitive(i).centroid()
    }

    /// Bounding box of primitive `i`.
    fn bounds(&self, i: usize) -> Aabb3 {
        self.primitive(i).bounds()
    }

    /// Union of every primitive's bounds.
    fn total_bounds(&self) -> Aabb3 {
        (0..self.len()).fold(Aabb3::EMPTY, |acc, i| acc.union(&self.bounds(i)))
    }

    /// Modification stamp. A tree rebuild is skipped while this and the length are unchanged.
    ///
    /// The default hands out a fresh stamp on every call, so sets that do not track their
    /// own edits are rebuilt every time.
    fn modified(&self) -> u64 {
        next_stamp()
    }
}

/// Kind of a [`PolyMesh`] cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// One point.
    Vertex,
    /// Several unconnected points.
    PolyVertex,
    /// Segment between two points.
    Line,
    /// Chain of segments.
    PolyLine,
    /// Three points.
    Triangle,
    /// Planar convex polygon.
    Polygon,
    /// Triangle strip.
    TriangleStrip,
    /// Convex solid; see [`PolyMesh::push_polyhedron`].
    Polyhedron,
}

impl CellKind {
    fn accepts(self, n: usize) -> bool {
        match self {
            Self::Vertex => n == 1,
            Self::PolyVertex | Self::PolyLine => n >= 1,
            Self::Line => n == 2,
            Self::Triangle => n == 3,
            Self::Polygon | Self::TriangleStrip => n >= 3,
            Self::Polyhedron => n >= 4,
        }
    }
}

#[derive(Clone, Debug)]
struct MeshCell {
    kind: CellKind,
    ids: Vec<usize>,
    /// Faces as indices into `ids`; empty unless the cell is a polyhedron.
    faces: Vec<Vec<usize>>,
}

/// Points plus mixed-dimension cells referencing them.
#[derive(Clone, Debug)]
pub struct PolyMesh {
    points: Vec<DVec3>,
    cells: Vec<MeshCell>,
    modified: u64,
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PolyMesh {
    /// Create a mesh with no cells.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            cells: Vec::new(),
            modified: next_stamp(),
        }
    }

    /// Mesh points.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Append a point and return its id.
    pub fn push_point(&mut self, p: DVec3) -> usize {
        self.points.push(p);
        self.modified = next_stamp();
        self.points.len() - 1
    }

    /// Move point `i`. Out-of-range ids are ignored.
    pub fn set_point(&mut self, i: usize, p: DVec3) {
        let Some(slot) = self.points.get_mut(i) else {
            log::error!("set_point: point {i} out of range");
            return;
        };
        *slot = p;
        self.modified = next_stamp();
    }

    /// Append a cell of `kind` over point ids and return the cell id.
    ///
    /// Returns `None` if an id is out of range or the point count does not fit the kind.
    /// Polyhedra need faces and go through [`PolyMesh::push_polyhedron`].
    pub fn push_cell(&mut self, kind: CellKind, ids: &[usize]) -> Option<usize> {
        if kind == CellKind::Polyhedron {
            log::error!("push_cell: polyhedra need faces; use push_polyhedron");
            return None;
        }
        self.push(kind, ids.to_vec(), Vec::new())
    }

    /// Append a convex solid given by faces of point ids and return the cell id.
    pub fn push_polyhedron(&mut self, faces: &[Vec<usize>]) -> Option<usize> {
        let mut ids: Vec<usize> = faces.iter().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        let local = faces
            .iter()
            .map(|f| {
                f.iter()
                    .filter_map(|id| ids.binary_search(id).ok())
                    .collect()
            })
            .collect();
        self.push(CellKind::Polyhedron, ids, local)
    }

    fn push(&mut self, kind: CellKind, ids: Vec<usize>, faces: Vec<Vec<usize>>) -> Option<usize> {
        if let Some(bad) = ids.iter().find(|&&i| i >= self.points.len()) {
            log::error!("{kind:?} cell references missing point {bad}");
            return None;
        }
        if !kind.accepts(ids.len()) {
            log::error!("{kind:?} cell cannot have {} points", ids.len());
            return None;
        }
        self.cells.push(MeshCell { kind, ids, faces });
        self.modified = next_stamp();
        Some(self.cells.len() - 1)
    }

    /// Kind of cell `i`.
    pub fn cell_kind(&self, i: usize) -> Option<CellKind> {
        self.cells.get(i).map(|c| c.kind)
    }

    /// Point ids of cell `i`.
    pub fn cell_points(&self, i: usize) -> Option<&[usize]> {
        self.cells.get(i).map(|c| c.ids.as_slice())
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Mark the mesh as modified so the next build repartitions it.
    pub fn touch(&mut self) {
        self.modified = next_stamp();
    }
}

impl PrimitiveSet for PolyMesh {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn primitive(&self, i: usize) -> Primitive {
        let cell = &self.cells[i];
        let pts: Vec<DVec3> = cell.ids.iter().map(|&id| self.points[id]).collect();
        match cell.kind {
            CellKind::Vertex | CellKind::PolyVertex => Primitive::Vertices(pts),
            CellKind::Line | CellKind::PolyLine => Primitive::PolyLine(pts),
            CellKind::Triangle | CellKind::Polygon => Primitive::Polygon(pts),
            CellKind::TriangleStrip => Primitive::TriangleStrip(pts),
            CellKind::Polyhedron => Primitive::Polyhedron {
                points: pts,
                faces: cell.faces.clone(),
            },
        }
    }

    fn bounds(&self, i: usize) -> Aabb3 {
        Aabb3::from_points(self.cells[i].ids.iter().map(|&id| self.points[id]))
    }

    fn modified(&self) -> u64 {
        self.modified
    }
}

/// A set of points, each its own primitive.
#[derive(Clone, Debug)]
pub struct PointCloud {
    points: Vec<DVec3>,
    modified: u64,
}

impl PointCloud {
    /// Wrap points.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            modified: next_stamp(),
        }
    }

    /// The points.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Mutable access to the points; marks the cloud modified.
    pub fn points_mut(&mut self) -> &mut Vec<DVec3> {
        self.modified = next_stamp();
        &mut self.points
    }
}

impl From<Vec<DVec3>> for PointCloud {
    fn from(points: Vec<DVec3>) -> Self {
        Self::new(points)
    }
}

impl PrimitiveSet for PointCloud {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn primitive(&self, i: usize) -> Primitive {
        Primitive::Vertices(vec![self.points[i]])
    }

    fn centroid(&self, i: usize) -> DVec3 {
        self.points[i]
    }

    fn bounds(&self, i: usize) -> Aabb3 {
        Aabb3::new(self.points[i], self.points[i])
    }

    fn total_bounds(&self) -> Aabb3 {
        Aabb3::from_points(self.points.iter().copied())
    }

    fn modified(&self) -> u64 {
        self.modified
    }
}
