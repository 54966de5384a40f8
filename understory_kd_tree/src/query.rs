// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region queries: boxes, convex regions, frusta, and single primitives.
//!
//! Multi-region queries descend from the root, skip any subtree whose box fails the test,
//! and return region ids left subtree first.

use understory_polytope::overlap::{
    points_intersect_box, polygon_intersects_box, polyline_intersects_box,
    triangle_strip_intersects_box,
};
use understory_polytope::{Aabb3, BoxRelation, ConvexRegion};

use crate::camera::{Camera, Viewport};
use crate::node::{NodeIdx, SpatialNode};
use crate::primitive::Primitive;
use crate::tree::SpatialTree;
use crate::types::BoundsKind;

impl SpatialTree {
    /// Whether `region`'s box overlaps `b` (strictly; shared faces do not count).
    pub fn intersects_box(&self, region: usize, b: &Aabb3, kind: BoundsKind) -> bool {
        self.region_node(region)
            .is_some_and(|n| n.intersects_box(b, kind))
    }

    /// All regions whose box overlaps `b`.
    pub fn regions_intersecting_box(&self, b: &Aabb3, kind: BoundsKind) -> Vec<usize> {
        self.collect_regions(|n| n.intersects_box(b, kind))
    }

    /// Whether `region`'s box shares any point with `convex`.
    pub fn intersects_convex(
        &self,
        region: usize,
        convex: &ConvexRegion,
        kind: BoundsKind,
    ) -> bool {
        self.region_node(region)
            .is_some_and(|n| convex.intersects_box(&n.bounds(kind)))
    }

    /// All regions sharing a point with `convex`.
    ///
    /// A node lying inside every face plane takes its whole subtree without further tests.
    pub fn regions_intersecting_convex(
        &self,
        convex: &ConvexRegion,
        kind: BoundsKind,
    ) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            match convex.relation(&n.bounds(kind)) {
                BoxRelation::Disjoint => {}
                BoxRelation::BoxInsideRegion => out.extend(n.min_id..=n.max_id),
                BoxRelation::BoxEnclosesRegion | BoxRelation::Overlapping => match n.split {
                    Some(s) => {
                        stack.push(s.right);
                        stack.push(s.left);
                    }
                    None => out.extend(n.region_id),
                },
            }
        }
        out
    }

    /// All regions inside the part of `camera`'s view frustum selected by `viewport`.
    ///
    /// An invalid viewport logs an error and matches nothing.
    pub fn regions_intersecting_frustum(
        &self,
        camera: &dyn Camera,
        viewport: &Viewport,
        kind: BoundsKind,
    ) -> Vec<usize> {
        if !viewport.is_valid() {
            log::error!("viewport {viewport:?} must lie in [-1, 1] with min < max");
            return Vec::new();
        }
        let frustum = ConvexRegion::from_frustum_corners(camera.frustum_corners(viewport));
        self.regions_intersecting_convex(&frustum, kind)
    }

    /// Whether `primitive` overlaps `region`.
    ///
    /// If the caller already knows which region owns the primitive's centroid, passing it as
    /// `centroid_region` answers that region without geometry.
    pub fn intersects_cell(
        &self,
        region: usize,
        primitive: &Primitive,
        centroid_region: Option<usize>,
        kind: BoundsKind,
    ) -> bool {
        let Some(n) = self.region_node(region) else {
            return false;
        };
        centroid_region == Some(region) || primitive_meets_box(primitive, &n.bounds(kind))
    }

    /// All regions `primitive` overlaps.
    pub fn regions_intersecting_cell(
        &self,
        primitive: &Primitive,
        centroid_region: Option<usize>,
        kind: BoundsKind,
    ) -> Vec<usize> {
        self.cell_regions_among(primitive, centroid_region, kind, None)
    }

    /// Like [`SpatialTree::regions_intersecting_cell`], restricted to the sorted region ids
    /// in `wanted`. Subtrees holding none of them are not visited.
    pub(crate) fn cell_regions_among(
        &self,
        primitive: &Primitive,
        centroid_region: Option<usize>,
        kind: BoundsKind,
        wanted: Option<&[usize]>,
    ) -> Vec<usize> {
        let pb = primitive.bounds();
        if pb.is_empty() {
            return Vec::new();
        }
        self.collect_regions(|n| {
            if wanted.is_some_and(|w| count_in_range(w, n.min_id, n.max_id) == 0) {
                return false;
            }
            match n.region_id {
                Some(id) if centroid_region == Some(id) => true,
                Some(_) => primitive_meets_box(primitive, &n.bounds(kind)),
                None => n.bounds(kind).touches(&pb),
            }
        })
    }

    /// Fewest boxes covering exactly the regions in `ids`, left to right.
    ///
    /// A subtree whose whole id range was requested is one convex box and is not descended.
    /// Unknown ids are logged and ignored.
    pub fn min_convex_subregions(&self, ids: &[usize], kind: BoundsKind) -> Vec<Aabb3> {
        let wanted = self.sorted_region_ids(ids);
        let mut out = Vec::new();
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            let hits = count_in_range(&wanted, n.min_id, n.max_id);
            if hits == 0 {
                continue;
            }
            if hits == n.max_id - n.min_id + 1 {
                out.push(n.bounds(kind));
                continue;
            }
            if let Some(s) = n.split {
                stack.push(s.right);
                stack.push(s.left);
            }
        }
        out
    }

    /// Sorted, duplicate-free copy of `ids` with unknown regions dropped.
    pub(crate) fn sorted_region_ids(&self, ids: &[usize]) -> Vec<usize> {
        let mut sorted: Vec<usize> = ids
            .iter()
            .copied()
            .filter(|&id| {
                let ok = id < self.regions.len();
                if !ok {
                    log::error!("ignoring unknown region {id}");
                }
                ok
            })
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    }

    /// Leaves passing `test` whose ancestors all pass it too, left to right.
    fn collect_regions(&self, test: impl Fn(&SpatialNode) -> bool) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack: Vec<NodeIdx> = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            if !test(n) {
                continue;
            }
            match n.split {
                Some(s) => {
                    stack.push(s.right);
                    stack.push(s.left);
                }
                None => out.extend(n.region_id),
            }
        }
        out
    }
}

/// Number of entries of sorted `ids` within `lo..=hi`.
pub(crate) fn count_in_range(ids: &[usize], lo: usize, hi: usize) -> usize {
    let start = ids.partition_point(|&id| id < lo);
    let end = ids.partition_point(|&id| id <= hi);
    end - start
}

/// Bounding-box reject, bounding-box accept, then an exact test by dimension.
fn primitive_meets_box(primitive: &Primitive, region: &Aabb3) -> bool {
    let pb = primitive.bounds();
    if !region.touches(&pb) {
        return false;
    }
    match primitive {
        Primitive::Vertices(points) => points_intersect_box(points, region),
        _ if region.encloses(&pb) => true,
        Primitive::PolyLine(points) => polyline_intersects_box(points, region),
        Primitive::Polygon(points) => polygon_intersects_box(points, region),
        Primitive::TriangleStrip(points) => triangle_strip_intersects_box(points, region),
        Primitive::Polyhedron { points, faces } => {
            ConvexRegion::from_polyhedron(points, faces).intersects_box(region)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::primitive::PointCloud;
    use crate::types::{AxisMask, TreeConfig};
    use glam::DVec3;
    use understory_polytope::Axis;

    /// One point at the center of each unit cell of a 4 x 4 grid, split on x and y only.
    /// Interior region faces fall on whole coordinates.
    fn grid() -> SpatialTree {
        let pts: Vec<DVec3> = (0..16)
            .map(|i| DVec3::new(f64::from(i % 4) + 0.5, f64::from(i / 4) + 0.5, f64::from(i % 2)))
            .collect();
        let mut tree = SpatialTree::with_config(TreeConfig {
            max_level: 4,
            min_cells_per_region: 0,
            allowed_axes: AxisMask::omit_z(),
        });
        tree.build(&[&PointCloud::new(pts)]).unwrap();
        tree
    }

    fn aabb(min: [f64; 3], max: [f64; 3]) -> Aabb3 {
        Aabb3::new(DVec3::from_array(min), DVec3::from_array(max))
    }

    #[test]
    fn box_query_matches_per_region_test() {
        let tree = grid();
        assert_eq!(tree.num_regions(), 16);
        let q = aabb([0.9, 0.9, -1.0], [2.1, 1.1, 2.0]);
        let hits = tree.regions_intersecting_box(&q, BoundsKind::Spatial);
        let brute: Vec<usize> = (0..tree.num_regions())
            .filter(|&r| tree.intersects_box(r, &q, BoundsKind::Spatial))
            .collect();
        let mut sorted = hits.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, brute);
        assert!(!hits.is_empty());
        // Id order is left to right, and in-order ids make that ascending.
        assert_eq!(hits, sorted);
    }

    #[test]
    fn touching_box_matches_nothing_across_the_face() {
        let tree = grid();
        let r = tree.region_containing_point(DVec3::new(0.5, 0.5, 0.5)).unwrap();
        let b = tree.region_bounds(r, BoundsKind::Spatial).unwrap();
        let beside = Aabb3::new(
            DVec3::new(b.max.x, b.min.y + 0.1, b.min.z),
            DVec3::new(b.max.x + 0.5, b.max.y - 0.1, b.max.z),
        );
        assert!(!tree.intersects_box(r, &beside, BoundsKind::Spatial));
        assert!(!tree.intersects_box(99, &beside, BoundsKind::Spatial));
    }

    #[test]
    fn data_bounds_are_tighter() {
        let tree = grid();
        // Inside region 0 but away from every centroid.
        let q = aabb([0.6, 0.6, 0.0], [0.9, 0.9, 1.0]);
        assert!(!tree.regions_intersecting_box(&q, BoundsKind::Spatial).is_empty());
        assert!(tree.regions_intersecting_box(&q, BoundsKind::Data).is_empty());
    }

    #[test]
    fn convex_query_agrees_with_box_query() {
        let tree = grid();
        let q = aabb([1.2, 0.3, 0.2], [2.7, 3.1, 0.8]);
        let convex = ConvexRegion::from_box(&q);
        assert_eq!(
            tree.regions_intersecting_convex(&convex, BoundsKind::Spatial),
            tree.regions_intersecting_box(&q, BoundsKind::Spatial)
        );
        for r in 0..tree.num_regions() {
            assert_eq!(
                tree.intersects_convex(r, &convex, BoundsKind::Spatial),
                tree.intersects_box(r, &q, BoundsKind::Spatial)
            );
        }
    }

    #[test]
    fn enclosing_convex_takes_every_region() {
        let tree = grid();
        let all = ConvexRegion::from_box(&aabb([-10.0; 3], [10.0; 3]));
        let hits = tree.regions_intersecting_convex(&all, BoundsKind::Spatial);
        assert_eq!(hits, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn degenerate_convex_matches_nothing() {
        let tree = grid();
        let empty = ConvexRegion::new(vec![]);
        assert!(tree.regions_intersecting_convex(&empty, BoundsKind::Spatial).is_empty());
    }

    #[test]
    fn frustum_sees_only_what_is_in_front() {
        let tree = grid();
        // Looking down from above the grid's low-x half.
        let mut cam = PerspectiveCamera::look_at(
            DVec3::new(1.0, 2.0, 20.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::Y,
        );
        cam.fov_y = 5_f64.to_radians();
        let seen = tree.regions_intersecting_frustum(&cam, &Viewport::FULL, BoundsKind::Spatial);
        assert!(!seen.is_empty());
        for r in &seen {
            let b = tree.region_bounds(*r, BoundsKind::Spatial).unwrap();
            assert!(b.min.x < 2.0, "region {r} at {b:?}");
        }
        let bad = Viewport::new(-2.0, 1.0, -1.0, 1.0);
        assert!(tree.regions_intersecting_frustum(&cam, &bad, BoundsKind::Spatial).is_empty());
    }

    #[test]
    fn cell_tests_by_dimension() {
        let tree = grid();
        let owner = tree.region_containing_point(DVec3::new(0.5, 0.5, 0.5)).unwrap();
        let right = tree.region_containing_point(DVec3::new(1.5, 0.5, 0.5)).unwrap();
        let kind = BoundsKind::Spatial;

        let point = Primitive::Vertices(vec![DVec3::new(0.5, 0.5, 0.5)]);
        assert!(tree.intersects_cell(owner, &point, None, kind));
        assert!(!tree.intersects_cell(right, &point, None, kind));
        // The known owner short-circuits even when the geometry says otherwise.
        assert!(tree.intersects_cell(right, &point, Some(right), kind));

        let line = Primitive::PolyLine(vec![DVec3::new(0.5, 0.5, 0.5), DVec3::new(1.5, 0.5, 0.5)]);
        assert_eq!(tree.regions_intersecting_cell(&line, None, kind), vec![owner, right]);

        let tri = Primitive::Polygon(vec![
            DVec3::new(0.2, 0.2, 0.5),
            DVec3::new(1.6, 0.2, 0.5),
            DVec3::new(0.2, 1.6, 0.5),
        ]);
        let hits = tree.regions_intersecting_cell(&tri, None, kind);
        let diagonal = tree.region_containing_point(DVec3::new(1.5, 1.5, 0.5)).unwrap();
        assert!(hits.contains(&owner) && hits.contains(&right));
        // The hypotenuse stays below (1, 1); that region only touches the bounding box.
        assert!(!hits.contains(&diagonal));

        let solid = Primitive::Polyhedron {
            points: vec![
                DVec3::new(0.3, 0.55, 0.2),
                DVec3::new(0.95, 0.55, 0.2),
                DVec3::new(0.3, 0.95, 0.2),
                DVec3::new(0.3, 0.55, 0.8),
            ],
            faces: vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]],
        };
        assert_eq!(tree.regions_intersecting_cell(&solid, None, kind), vec![owner]);
    }

    #[test]
    fn point_on_split_plane_belongs_to_one_region() {
        let tree = grid();
        let root = tree.node(tree.root().unwrap()).unwrap();
        let (axis, coordinate) = (root.split_axis().unwrap(), root.split_coordinate().unwrap());
        let mut p = DVec3::new(1.3, 1.3, 0.5);
        p[axis.index()] = coordinate;
        let point = Primitive::Vertices(vec![p]);
        let hits = tree.regions_intersecting_cell(&point, None, BoundsKind::Spatial);
        assert_eq!(hits.len(), 1);
        assert_eq!(Some(hits[0]), tree.region_containing_point(p));
        assert!(matches!(axis, Axis::X | Axis::Y));
    }

    #[test]
    fn min_convex_subregions_merges_subtrees() {
        let tree = grid();
        let root = tree.node(tree.root().unwrap()).unwrap();
        let (left, _) = root.children().unwrap();
        let (lo, hi) = tree.node(left).unwrap().id_range();
        let ids: Vec<usize> = (lo..=hi).collect();
        let boxes = tree.min_convex_subregions(&ids, BoundsKind::Spatial);
        assert_eq!(boxes, vec![tree.node(left).unwrap().spatial_bounds()]);

        let all: Vec<usize> = (0..16).rev().chain([3, 99]).collect();
        assert_eq!(
            tree.min_convex_subregions(&all, BoundsKind::Spatial),
            vec![tree.bounds(BoundsKind::Spatial).unwrap()]
        );

        // Two non-adjacent leaves stay separate.
        let boxes = tree.min_convex_subregions(&[0, 15], BoundsKind::Spatial);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0], tree.region_bounds(0, BoundsKind::Spatial).unwrap());
        assert!(tree.min_convex_subregions(&[], BoundsKind::Spatial).is_empty());
    }

    #[test]
    fn count_in_sorted_range() {
        let ids = [1, 3, 4, 8];
        assert_eq!(count_in_range(&ids, 0, 10), 4);
        assert_eq!(count_in_range(&ids, 3, 4), 2);
        assert_eq!(count_in_range(&ids, 5, 7), 0);
    }
}
