// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility ordering of regions.
//!
//! Two regions on opposite sides of a split plane cannot occlude each other from the side
//! of the viewer, so visiting the near child of every split before the far one yields a
//! valid front-to-back order without sorting by distance.

use glam::DVec3;

use crate::camera::Camera;
use crate::node::NodeIdx;
use crate::query::count_in_range;
use crate::tree::SpatialTree;
use crate::types::OrderDirection;

impl SpatialTree {
    /// Order regions for a viewer looking along `direction`.
    ///
    /// At a split along axis `a`, the lower child comes first when `direction[a] >= 0`.
    /// With `ids`, only those regions are emitted; otherwise all are.
    pub fn order_in_direction(
        &self,
        ids: Option<&[usize]>,
        direction: DVec3,
        order: OrderDirection,
    ) -> Vec<usize> {
        self.visit_ordered(ids, order, |axis, _| direction[axis] >= 0.0)
    }

    /// Order regions for a viewer at `position`: at each split the child on the viewer's side
    /// comes first.
    pub fn order_from_position(
        &self,
        ids: Option<&[usize]>,
        position: DVec3,
        order: OrderDirection,
    ) -> Vec<usize> {
        self.visit_ordered(ids, order, |axis, coordinate| position[axis] < coordinate)
    }

    /// Order regions along `camera`'s view direction.
    pub fn depth_order_regions(
        &self,
        ids: Option<&[usize]>,
        camera: &dyn Camera,
        order: OrderDirection,
    ) -> Vec<usize> {
        let direction = camera.view_direction();
        if direction == DVec3::ZERO {
            log::error!("camera has no view direction");
            return Vec::new();
        }
        self.order_in_direction(ids, direction, order)
    }

    /// `lower_first(axis, coordinate)` decides which child of a split is nearer.
    fn visit_ordered(
        &self,
        ids: Option<&[usize]>,
        order: OrderDirection,
        lower_first: impl Fn(usize, f64) -> bool,
    ) -> Vec<usize> {
        let wanted = ids.map(|ids| self.sorted_region_ids(ids));
        let mut out = Vec::new();
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack: Vec<NodeIdx> = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            if let Some(w) = &wanted {
                if count_in_range(w, n.min_id, n.max_id) == 0 {
                    continue;
                }
            }
            match n.split {
                Some(s) => {
                    let (near, far) = if lower_first(s.axis.index(), s.coordinate) {
                        (s.left, s.right)
                    } else {
                        (s.right, s.left)
                    };
                    stack.push(far);
                    stack.push(near);
                }
                None => out.extend(n.region_id),
            }
        }
        if order == OrderDirection::BackToFront {
            out.reverse();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::primitive::PointCloud;
    use crate::types::TreeConfig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn two_slabs() -> SpatialTree {
        let pts = vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.2, 0.1)];
        let mut tree = SpatialTree::with_config(TreeConfig {
            max_level: 1,
            min_cells_per_region: 0,
            ..TreeConfig::default()
        });
        tree.build(&[&PointCloud::new(pts)]).unwrap();
        tree
    }

    fn random_tree(seed: u64) -> SpatialTree {
        let mut rng = StdRng::seed_from_u64(seed);
        let pts: Vec<DVec3> = (0..400)
            .map(|_| {
                DVec3::new(
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                )
            })
            .collect();
        let mut tree = SpatialTree::with_config(TreeConfig {
            max_level: 6,
            min_cells_per_region: 5,
            ..TreeConfig::default()
        });
        tree.build(&[&PointCloud::new(pts)]).unwrap();
        tree
    }

    #[test]
    fn looking_along_positive_x_visits_lower_x_first() {
        let tree = two_slabs();
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.split_axis(), Some(understory_polytope::Axis::X));
        let low = tree.region_containing_point(DVec3::new(0.0, 0.0, 0.0)).unwrap();
        let high = tree.region_containing_point(DVec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(
            tree.order_in_direction(None, DVec3::X, OrderDirection::FrontToBack),
            vec![low, high]
        );
        assert_eq!(
            tree.order_in_direction(None, DVec3::NEG_X, OrderDirection::FrontToBack),
            vec![high, low]
        );
        assert_eq!(
            tree.order_in_direction(None, DVec3::X, OrderDirection::BackToFront),
            vec![high, low]
        );
    }

    #[test]
    fn position_order_starts_on_the_viewer_side() {
        let tree = two_slabs();
        let high = tree.region_containing_point(DVec3::new(1.0, 0.0, 0.0)).unwrap();
        let order =
            tree.order_from_position(None, DVec3::new(5.0, 0.0, 0.0), OrderDirection::FrontToBack);
        assert_eq!(order[0], high);
    }

    #[test]
    fn order_is_a_permutation_of_interest() {
        let tree = random_tree(21);
        let dir = DVec3::new(0.3, -0.5, 0.8);
        let all = tree.order_in_direction(None, dir, OrderDirection::FrontToBack);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..tree.num_regions()).collect::<Vec<_>>());

        let some = [5, 2, 9, 2, 1000];
        let picked = tree.order_in_direction(Some(&some[..]), dir, OrderDirection::FrontToBack);
        let expected: Vec<usize> = all.iter().copied().filter(|r| [2, 5, 9].contains(r)).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn near_subtree_precedes_far_subtree_at_every_split() {
        let tree = random_tree(22);
        let dir = DVec3::new(1.0, -2.0, 0.5);
        let order = tree.order_in_direction(None, dir, OrderDirection::FrontToBack);
        let mut position = vec![0; order.len()];
        for (i, &r) in order.iter().enumerate() {
            position[r] = i;
        }
        let span = |idx| {
            let (lo, hi) = tree.node(idx).unwrap().id_range();
            let pos = &position[lo..=hi];
            (*pos.iter().min().unwrap(), *pos.iter().max().unwrap())
        };
        let mut checked = 0;
        for n in &tree.nodes {
            let Some((left, right)) = n.children() else {
                continue;
            };
            let (near, far) = if dir[n.split_axis().unwrap().index()] >= 0.0 {
                (left, right)
            } else {
                (right, left)
            };
            assert!(span(near).1 < span(far).0);
            checked += 1;
        }
        assert!(checked > 10);
    }

    #[test]
    fn camera_order_uses_view_direction() {
        let tree = random_tree(23);
        let cam = PerspectiveCamera::look_at(
            DVec3::new(-50.0, 5.0, 5.0),
            DVec3::new(5.0, 5.0, 5.0),
            DVec3::Z,
        );
        assert_eq!(
            tree.depth_order_regions(None, &cam, OrderDirection::FrontToBack),
            tree.order_in_direction(None, DVec3::X, OrderDirection::FrontToBack)
        );
        let stuck = PerspectiveCamera::look_at(DVec3::ONE, DVec3::ONE, DVec3::Z);
        assert!(tree.depth_order_regions(None, &stuck, OrderDirection::FrontToBack).is_empty());
    }
}
