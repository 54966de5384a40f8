// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point location over the partitioned centroids.
//!
//! Each leaf owns a contiguous run of the permuted centroid array, so searches prune whole
//! regions by their data bounds and then scan a short slice.

use glam::DVec3;

use crate::node::NodeIdx;
use crate::tree::SpatialTree;
use crate::types::PrimitiveRef;

impl SpatialTree {
    /// Nearest centroid to `p` and its squared distance. Ties go to the first one found.
    pub fn find_closest_point(&self, p: DVec3) -> Option<(PrimitiveRef, f64)> {
        let root = self.nodes.first()?;
        let mut best: Option<(usize, f64)> = None;
        let mut stack = vec![(NodeIdx::new(0), root.data.distance_squared_to_point(p))];
        while let Some((idx, d)) = stack.pop() {
            if best.is_some_and(|(_, b)| d > b) {
                continue;
            }
            let n = &self.nodes[idx.get()];
            match n.split {
                Some(s) => {
                    let dl = self.nodes[s.left.get()].data.distance_squared_to_point(p);
                    let dr = self.nodes[s.right.get()].data.distance_squared_to_point(p);
                    // Nearer child on top.
                    if dl <= dr {
                        stack.push((s.right, dr));
                        stack.push((s.left, dl));
                    } else {
                        stack.push((s.left, dl));
                        stack.push((s.right, dr));
                    }
                }
                None => {
                    for i in n.centroids.clone() {
                        let d = self.points[i].distance_squared(p);
                        if best.is_none_or(|(_, b)| d < b) {
                            best = Some((i, d));
                        }
                    }
                }
            }
        }
        best.map(|(i, d)| (self.refs[i], d))
    }

    /// Every centroid within `radius` of `p` (inclusive), grouped by region.
    pub fn find_points_within_radius(&self, p: DVec3, radius: f64) -> Vec<PrimitiveRef> {
        self.positions_within_radius(p, radius)
            .into_iter()
            .map(|i| self.refs[i])
            .collect()
    }

    fn positions_within_radius(&self, p: DVec3, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            log::error!("search radius must be non-negative, got {radius}");
            return out;
        }
        let Some(root) = self.root() else {
            return out;
        };
        let r2 = radius * radius;
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            if n.data.distance_squared_to_point(p) > r2 {
                continue;
            }
            match n.split {
                Some(s) => {
                    stack.push(s.right);
                    stack.push(s.left);
                }
                None => out.extend(
                    n.centroids
                        .clone()
                        .filter(|&i| self.points[i].distance_squared(p) <= r2),
                ),
            }
        }
        out
    }

    /// Map every centroid, numbered set-major as in the build, to the representative of its
    /// group of near-duplicates.
    ///
    /// Centroids are visited in ascending order; an unclaimed centroid becomes a
    /// representative and claims every unclaimed centroid within `tolerance`. A negative
    /// tolerance logs an error and yields an empty map.
    pub fn build_map_for_duplicate_points(&self, tolerance: f64) -> Vec<usize> {
        if tolerance.is_nan() || tolerance < 0.0 {
            log::error!("duplicate tolerance must be non-negative, got {tolerance}");
            return Vec::new();
        }
        let mut offsets = Vec::with_capacity(self.cell_regions.len());
        let mut total = 0;
        for set in &self.cell_regions {
            offsets.push(total);
            total += set.len();
        }
        let global = |r: PrimitiveRef| offsets[r.set] + r.index;

        // Global index to position in the permuted array.
        let mut position = vec![0; total];
        for (pos, r) in self.refs.iter().enumerate() {
            position[global(*r)] = pos;
        }

        let mut map: Vec<Option<usize>> = vec![None; total];
        for g in 0..total {
            if map[g].is_some() {
                continue;
            }
            map[g] = Some(g);
            for pos in self.positions_within_radius(self.points[position[g]], tolerance) {
                let h = global(self.refs[pos]);
                if map[h].is_none() {
                    map[h] = Some(g);
                }
            }
        }
        map.into_iter()
            .enumerate()
            .map(|(g, m)| m.unwrap_or(g))
            .collect()
    }
}
