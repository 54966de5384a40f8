// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree nodes.

use core::ops::Range;

use glam::DVec3;
use understory_polytope::{Aabb3, Axis};

use crate::types::BoundsKind;

/// Index of a node in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdx(u32);

impl NodeIdx {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "node arenas stay well below u32::MAX entries"
    )]
    pub(crate) const fn new(i: usize) -> Self {
        Self(i as u32)
    }

    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }
}

/// How a node divides its children.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Split {
    pub(crate) axis: Axis,
    pub(crate) coordinate: f64,
    pub(crate) left: NodeIdx,
    pub(crate) right: NodeIdx,
}

/// One node of the region tree: a box of space, the tighter box of its data, and either
/// two children or a region id.
#[derive(Clone, Debug)]
pub struct SpatialNode {
    pub(crate) spatial: Aabb3,
    pub(crate) data: Aabb3,
    pub(crate) split: Option<Split>,
    pub(crate) cell_count: usize,
    pub(crate) region_id: Option<usize>,
    pub(crate) min_id: usize,
    pub(crate) max_id: usize,
    pub(crate) level: usize,
    /// Range of this node's centroids in the tree's permuted centroid array.
    pub(crate) centroids: Range<usize>,
}

impl SpatialNode {
    pub(crate) fn new(spatial: Aabb3, data: Aabb3, level: usize, centroids: Range<usize>) -> Self {
        Self {
            spatial,
            data,
            split: None,
            cell_count: centroids.len(),
            region_id: None,
            min_id: 0,
            max_id: 0,
            level,
            centroids,
        }
    }

    /// The region of space this node owns.
    pub fn spatial_bounds(&self) -> Aabb3 {
        self.spatial
    }

    /// The tight box around the centroids under this node. Always inside the spatial bounds.
    pub fn data_bounds(&self) -> Aabb3 {
        self.data
    }

    /// Either box, by kind.
    pub fn bounds(&self, kind: BoundsKind) -> Aabb3 {
        match kind {
            BoundsKind::Spatial => self.spatial,
            BoundsKind::Data => self.data,
        }
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    /// Split axis of an internal node.
    pub fn split_axis(&self) -> Option<Axis> {
        self.split.map(|s| s.axis)
    }

    /// Split coordinate of an internal node: the left child's upper bound on the split axis.
    pub fn split_coordinate(&self) -> Option<f64> {
        self.split.map(|s| s.coordinate)
    }

    /// Left and right children of an internal node.
    pub fn children(&self) -> Option<(NodeIdx, NodeIdx)> {
        self.split.map(|s| (s.left, s.right))
    }

    /// Number of primitives under this node.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Region id of a leaf; `None` for internal nodes.
    pub fn region_id(&self) -> Option<usize> {
        self.region_id
    }

    /// Inclusive range of leaf region ids under this node.
    pub fn id_range(&self) -> (usize, usize) {
        (self.min_id, self.max_id)
    }

    /// Depth of the node; the root is level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Strict box overlap against the chosen bounds.
    pub fn intersects_box(&self, b: &Aabb3, kind: BoundsKind) -> bool {
        self.bounds(kind).intersects(b)
    }

    /// Half-open point membership against the chosen bounds.
    pub fn contains_point(&self, p: DVec3, kind: BoundsKind) -> bool {
        self.bounds(kind).contains_point(p)
    }
}
