// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: construction, id assignment, and structural accessors.

use glam::DVec3;
use understory_polytope::{Aabb3, Axis};

use crate::error::BuildError;
use crate::node::{NodeIdx, SpatialNode, Split};
use crate::primitive::PrimitiveSet;
use crate::select::median_cut_by;
use crate::timing::BuildLog;
use crate::types::{BoundsKind, PrimitiveRef, TreeConfig};

/// Fraction of the largest extent given to axes with zero extent.
const FLAT_AXIS_INFLATION: f64 = 0.01;

/// Fraction of the largest extent the root box is padded by on every side.
const ROOT_PADDING: f64 = 1e-6;

/// Outcome of a successful build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    /// The tree was rebuilt.
    Built,
    /// Inputs and configuration were unchanged since the last build; nothing was done.
    Unchanged,
}

/// What a build was computed from: config plus each set's length and stamp.
#[derive(Clone, Debug, PartialEq)]
struct BuildStamp {
    config: TreeConfig,
    sets: Vec<(usize, u64)>,
}

/// A k-d tree over the centroids of one or more primitive sets.
///
/// Each leaf is a region with an id in `0..num_regions()`. Ids follow an in-order walk, so
/// every subtree owns a contiguous id range.
#[derive(Clone, Default)]
pub struct SpatialTree {
    pub(crate) config: TreeConfig,
    pub(crate) nodes: Vec<SpatialNode>,
    /// Region id to leaf.
    pub(crate) regions: Vec<NodeIdx>,
    /// Centroids permuted by the partition; each leaf owns a contiguous range.
    pub(crate) points: Vec<DVec3>,
    /// Primitive behind each entry of `points`.
    pub(crate) refs: Vec<PrimitiveRef>,
    /// Per set, per primitive: region owning the centroid.
    pub(crate) cell_regions: Vec<Vec<usize>>,
    stamp: Option<BuildStamp>,
}

impl core::fmt::Debug for SpatialTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialTree")
            .field("config", &self.config)
            .field("regions", &self.regions.len())
            .field("nodes", &self.nodes.len())
            .field("levels", &self.num_levels())
            .field("primitives", &self.points.len())
            .finish_non_exhaustive()
    }
}

impl SpatialTree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with `config`.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Construction parameters.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replace the construction parameters. Takes effect at the next build.
    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
    }

    /// Force the next build to run even if the inputs look unchanged.
    pub fn invalidate(&mut self) {
        self.stamp = None;
    }

    /// Partition the centroids of `sets` into regions.
    ///
    /// Sets are concatenated set-major. The build is skipped with [`BuildStatus::Unchanged`]
    /// if the configuration and every set's length and [`PrimitiveSet::modified`] stamp match
    /// the previous successful build. On error the tree is left empty.
    pub fn build(&mut self, sets: &[&dyn PrimitiveSet]) -> Result<BuildStatus, BuildError> {
        self.build_with_log(sets, &mut BuildLog::new())
    }

    /// Like [`SpatialTree::build`], recording phase timings into `log`.
    pub fn build_with_log(
        &mut self,
        sets: &[&dyn PrimitiveSet],
        log: &mut BuildLog,
    ) -> Result<BuildStatus, BuildError> {
        let stamp = BuildStamp {
            config: self.config,
            sets: sets.iter().map(|s| (s.len(), s.modified())).collect(),
        };
        if self.stamp.as_ref() == Some(&stamp) && !self.nodes.is_empty() {
            log::debug!("inputs unchanged since last build; skipping");
            return Ok(BuildStatus::Unchanged);
        }
        self.reset();
        match self.rebuild(sets, log) {
            Ok(()) => {
                self.stamp = Some(stamp);
                log::debug!(
                    "built {} regions over {} primitives in {} nodes",
                    self.regions.len(),
                    self.points.len(),
                    self.nodes.len()
                );
                Ok(BuildStatus::Built)
            }
            Err(e) => {
                log::error!("tree build failed: {e}");
                self.reset();
                Err(e)
            }
        }
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.regions.clear();
        self.points.clear();
        self.refs.clear();
        self.cell_regions.clear();
        self.stamp = None;
    }

    fn rebuild(
        &mut self,
        sets: &[&dyn PrimitiveSet],
        log: &mut BuildLog,
    ) -> Result<(), BuildError> {
        let total: usize = sets.iter().map(|s| s.len()).sum();
        if total == 0 {
            return Err(BuildError::NoPrimitives);
        }

        log.start("bounds");
        let bounds = sets
            .iter()
            .fold(Aabb3::EMPTY, |acc, s| acc.union(&s.total_bounds()));
        log.stop("bounds");
        let extent = bounds.extent();
        let largest = extent.max_element();
        if largest <= 0.0 || !largest.is_finite() {
            return Err(BuildError::DegenerateBounds);
        }

        log.start("centroids");
        let mut items: Vec<(DVec3, PrimitiveRef)> = Vec::new();
        items
            .try_reserve_exact(total)
            .map_err(|source| BuildError::Allocation {
                count: total,
                source,
            })?;
        for (set, s) in sets.iter().enumerate() {
            for index in 0..s.len() {
                items.push((s.centroid(index), PrimitiveRef { set, index }));
            }
        }
        let data = Aabb3::from_points(items.iter().map(|(p, _)| *p));
        log.stop("centroids");

        let mut root = bounds.union(&data);
        for axis in Axis::ALL {
            if extent[axis.index()] == 0.0 {
                log::warn!("input is flat along {axis:?}; inflating by 1% of the largest extent");
                let a = axis.index();
                let pad = FLAT_AXIS_INFLATION * largest;
                root.min[a] -= pad;
                root.max[a] += pad;
            }
        }
        let root = root.expanded(DVec3::splat(ROOT_PADDING * largest));

        log.start("partition");
        if self.config.allowed_axes.is_empty() {
            log::warn!("no split axes allowed; the tree is a single region");
        }
        self.nodes.push(SpatialNode::new(root, data, 0, 0..total));
        self.partition(&mut items);
        log.stop("partition");

        log.start("region ids");
        self.assign_ids();
        log.stop("region ids");

        log.start("cell regions");
        let (points, refs): (Vec<DVec3>, Vec<PrimitiveRef>) = items.into_iter().unzip();
        self.points = points;
        self.refs = refs;
        self.cell_regions = sets.iter().map(|s| vec![0; s.len()]).collect();
        for (region, leaf) in self.regions.iter().enumerate() {
            for r in &self.refs[self.nodes[leaf.get()].centroids.clone()] {
                self.cell_regions[r.set][r.index] = region;
            }
        }
        log.stop("cell regions");
        Ok(())
    }

    /// Whether the node covering `n` centroids at `level` stays a leaf.
    fn stops(&self, n: usize, level: usize) -> bool {
        let min = self.config.min_cells_per_region;
        n < 2 || (min > 0 && n / 2 < min) || level >= self.config.max_level
    }

    /// Candidate split axes, best first: the longest allowed data extent wins, and on equal
    /// extents the earlier axis wins.
    fn split_axes(&self, data: &Aabb3) -> Vec<Axis> {
        let allowed = self.config.allowed_axes;
        if let Some(only) = allowed.single() {
            return vec![only];
        }
        let extent = data.extent();
        let mut axes: Vec<Axis> = Axis::ALL.into_iter().filter(|a| allowed.allows(*a)).collect();
        // Stable, so equal extents keep X < Y < Z.
        axes.sort_by(|a, b| extent[b.index()].total_cmp(&extent[a.index()]));
        axes
    }

    fn partition(&mut self, items: &mut [(DVec3, PrimitiveRef)]) {
        let mut work = vec![NodeIdx::new(0)];
        while let Some(idx) = work.pop() {
            let (range, level, spatial, data) = {
                let n = &self.nodes[idx.get()];
                (n.centroids.clone(), n.level, n.spatial, n.data)
            };
            if self.stops(range.len(), level) {
                continue;
            }
            let slice = &mut items[range.clone()];
            let cut = self.split_axes(&data).into_iter().find_map(|axis| {
                let a = axis.index();
                median_cut_by(&mut *slice, |(p, _)| p[a]).map(|(cut, coord)| (axis, cut, coord))
            });
            let Some((axis, cut, coordinate)) = cut else {
                log::trace!("node at level {level} with {} centroids cannot be cut", range.len());
                continue;
            };
            let mid = range.start + cut;
            let left_data = Aabb3::from_points(items[range.start..mid].iter().map(|(p, _)| *p));
            let right_data = Aabb3::from_points(items[mid..range.end].iter().map(|(p, _)| *p));
            let left = NodeIdx::new(self.nodes.len());
            self.nodes.push(SpatialNode::new(
                spatial.with_max(axis, coordinate),
                left_data,
                level + 1,
                range.start..mid,
            ));
            let right = NodeIdx::new(self.nodes.len());
            self.nodes.push(SpatialNode::new(
                spatial.with_min(axis, coordinate),
                right_data,
                level + 1,
                mid..range.end,
            ));
            self.nodes[idx.get()].split = Some(Split {
                axis,
                coordinate,
                left,
                right,
            });
            log::trace!(
                "level {level}: split {} centroids along {axis:?} at {coordinate} ({} | {})",
                range.len(),
                cut,
                range.len() - cut
            );
            work.push(right);
            work.push(left);
        }
    }

    /// Number leaves left to right, then give each internal node its children's id span.
    fn assign_ids(&mut self) {
        let mut stack = vec![NodeIdx::new(0)];
        while let Some(idx) = stack.pop() {
            let node = &mut self.nodes[idx.get()];
            match node.split {
                Some(s) => {
                    stack.push(s.right);
                    stack.push(s.left);
                }
                None => {
                    let id = self.regions.len();
                    node.region_id = Some(id);
                    node.min_id = id;
                    node.max_id = id;
                    self.regions.push(idx);
                }
            }
        }
        // Children are always stored after their parent.
        for i in (0..self.nodes.len()).rev() {
            if let Some(s) = self.nodes[i].split {
                let (lo, hi) = (self.nodes[s.left.get()].min_id, self.nodes[s.right.get()].max_id);
                self.nodes[i].min_id = lo;
                self.nodes[i].max_id = hi;
            }
        }
    }

    /// True if no tree has been built.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of regions (leaves).
    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// Number of levels; a lone root is one level.
    pub fn num_levels(&self) -> usize {
        self.nodes.iter().map(|n| n.level + 1).max().unwrap_or(0)
    }

    /// Total primitives partitioned.
    pub fn num_primitives(&self) -> usize {
        self.points.len()
    }

    /// The root node, if built.
    pub fn root(&self) -> Option<NodeIdx> {
        (!self.nodes.is_empty()).then(|| NodeIdx::new(0))
    }

    /// Node by index.
    pub fn node(&self, idx: NodeIdx) -> Option<&SpatialNode> {
        self.nodes.get(idx.get())
    }

    /// Box of the whole tree.
    pub fn bounds(&self, kind: BoundsKind) -> Option<Aabb3> {
        self.nodes.first().map(|n| n.bounds(kind))
    }

    /// Leaf node of `region`; logs and returns `None` for unknown ids.
    pub fn region_node(&self, region: usize) -> Option<&SpatialNode> {
        match self.regions.get(region) {
            Some(idx) => Some(&self.nodes[idx.get()]),
            None => {
                log::error!(
                    "region {region} out of range; tree has {} regions",
                    self.regions.len()
                );
                None
            }
        }
    }

    /// Box of `region`.
    pub fn region_bounds(&self, region: usize, kind: BoundsKind) -> Option<Aabb3> {
        self.region_node(region).map(|n| n.bounds(kind))
    }

    /// Boxes of every node at depth `level`, plus leaves that end above it, left to right.
    pub fn boxes_at_level(&self, level: usize, kind: BoundsKind) -> Vec<Aabb3> {
        let mut out = Vec::new();
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let n = &self.nodes[idx.get()];
            match n.split {
                Some(s) if n.level < level => {
                    stack.push(s.right);
                    stack.push(s.left);
                }
                _ => out.push(n.bounds(kind)),
            }
        }
        out
    }

    /// Region whose spatial box contains `p` (half-open), or `None` outside the tree.
    pub fn region_containing_point(&self, p: DVec3) -> Option<usize> {
        let root = self.nodes.first()?;
        if !root.spatial.contains_point(p) {
            return None;
        }
        let mut node = root;
        while let Some(s) = node.split {
            let next = if p[s.axis.index()] < s.coordinate {
                s.left
            } else {
                s.right
            };
            node = &self.nodes[next.get()];
        }
        node.region_id
    }

    /// Region owning the centroid of primitive `cell` of set `set`.
    pub fn region_containing_cell(&self, set: usize, cell: usize) -> Option<usize> {
        let regions = self.all_regions_containing_cells(set)?;
        let region = regions.get(cell).copied();
        if region.is_none() {
            log::error!("cell {cell} out of range for set {set}");
        }
        region
    }

    /// Owning region of every primitive of set `set`, indexed by primitive.
    pub fn all_regions_containing_cells(&self, set: usize) -> Option<&[usize]> {
        let regions = self.cell_regions.get(set).map(Vec::as_slice);
        if regions.is_none() {
            log::error!(
                "set {set} out of range; tree was built over {} sets",
                self.cell_regions.len()
            );
        }
        regions
    }

    /// Primitives whose centroid lies in `region`.
    pub fn region_primitives(&self, region: usize) -> &[PrimitiveRef] {
        match self.region_node(region) {
            Some(n) => &self.refs[n.centroids.clone()],
            None => &[],
        }
    }
}
