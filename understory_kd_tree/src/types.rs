// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the region tree: axis masks, configuration, and query options.

use understory_polytope::Axis;

bitflags::bitflags! {
    /// Axes along which the tree may split.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AxisMask: u8 {
        /// Splits perpendicular to x are allowed.
        const X = 0b0000_0001;
        /// Splits perpendicular to y are allowed.
        const Y = 0b0000_0010;
        /// Splits perpendicular to z are allowed.
        const Z = 0b0000_0100;
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::all()
    }
}

impl AxisMask {
    /// Mask containing only `axis`.
    pub const fn only(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
            Axis::Z => Self::Z,
        }
    }

    /// All axes except x.
    pub const fn omit_x() -> Self {
        Self::Y.union(Self::Z)
    }

    /// All axes except y.
    pub const fn omit_y() -> Self {
        Self::X.union(Self::Z)
    }

    /// All axes except z.
    pub const fn omit_z() -> Self {
        Self::X.union(Self::Y)
    }

    /// Whether `axis` may be split.
    pub const fn allows(self, axis: Axis) -> bool {
        self.contains(Self::only(axis))
    }

    /// The single allowed axis, if exactly one is allowed.
    pub fn single(self) -> Option<Axis> {
        let mut allowed = Axis::ALL.into_iter().filter(|a| self.allows(*a));
        let first = allowed.next()?;
        allowed.next().is_none().then_some(first)
    }
}

/// Which box of a region a query compares against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundsKind {
    /// The region of space the node owns. Leaves tile the root box.
    #[default]
    Spatial,
    /// The tight box around the centroids assigned to the node.
    Data,
}

/// Order in which view-ordering queries emit regions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    /// Nearest regions first.
    #[default]
    FrontToBack,
    /// Farthest regions first, the usual compositing order for blending.
    BackToFront,
}

/// Construction parameters for [`SpatialTree`](crate::SpatialTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum depth of the tree; the root is level 0.
    pub max_level: usize,
    /// A node is split only if both halves keep at least this many primitives.
    /// Zero disables the limit.
    pub min_cells_per_region: usize,
    /// Axes the builder may split along.
    pub allowed_axes: AxisMask,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_level: 20,
            min_cells_per_region: 100,
            allowed_axes: AxisMask::all(),
        }
    }
}

/// A primitive identified by its dataset and its index within that dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveRef {
    /// Index of the dataset in the slice passed to the build.
    pub set: usize,
    /// Index of the primitive within its dataset.
    pub index: usize,
}
