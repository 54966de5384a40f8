// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_kd_tree --heading-base-level=0

//! Understory k-d Tree: a median-split spatial decomposition with numbered regions.
//!
//! Understory k-d Tree is a reusable building block for distributing and rendering large
//! datasets: it cuts space into box-shaped regions holding roughly equal numbers of
//! primitives, gives each region a stable id, and answers "which regions does this touch"
//! for boxes, convex volumes, camera frusta, and individual primitives.
//!
//! - Builds by recursive median splits along the longest (allowed) axis, using Floyd–Rivest
//!   selection so each level costs linear time.
//! - Numbers leaves in order, so every subtree covers a contiguous id range. A set of ids
//!   can be described by the fewest boxes with [`SpatialTree::min_convex_subregions`].
//! - Assigns every primitive to exactly one region by its centroid, optionally listing the
//!   primitives that also overlap neighbouring regions.
//! - Orders regions front to back (or back to front) for a view direction, for compositing.
//!
//! ## Where this fits
//!
//! Each process in a parallel job builds the same tree over the same global data and uses
//! region ids as the unit of ownership. This crate does no communication of its own.
//! Convex-volume tests live in [`understory_polytope`] and know nothing about the tree.
//!
//! ## API overview
//!
//! - [`SpatialTree`]: builds over one or more [`PrimitiveSet`]s and answers queries.
//! - [`SpatialNode`] / [`NodeIdx`]: read-only view of the tree structure.
//! - [`TreeConfig`] and [`AxisMask`]: depth, leaf size, and allowed split axes.
//! - [`BoundsKind`]: whether queries use the space a region owns or the tight box around its data.
//! - [`CellLists`]: per-region primitive lists from [`SpatialTree::create_cell_lists`].
//! - [`Camera`] / [`Viewport`]: what frustum queries and depth ordering need from a camera.
//! - [`select_by`] / [`select`]: the order-statistic selection used by the build.
//!
//! ## Boundary conventions
//!
//! Box overlap is strict: regions sharing only a face do not overlap. Point membership is
//! half-open (`min <= p < max`), and the build places each split so that every centroid falls
//! on the same side the half-open rule gives, so a centroid on a split plane belongs to the
//! upper region and is never counted twice.
//!
//! ## Diagnostics
//!
//! Building reports failures as [`BuildError`]. Queries never fail: an unknown region id,
//! set index, degenerate convex region, or invalid viewport is logged through the `log`
//! facade and the query returns an empty result. Pass a [`BuildLog`] to
//! [`SpatialTree::build_with_log`] to time the build phases.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use understory_kd_tree::{BoundsKind, OrderDirection, PointCloud, SpatialTree, TreeConfig};
//! use understory_polytope::Aabb3;
//!
//! let points: Vec<DVec3> = (0..64)
//!     .map(|i| DVec3::new(f64::from(i % 4), f64::from((i / 4) % 4), f64::from(i / 16)))
//!     .collect();
//! let cloud = PointCloud::new(points);
//!
//! let mut tree = SpatialTree::with_config(TreeConfig {
//!     min_cells_per_region: 8,
//!     ..TreeConfig::default()
//! });
//! tree.build(&[&cloud]).unwrap();
//! assert_eq!(tree.num_regions(), 8);
//!
//! // Every point has exactly one owner.
//! let owner = tree.region_containing_point(DVec3::new(1.0, 2.0, 3.0)).unwrap();
//! assert_eq!(tree.region_containing_cell(0, 57), Some(owner));
//!
//! // Regions touched by a box, then the same regions ordered for a viewer looking down +z.
//! let hits = tree.regions_intersecting_box(
//!     &Aabb3::new(DVec3::splat(-1.0), DVec3::new(0.5, 0.5, 9.0)),
//!     BoundsKind::Spatial,
//! );
//! let ordered =
//!     tree.order_in_direction(Some(hits.as_slice()), DVec3::Z, OrderDirection::FrontToBack);
//! assert_eq!(ordered.len(), hits.len());
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

mod camera;
mod cells;
mod error;
mod locator;
mod node;
mod order;
mod primitive;
mod query;
mod select;
mod timing;
mod tree;
mod types;

pub use camera::{Camera, PerspectiveCamera, Viewport};
pub use cells::CellLists;
pub use error::BuildError;
pub use node::{NodeIdx, SpatialNode};
pub use primitive::{CellKind, PointCloud, PolyMesh, Primitive, PrimitiveSet, next_stamp};
pub use select::{median_cut_by, select, select_by};
pub use timing::{BuildLog, TimingEntry};
pub use tree::{BuildStatus, SpatialTree};
pub use types::{AxisMask, BoundsKind, OrderDirection, PrimitiveRef, TreeConfig};

pub use understory_polytope::{Aabb3, Axis, ConvexRegion};
