// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_polytope --heading-base-level=0

//! Understory Polytope: 3D boxes, half-space planes, and convex region versus box tests.
//!
//! Understory Polytope is a reusable building block for spatial queries against convex volumes.
//!
//! - [`Aabb3`]: axis-aligned boxes with strict overlap and half-open point membership.
//! - [`Plane`]: oriented half-space planes with an outward normal.
//! - [`ConvexRegion`]: a convex polytope (for example a view frustum or a convex cell)
//!   tested against boxes with the staged algorithm from Graphics Gems IV.
//! - [`overlap`]: exact segment, polyline, triangle, polygon, and triangle strip tests
//!   against boxes.
//!
//! Higher layers (like the k-d region tree) use these to answer "which regions does this
//! volume touch" without knowing anything about the volume's origin.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use understory_polytope::{Aabb3, BoxRelation, ConvexRegion};
//!
//! let cube = ConvexRegion::from_box(&Aabb3::new(DVec3::ZERO, DVec3::ONE));
//!
//! // Overlapping, disjoint, and identical boxes.
//! assert!(cube.intersects_box(&Aabb3::new(DVec3::splat(0.5), DVec3::splat(1.5))));
//! assert!(!cube.intersects_box(&Aabb3::new(DVec3::splat(2.0), DVec3::splat(3.0))));
//! assert_eq!(
//!     cube.relation(&Aabb3::new(DVec3::ZERO, DVec3::ONE)),
//!     BoxRelation::BoxEnclosesRegion,
//! );
//! ```
//!
//! ## Boundary conventions
//!
//! Box overlap is strict: boxes sharing only a face do not intersect. Point membership is
//! half-open (`min <= p < max`), so a point on a shared face belongs to exactly one box.
//! Plane membership tolerates [`PLANE_EPSILON`] so that vertices computed from plane
//! triples are not rejected by rounding.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

pub mod hull;
pub mod overlap;
pub mod plane;
pub mod region;
pub mod types;

pub use plane::Plane;
pub use region::{BoxRelation, ConvexRegion, PLANE_EPSILON};
pub use types::{Aabb3, Axis};
