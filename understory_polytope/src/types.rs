// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use glam::DVec3;

/// One of the three coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in scan order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis in a `DVec3`.
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Axis for a component index, if in range.
    pub const fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }
}

/// Axis-aligned bounding box in 3D.
///
/// Two predicates with different boundary conventions are provided:
///
/// - [`Aabb3::intersects`] is strict: boxes that only share a face do not overlap.
/// - [`Aabb3::contains_point`] is half-open: `min <= p < max` on every axis, so a point
///   on a shared face belongs to exactly one of two adjacent boxes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb3 {
    /// An inverted box that acts as the identity for [`Aabb3::union`].
    pub const EMPTY: Self = Self {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    /// Create a new AABB from min/max corners.
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub const fn from_bounds(b: [f64; 6]) -> Self {
        Self {
            min: DVec3::new(b[0], b[2], b[4]),
            max: DVec3::new(b[1], b[3], b[5]),
        }
    }

    /// Flatten into `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn to_bounds(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }

    /// Tight box around a set of points. Empty input yields [`Aabb3::EMPTY`].
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut acc, p| {
            acc.include_point(p);
            acc
        })
    }

    /// Return true if the AABB is inverted on any axis. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Per-axis size, clamped at zero.
    pub fn extent(&self) -> DVec3 {
        (self.max - self.min).max(DVec3::ZERO)
    }

    /// Center point.
    pub fn center(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    /// Grow the box to include `p`.
    pub fn include_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict overlap test. Boxes that only touch along a face, edge, or corner do not overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        for i in 0..3 {
            if self.min[i] >= other.max[i] || self.max[i] <= other.min[i] {
                return false;
            }
        }
        true
    }

    /// Closed overlap test: boxes sharing a face, edge, or corner count as touching.
    pub fn touches(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Half-open containment: `min <= p < max` on every axis.
    pub fn contains_point(&self, p: DVec3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] < self.max[i])
    }

    /// Closed containment: `min <= p <= max` on every axis.
    pub fn contains_point_closed(&self, p: DVec3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// True if `other` lies entirely within this box (shared faces allowed).
    pub fn encloses(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    /// Copy of this box with the upper bound on `axis` replaced.
    pub fn with_max(&self, axis: Axis, value: f64) -> Self {
        let mut out = *self;
        out.max[axis.index()] = value;
        out
    }

    /// Copy of this box with the lower bound on `axis` replaced.
    pub fn with_min(&self, axis: Axis, value: f64) -> Self {
        let mut out = *self;
        out.min[axis.index()] = value;
        out
    }

    /// Grow each side by `amount` (per axis).
    pub fn expanded(&self, amount: DVec3) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Squared distance from `p` to the closest point of the box (zero inside).
    pub fn distance_squared_to_point(&self, p: DVec3) -> f64 {
        let clamped = p.clamp(self.min, self.max);
        p.distance_squared(clamped)
    }

    /// The eight corners; bit 0 of the index selects max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [DVec3; 8] {
        core::array::from_fn(|i| {
            DVec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Corners furthest along `direction` (`p`) and against it (`n`).
    pub fn extreme_corners(&self, direction: DVec3) -> (DVec3, DVec3) {
        let mut p = self.min;
        let mut n = self.max;
        for i in 0..3 {
            if direction[i] >= 0.0 {
                p[i] = self.max[i];
                n[i] = self.min[i];
            }
        }
        (p, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb3 {
        Aabb3::new(DVec3::ZERO, DVec3::ONE)
    }

    #[test]
    fn face_contact_is_not_overlap() {
        let a = unit();
        let b = Aabb3::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Aabb3::new(DVec3::new(1.0 - 1e-9, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&c));
        assert!(a.touches(&b));
        assert!(!a.touches(&Aabb3::new(DVec3::splat(1.5), DVec3::splat(2.0))));
    }

    #[test]
    fn half_open_point_membership() {
        let a = unit();
        let b = Aabb3::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        let on_face = DVec3::new(1.0, 0.5, 0.5);
        assert!(!a.contains_point(on_face));
        assert!(b.contains_point(on_face));
        assert!(a.contains_point(DVec3::ZERO));
        assert!(a.contains_point_closed(DVec3::ONE));
    }

    #[test]
    fn bounds_layout_round_trips() {
        let b = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let a = Aabb3::from_bounds(b);
        assert_eq!(a.min, DVec3::new(0.0, 2.0, 4.0));
        assert_eq!(a.to_bounds(), b);
    }

    #[test]
    fn extreme_corners_follow_direction() {
        let (p, n) = unit().extreme_corners(DVec3::new(1.0, -1.0, 0.5));
        assert_eq!(p, DVec3::new(1.0, 0.0, 1.0));
        assert_eq!(n, DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn empty_is_union_identity() {
        let a = unit();
        assert!(Aabb3::EMPTY.is_empty());
        assert_eq!(Aabb3::EMPTY.union(&a), a);
        assert_eq!(Aabb3::from_points([]), Aabb3::EMPTY);
    }

    #[test]
    fn distance_to_box() {
        let a = unit();
        assert_eq!(a.distance_squared_to_point(DVec3::splat(0.5)), 0.0);
        assert_eq!(a.distance_squared_to_point(DVec3::new(3.0, 0.5, 0.5)), 4.0);
    }
}
