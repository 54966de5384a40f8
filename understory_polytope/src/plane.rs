// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Oriented half-space planes.

use glam::DVec3;

/// A plane with an outward-pointing unit normal.
///
/// Points with a positive [`Plane::evaluate`] value are outside the half-space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    /// Outward unit normal.
    pub normal: DVec3,
    /// Any point on the plane.
    pub origin: DVec3,
}

impl Plane {
    /// Create a plane from a normal and a point on it. The normal is normalized.
    ///
    /// Returns `None` for a zero (or non-finite) normal.
    pub fn new(normal: DVec3, origin: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self { normal, origin })
    }

    /// Plane through three points, oriented by the right-hand rule on `a -> b -> c`.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        Self::new((b - a).cross(c - a), a)
    }

    /// Best-fit plane of a (possibly non-planar) polygon using Newell's method.
    ///
    /// The origin is the vertex average, so slightly warped faces still give a usable plane.
    pub fn from_polygon(points: &[DVec3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut normal = DVec3::ZERO;
        let mut sum = DVec3::ZERO;
        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            normal += p.cross(q);
            sum += p;
        }
        let origin = sum / points.len() as f64;
        Self::new(normal, origin)
    }

    /// Signed distance of `p` from the plane; positive is outside.
    #[inline]
    pub fn evaluate(&self, p: DVec3) -> f64 {
        self.normal.dot(p - self.origin)
    }

    /// The plane constant `d` in `normal . x = d`.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.normal.dot(self.origin)
    }

    /// The same plane with the opposite orientation.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            origin: self.origin,
        }
    }

    /// Orient the plane so that `interior` evaluates as inside (non-positive).
    pub fn facing_away_from(self, interior: DVec3) -> Self {
        if self.evaluate(interior) > 0.0 {
            self.flipped()
        } else {
            self
        }
    }
}
