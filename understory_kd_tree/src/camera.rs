// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera contract for frustum queries and view ordering.

use glam::{DMat4, DVec2, DVec3};

/// A sub-rectangle of normalized device coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Lower-left corner, each coordinate in `[-1, 1]`.
    pub min: DVec2,
    /// Upper-right corner, each coordinate in `[-1, 1]`.
    pub max: DVec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

impl Viewport {
    /// The whole view.
    pub const FULL: Self = Self {
        min: DVec2::NEG_ONE,
        max: DVec2::ONE,
    };

    /// Create a viewport from `x0..x1` and `y0..y1`.
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            min: DVec2::new(x0, y0),
            max: DVec2::new(x1, y1),
        }
    }

    /// True if both corners lie in `[-1, 1]` and the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        let in_range = |v: DVec2| v.cmpge(DVec2::NEG_ONE).all() && v.cmple(DVec2::ONE).all();
        in_range(self.min) && in_range(self.max) && self.min.cmplt(self.max).all()
    }
}

/// Something that looks at the scene.
pub trait Camera {
    /// Eye position in world space.
    fn position(&self) -> DVec3;

    /// Direction the camera looks along.
    fn view_direction(&self) -> DVec3;

    /// World-space corners of the frustum restricted to `viewport`.
    ///
    /// Near rectangle first, then far, each ordered `(x0, y0)`, `(x1, y0)`, `(x1, y1)`,
    /// `(x0, y1)`. The viewport has already been validated.
    fn frustum_corners(&self, viewport: &Viewport) -> [DVec3; 8];
}

/// A right-handed perspective camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Eye position.
    pub eye: DVec3,
    /// Point the camera looks at.
    pub target: DVec3,
    /// Approximate up direction.
    pub up: DVec3,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Width over height.
    pub aspect: f64,
    /// Near clip distance.
    pub near: f64,
    /// Far clip distance.
    pub far: f64,
}

impl PerspectiveCamera {
    /// Camera at `eye` looking at `target` with a 30 degree field of view and clip range
    /// `0.1..1000`.
    pub fn look_at(eye: DVec3, target: DVec3, up: DVec3) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y: 30_f64.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// World-to-clip transform.
    pub fn view_projection(&self) -> DMat4 {
        let view = DMat4::look_at_rh(self.eye, self.target, self.up);
        let projection = DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        projection * view
    }
}

impl Camera for PerspectiveCamera {
    fn position(&self) -> DVec3 {
        self.eye
    }

    fn view_direction(&self) -> DVec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    fn frustum_corners(&self, viewport: &Viewport) -> [DVec3; 8] {
        let inverse = self.view_projection().inverse();
        let (lo, hi) = (viewport.min, viewport.max);
        let rect = [
            DVec2::new(lo.x, lo.y),
            DVec2::new(hi.x, lo.y),
            DVec2::new(hi.x, hi.y),
            DVec2::new(lo.x, hi.y),
        ];
        // perspective_rh maps depth to [0, 1].
        let mut corners = [DVec3::ZERO; 8];
        for (i, c) in corners.iter_mut().enumerate() {
            let xy = rect[i % 4];
            let depth = if i < 4 { 0.0 } else { 1.0 };
            *c = inverse.project_point3(xy.extend(depth));
        }
        corners
    }
}
