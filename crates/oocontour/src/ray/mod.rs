//! Ray casting from a centre estimate outwards.
//!
//! Two boundary finders share the [`Ray`] geometry:
//! 1. **Locate** – one boundary per ray: coarse exit from a reference region,
//!    then a local intensity maximum on the strip profile.
//! 2. **Paired** – nearest and farthest foreground sample along the ray
//!    (inner and outer boundary of an annulus).

mod locate;
mod paired;

pub use locate::{locate_boundary, LocatedPoint};
pub use paired::{resolve_paired, PairedHit, PairedSides};

/// Angle of ring index `j` out of `n`, measured from +x towards +y.
#[inline]
pub fn ring_angle(j: usize, n: usize) -> f64 {
    2.0 * std::f64::consts::PI * j as f64 / n as f64
}

/// A ray of finite length in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: [f64; 2],
    /// Unit direction.
    pub dir: [f64; 2],
    /// Length in pixels.
    pub length: f64,
}

impl Ray {
    pub fn from_angle(origin: [f64; 2], angle: f64, length: f64) -> Self {
        Self {
            origin,
            dir: [angle.cos(), angle.sin()],
            length,
        }
    }

    #[inline]
    pub fn point_at(&self, t: f64) -> [f64; 2] {
        [self.origin[0] + t * self.dir[0], self.origin[1] + t * self.dir[1]]
    }

    /// Unit vector perpendicular to the ray.
    #[inline]
    pub fn normal(&self) -> [f64; 2] {
        [-self.dir[1], self.dir[0]]
    }

    /// Number of profile samples: one per pixel of length, at least one.
    pub fn n_samples(&self) -> usize {
        if self.length.is_finite() && self.length > 1.0 {
            self.length.ceil() as usize
        } else {
            1
        }
    }

    /// Distance between consecutive profile samples.
    pub fn sample_step(&self) -> f64 {
        if self.length.is_finite() && self.length > 0.0 {
            self.length / self.n_samples() as f64
        } else {
            0.0
        }
    }
}
