//! Nearest and farthest foreground sample along a ray.

use super::Ray;
use crate::sampling::StripSampler;

/// Foreground samples this close to the far end cannot start an inner
/// boundary.
const INNER_TAIL_SAMPLES: usize = 4;
/// Foreground samples this close to the origin cannot end an outer boundary.
const OUTER_HEAD_SAMPLES: usize = 2;

/// Which boundaries of an annulus to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairedSides {
    #[default]
    Both,
    InnerOnly,
    OuterOnly,
}

impl PairedSides {
    #[inline]
    pub fn wants_inner(self) -> bool {
        matches!(self, PairedSides::Both | PairedSides::InnerOnly)
    }

    #[inline]
    pub fn wants_outer(self) -> bool {
        matches!(self, PairedSides::Both | PairedSides::OuterOnly)
    }
}

/// Inner and outer boundary points found on one ray.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairedHit {
    pub inner: Option<[f64; 2]>,
    pub outer: Option<[f64; 2]>,
}

/// Scan the strip profile of `ray` for the first and last sample whose strip
/// average exceeds `threshold`.
///
/// Sides not requested by `sides` are never sampled.
pub fn resolve_paired(
    strip: &StripSampler<'_>,
    ray: &Ray,
    threshold: f64,
    sides: PairedSides,
) -> PairedHit {
    let n = ray.n_samples();
    let step = ray.sample_step();
    let normal = ray.normal();
    let is_fg = |k: usize| strip.sample(ray.point_at(k as f64 * step), normal) > threshold;

    let inner = if sides.wants_inner() {
        (0..n)
            .find(|&k| is_fg(k))
            .filter(|&k| k + INNER_TAIL_SAMPLES < n)
            .map(|k| ray.point_at(k as f64 * step))
    } else {
        None
    };

    let outer = if sides.wants_outer() {
        (0..n)
            .rev()
            .find(|&k| is_fg(k))
            .filter(|&k| k >= OUTER_HEAD_SAMPLES)
            .map(|k| ray.point_at(k as f64 * step))
    } else {
        None
    };

    PairedHit { inner, outer }
}
