//! Per-slice extraction pipelines.
//!
//! Stages shared by both structures:
//! 1. **Cast** – one ray per angle from the centre estimate (in parallel).
//! 2. **Patch** – points inside active exclusion zones move onto a fitted circle.
//! 3. **Tabulate** – radii from the centre; border points become unresolved.
//! 4. **Repair** – unresolved radii filled from their neighbours.
//! 5. **Finish** – optional outlier clamp, then circular smoothing.

mod cortex;
mod stack;
mod zona;

pub use cortex::{correct_erased_cortex, extract_cortex};
pub use stack::{extract_cortex_stack, extract_zona_stack, CortexSlice};
pub use zona::extract_zona;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::circle::Circle;
use crate::circular::{clamp_outliers, repair_all, smooth, ClampBounds};
use crate::config::{BorderMargin, RingConfig};
use crate::contour::{distance, Contour};
use crate::error::ContourError;

/// Per-contour diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RingMetrics {
    /// Angles cast.
    pub n_angles: usize,
    /// Angles where the ray produced a boundary point.
    pub n_resolved: usize,
    /// Resolved points dropped for lying near the image border.
    pub n_border_rejected: usize,
    /// Points moved by the local-maximum search.
    pub n_refined: usize,
    /// Points moved onto the exclusion-repair circle.
    pub n_patched: usize,
    /// Radii filled from neighbouring angles.
    pub n_gap_filled: usize,
    /// Radii set to the global fallback.
    pub n_fallback: usize,
    /// Bounds of the outlier clamp, when one was applied.
    pub clamp: Option<ClampBounds>,
}

/// Cortex boundary of one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CortexExtraction {
    pub contour: Contour,
    /// Origin of the rays.
    pub center: [f64; 2],
    pub ray_length: f64,
    pub metrics: RingMetrics,
    /// Circle used to repair excluded points, if any were repaired.
    pub patch_circle: Option<Circle>,
}

/// Inner and outer zona boundaries of one slice.
///
/// Sides that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonaExtraction {
    /// Origin of the rays, in mask coordinates.
    pub center: [f64; 2],
    pub inner: Option<Contour>,
    pub outer: Option<Contour>,
    pub inner_metrics: Option<RingMetrics>,
    pub outer_metrics: Option<RingMetrics>,
}

/// Map `f` over `0..n`, in parallel with the `parallel` feature. Output is in
/// index order either way.
pub(crate) fn map_indices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}

pub(crate) fn check_image(img: &GrayImage) -> Result<(), ContourError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ContourError::EmptyImage);
    }
    Ok(())
}

/// Radius of every point around `center`; points near the border of a
/// `w × h` image become unresolved.
pub(crate) fn radius_table(
    center: [f64; 2],
    points: &[Option<[f64; 2]>],
    (w, h): (u32, u32),
    border: &BorderMargin,
    metrics: &mut RingMetrics,
) -> Vec<Option<f64>> {
    points
        .iter()
        .map(|p| {
            let p = (*p)?;
            if border.is_near_border(p, w, h) {
                metrics.n_border_rejected += 1;
                return None;
            }
            Some(distance(p, center))
        })
        .collect()
}

/// Fill every unresolved radius; `fallback` covers gaps too wide to bridge.
pub(crate) fn repair_radii(
    table: &[Option<f64>],
    ring: &RingConfig,
    fallback: f64,
    metrics: &mut RingMetrics,
) -> Vec<f64> {
    let (radii, stats) = repair_all(table, ring.repair_half_width, fallback);
    metrics.n_gap_filled = stats.n_gap_filled;
    metrics.n_fallback = stats.n_fallback;
    if stats.n_fallback > 0 {
        tracing::warn!(
            n_fallback = stats.n_fallback,
            fallback,
            "gap repair exhausted, using fallback radius"
        );
    }
    radii
}

/// Optional outlier clamp followed by circular smoothing.
pub(crate) fn finish_radii(mut radii: Vec<f64>, ring: &RingConfig, metrics: &mut RingMetrics) -> Vec<f64> {
    if let Some(k) = ring.clamp_sigma {
        metrics.clamp = Some(clamp_outliers(&mut radii, k));
    }
    smooth(&radii, ring.smooth_half_width)
}
