//! Zona pellucida: paired inner and outer boundaries from one set of rays.

use image::GrayImage;

use super::{
    check_image, finish_radii, map_indices, radius_table, repair_radii, RingMetrics,
    ZonaExtraction,
};
use crate::circular::mean_positive;
use crate::config::ZonaConfig;
use crate::contour::{assemble_contour, distance, ring_points, Contour, ContourRole};
use crate::error::ContourError;
use crate::exclusion::{patch_erased, ExclusionSet};
use crate::mask::prepare_mask;
use crate::ray::{resolve_paired, ring_angle, Ray};
use crate::sampling::StripSampler;

/// Extract the inner and outer zona contours of one slice from its mask.
///
/// Rays start at `center` (image centre when `None`), given in mask
/// coordinates. `slice` is 1-based.
///
/// With `output_size` set, ray hits are scaled into the output frame before
/// anything else happens to them: exclusion zones, border margins and the
/// returned contours all use output-image coordinates.
pub fn extract_zona(
    mask: &GrayImage,
    center: Option<[f64; 2]>,
    exclusions: &ExclusionSet,
    slice: u32,
    cfg: &ZonaConfig,
) -> Result<ZonaExtraction, ContourError> {
    cfg.validate()?;
    check_image(mask)?;

    let prepared = prepare_mask(mask, &cfg.mask);
    if prepared.area() == 0 {
        return Err(ContourError::EmptyMask);
    }

    let (w, h) = prepared.dimensions();
    let center = center.unwrap_or([w as f64 / 2.0, h as f64 / 2.0]);
    let ray_length = cfg.ray_length_px.unwrap_or(w.min(h) as f64);
    let n = cfg.ring.n_angles;

    let strip = StripSampler::new(prepared.as_image(), cfg.strip_width_px);
    let hits = map_indices(n, |j| {
        let ray = Ray::from_angle(center, ring_angle(j, n), ray_length);
        resolve_paired(&strip, &ray, cfg.foreground_threshold, cfg.sides)
    });

    let frame = match cfg.output_size {
        Some([ow, oh]) => (ow, oh),
        None => (w, h),
    };
    let side = SideContext {
        center,
        frame,
        scale: [frame.0 as f64 / w as f64, frame.1 as f64 / h as f64],
        exclusions,
        slice,
        cfg,
    };

    let inner = cfg.sides.wants_inner().then(|| {
        let raw: Vec<_> = hits.iter().map(|hit| hit.inner).collect();
        side.finish(&raw, ContourRole::ZonaInner)
    });
    let outer = cfg.sides.wants_outer().then(|| {
        let raw: Vec<_> = hits.iter().map(|hit| hit.outer).collect();
        side.finish(&raw, ContourRole::ZonaOuter)
    });

    let (inner, inner_metrics) = inner.unzip();
    let (outer, outer_metrics) = outer.unzip();
    Ok(ZonaExtraction {
        center,
        inner,
        outer,
        inner_metrics,
        outer_metrics,
    })
}

/// Per-slice state shared by the inner and outer side.
struct SideContext<'a> {
    /// Ray origin, mask frame.
    center: [f64; 2],
    /// Output frame size.
    frame: (u32, u32),
    /// Mask-to-output scale per axis.
    scale: [f64; 2],
    exclusions: &'a ExclusionSet,
    slice: u32,
    cfg: &'a ZonaConfig,
}

impl SideContext<'_> {
    fn finish(&self, raw: &[Option<[f64; 2]>], role: ContourRole) -> (Contour, RingMetrics) {
        let ring = &self.cfg.ring;
        let mut metrics = RingMetrics {
            n_angles: raw.len(),
            n_resolved: raw.iter().flatten().count(),
            ..RingMetrics::default()
        };

        let [sx, sy] = self.scale;
        let to_frame = |p: [f64; 2]| [p[0] * sx, p[1] * sy];
        let raw: Vec<Option<[f64; 2]>> = raw.iter().map(|p| p.map(to_frame)).collect();
        let origin = to_frame(self.center);

        let patch = patch_erased(&raw, self.exclusions, self.slice);
        metrics.n_patched = patch.n_patched;

        let (w, h) = self.frame;
        let table = radius_table(origin, &patch.points, self.frame, &ring.border, &mut metrics);
        let fallback = w.max(h) as f64;
        let radii = repair_radii(&table, ring, fallback, &mut metrics);

        let points = ring_points(origin, &radii);
        let center = if self.cfg.recenter {
            let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
            let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
            [mean_positive(&xs), mean_positive(&ys)]
        } else {
            origin
        };

        let radii: Vec<f64> = points.iter().map(|&p| distance(p, center)).collect();
        let radii = finish_radii(radii, ring, &mut metrics);
        let contour = assemble_contour(center, &radii, self.slice, role);

        tracing::info!(
            slice = self.slice,
            contour = %contour.name,
            n_resolved = metrics.n_resolved,
            n_border_rejected = metrics.n_border_rejected,
            n_gap_filled = metrics.n_gap_filled,
            n_fallback = metrics.n_fallback,
            "zona contour extracted"
        );
        (contour, metrics)
    }
}
