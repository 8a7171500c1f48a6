//! Cortex boundary: one ray-cast boundary per angle.

use std::borrow::Cow;

use image::GrayImage;

use super::{
    check_image, finish_radii, map_indices, radius_table, repair_radii, CortexExtraction,
    RingMetrics,
};
use crate::circle::fit_circle;
use crate::config::CortexConfig;
use crate::contour::{assemble_contour, Contour, ContourRole};
use crate::enhance::enhance_dark_edges;
use crate::error::ContourError;
use crate::exclusion::{patch_erased, ExclusionSet};
use crate::mask::prepare_mask;
use crate::ray::{locate_boundary, ring_angle, Ray};
use crate::region::Region;

/// Extract the cortex contour of one slice.
///
/// With a `prior` contour of at least three vertices the rays start at its
/// centroid and stop at the polygon; otherwise the prepared `mask` supplies
/// the centre, the ray length, and the inside test. `slice` is 1-based.
pub fn extract_cortex(
    intensity: &GrayImage,
    mask: &GrayImage,
    prior: Option<&Contour>,
    exclusions: &ExclusionSet,
    slice: u32,
    cfg: &CortexConfig,
) -> Result<CortexExtraction, ContourError> {
    cfg.validate()?;
    check_image(intensity)?;
    if mask.dimensions() != intensity.dimensions() {
        return Err(ContourError::DimensionMismatch {
            mask: mask.dimensions(),
            image: intensity.dimensions(),
        });
    }

    let intensity = search_image(intensity, cfg);

    if let Some(prior) = prior.filter(|c| c.len() >= 3) {
        if let Some(center) = prior.centroid() {
            let ray_length = cfg.seed_radius_factor * prior.feret_diameter();
            tracing::debug!(slice, ?center, ray_length, "cortex seeded from prior contour");
            return Ok(trace_cortex(
                &intensity, prior, center, ray_length, exclusions, slice, cfg,
            ));
        }
    }

    let prepared = prepare_mask(mask, &cfg.mask);
    let seed = prepared.seed().ok_or(ContourError::EmptyMask)?;
    let ray_length = cfg.seed_radius_factor * seed.feret_diameter;
    tracing::debug!(
        slice,
        center = ?seed.center,
        ray_length,
        area = seed.area,
        "cortex seeded from mask"
    );
    Ok(trace_cortex(
        &intensity,
        &prepared,
        seed.center,
        ray_length,
        exclusions,
        slice,
        cfg,
    ))
}

/// Repair an existing cortex contour whose vertices cross exclusion zones.
///
/// Vertices inside zones active at `contour.slice` move onto the circle
/// fitted to the others. The boundary is then traced again from the circle
/// centre, with the repaired polygon as inside test and rays
/// `retrace_radius_factor` times the circle radius long.
///
/// When too few vertices survive the zones for a circle fit, the repair is
/// dropped and the original contour is re-traced as is.
pub fn correct_erased_cortex(
    intensity: &GrayImage,
    contour: &Contour,
    exclusions: &ExclusionSet,
    cfg: &CortexConfig,
) -> Result<CortexExtraction, ContourError> {
    cfg.validate()?;
    check_image(intensity)?;
    if contour.len() < 3 {
        return Err(ContourError::InvalidConfig(format!(
            "contour {} has {} vertices, need at least 3",
            contour.name,
            contour.len()
        )));
    }

    let slice = contour.slice;
    let raw: Vec<Option<[f64; 2]>> = contour.points.iter().copied().map(Some).collect();
    let patch = patch_erased(&raw, exclusions, slice);
    let (polygon, repair_circle) = match patch.circle {
        Some(c) if !c.is_degenerate() => {
            let repaired: Vec<[f64; 2]> = patch.points.iter().flatten().copied().collect();
            (Contour::new(slice, contour.role, repaired), Some(c))
        }
        Some(_) => {
            tracing::warn!(
                slice,
                n_excluded = patch.n_patched,
                "too few vertices outside exclusion zones, keeping original contour"
            );
            (contour.clone(), None)
        }
        None => (contour.clone(), None),
    };
    let n_patched = if repair_circle.is_some() { patch.n_patched } else { 0 };

    let circle = repair_circle.unwrap_or_else(|| fit_circle(&polygon.points));
    let (center, ray_length) = if circle.is_degenerate() {
        let center = polygon.centroid().unwrap_or(circle.center());
        (center, cfg.seed_radius_factor * polygon.feret_diameter())
    } else {
        (circle.center(), cfg.retrace_radius_factor * circle.r)
    };
    tracing::debug!(slice, n_patched, ?center, ray_length, "re-tracing cortex");

    let intensity = search_image(intensity, cfg);
    let mut out = trace_cortex(
        &intensity,
        &polygon,
        center,
        ray_length,
        &ExclusionSet::default(),
        slice,
        cfg,
    );
    out.metrics.n_patched = n_patched;
    out.patch_circle = repair_circle;
    Ok(out)
}

/// Image the refinement search runs on.
fn search_image<'a>(intensity: &'a GrayImage, cfg: &CortexConfig) -> Cow<'a, GrayImage> {
    if cfg.enhance_dark_edges {
        Cow::Owned(enhance_dark_edges(intensity))
    } else {
        Cow::Borrowed(intensity)
    }
}

fn trace_cortex<R: Region + Sync + ?Sized>(
    intensity: &GrayImage,
    inside: &R,
    center: [f64; 2],
    ray_length: f64,
    exclusions: &ExclusionSet,
    slice: u32,
    cfg: &CortexConfig,
) -> CortexExtraction {
    let n = cfg.ring.n_angles;
    let hits = map_indices(n, |j| {
        let ray = Ray::from_angle(center, ring_angle(j, n), ray_length);
        locate_boundary(intensity, inside, &ray, &cfg.ray)
    });

    let mut metrics = RingMetrics {
        n_angles: n,
        n_resolved: hits.iter().flatten().count(),
        n_refined: hits.iter().flatten().filter(|h| h.refined).count(),
        ..RingMetrics::default()
    };

    let raw: Vec<Option<[f64; 2]>> = hits.iter().map(|h| h.map(|h| h.point)).collect();
    let patch = patch_erased(&raw, exclusions, slice);
    metrics.n_patched = patch.n_patched;

    let (w, h) = intensity.dimensions();
    let table = radius_table(center, &patch.points, (w, h), &cfg.ring.border, &mut metrics);
    let diagonal = ((w as f64).powi(2) + (h as f64).powi(2)).sqrt();
    let radii = repair_radii(&table, &cfg.ring, diagonal, &mut metrics);
    let radii = finish_radii(radii, &cfg.ring, &mut metrics);
    let contour = assemble_contour(center, &radii, slice, ContourRole::Cortex);

    tracing::info!(
        slice,
        n_angles = n,
        n_resolved = metrics.n_resolved,
        n_border_rejected = metrics.n_border_rejected,
        n_patched = metrics.n_patched,
        n_gap_filled = metrics.n_gap_filled,
        "cortex contour extracted"
    );

    CortexExtraction {
        contour,
        center,
        ray_length,
        metrics,
        patch_circle: patch.circle,
    }
}
