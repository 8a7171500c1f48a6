//! Whole-stack drivers: independent slices processed concurrently.

use image::GrayImage;

use super::{extract_cortex, extract_zona, map_indices, CortexExtraction, ZonaExtraction};
use crate::config::{CortexConfig, ZonaConfig};
use crate::contour::Contour;
use crate::error::ContourError;
use crate::exclusion::ExclusionSet;

/// Inputs of one cortex slice.
#[derive(Debug, Clone, Copy)]
pub struct CortexSlice<'a> {
    pub intensity: &'a GrayImage,
    pub mask: &'a GrayImage,
    pub prior: Option<&'a Contour>,
}

/// Extract the cortex of every slice. Element `i` of the result belongs to
/// slice `i + 1`.
pub fn extract_cortex_stack(
    slices: &[CortexSlice<'_>],
    exclusions: &ExclusionSet,
    cfg: &CortexConfig,
) -> Vec<Result<CortexExtraction, ContourError>> {
    let out = map_indices(slices.len(), |i| {
        let s = &slices[i];
        extract_cortex(s.intensity, s.mask, s.prior, exclusions, slice_number(i), cfg)
    });
    log_failures("cortex", &out);
    out
}

/// Extract the zona of every mask. Element `i` of the result belongs to
/// slice `i + 1`.
pub fn extract_zona_stack(
    masks: &[GrayImage],
    center: Option<[f64; 2]>,
    exclusions: &ExclusionSet,
    cfg: &ZonaConfig,
) -> Vec<Result<ZonaExtraction, ContourError>> {
    let out = map_indices(masks.len(), |i| {
        extract_zona(&masks[i], center, exclusions, slice_number(i), cfg)
    });
    log_failures("zona", &out);
    out
}

#[inline]
fn slice_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn log_failures<T>(what: &str, results: &[Result<T, ContourError>]) {
    for (i, r) in results.iter().enumerate() {
        if let Err(e) = r {
            tracing::warn!(slice = i + 1, error = %e, "{} extraction failed", what);
        }
    }
}
