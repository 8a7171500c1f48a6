//! Radial contour extraction for oocyte cortex and zona pellucida masks.
//!
//! Turns a per-slice segmentation mask into smooth, closed, sub-pixel
//! contours. The stages are:
//!
//! 1. **Mask** – binarize, fix polarity, keep the main component, seed a
//!    centre and a size estimate.
//! 2. **Ray** – cast one ray per angle; locate a single boundary (cortex) or
//!    the nearest and farthest foreground (zona inner/outer). The cortex
//!    search can run on an inverted, edge-enhanced slice.
//! 3. **Exclusion** – move points inside untrusted zones onto a Pratt circle
//!    fitted to the remaining points.
//! 4. **Circular** – repair unresolved radii from angular neighbours, clamp
//!    outliers, smooth around the ring.
//! 5. **Contour** – place the radii back around the centre as a named polygon.
//!
//! # Public API
//! - [`extract_cortex`], [`extract_zona`] and their stack variants as entry
//!   points
//! - [`CortexConfig`] / [`ZonaConfig`] for tuning
//! - [`Contour`] and [`ExclusionSet`] as the exchanged values
//!
//! The numeric primitives (circle fit, ring statistics, ray casting) are
//! exposed for callers that assemble their own pipeline.

pub mod circle;
pub mod circular;
mod config;
mod contour;
pub mod enhance;
mod error;
mod exclusion;
mod mask;
mod pipeline;
pub mod ray;
mod region;
pub mod sampling;

#[cfg(test)]
pub(crate) mod test_utils;

pub use circle::{fit_circle, fit_circle_pratt, Circle, FitStatus, PrattFit};
pub use config::{BorderMargin, CortexConfig, RayCastParams, RingConfig, ZonaConfig};
pub use contour::{assemble_contour, Contour, ContourRole};
pub use error::ContourError;
pub use exclusion::{patch_erased, ExclusionSet, ExclusionZone, PatchOutcome, SliceScope};
pub use mask::{prepare_mask, BinaryMask, MaskConfig, MaskSeed};
pub use pipeline::{
    correct_erased_cortex, extract_cortex, extract_cortex_stack, extract_zona,
    extract_zona_stack, CortexExtraction, CortexSlice, RingMetrics, ZonaExtraction,
};
pub use ray::PairedSides;
pub use region::{polygon_contains, Region};
