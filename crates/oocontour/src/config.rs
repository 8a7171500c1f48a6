//! Configuration for the cortex and zona extraction pipelines.
//!
//! Every struct implements `Default` with the values the pipelines were tuned
//! with, deserializes with missing fields filled from those defaults, and can
//! be loaded from a JSON string.

use crate::error::ContourError;
use crate::mask::MaskConfig;
use crate::ray::PairedSides;

/// Minimum number of angles for a closed contour.
pub const MIN_ANGLES: usize = 3;

/// How close to the image edge a boundary point may lie before it is
/// treated as unresolved.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMargin {
    /// Accept every in-image point.
    None,
    /// Same fraction of the width (height) at both ends of each axis.
    Fraction(f64),
    /// Fixed pixel margin at the low ends, fraction of the size at the high
    /// ends.
    Asymmetric {
        /// Margin at `x = 0` / `y = 0`, in pixels.
        low_px: f64,
        /// Margin at `x = w` / `y = h`, as a fraction of the size.
        high_fraction: f64,
    },
}

impl BorderMargin {
    /// True when `p` is within the margin of a `w × h` image, outside it, or
    /// not finite.
    pub fn is_near_border(&self, p: [f64; 2], w: u32, h: u32) -> bool {
        if !p[0].is_finite() || !p[1].is_finite() {
            return true;
        }
        let (w, h) = (w as f64, h as f64);
        match *self {
            BorderMargin::None => p[0] < 0.0 || p[1] < 0.0 || p[0] > w || p[1] > h,
            BorderMargin::Fraction(f) => {
                p[0] >= (1.0 - f) * w || p[0] <= f * w || p[1] >= (1.0 - f) * h || p[1] <= f * h
            }
            BorderMargin::Asymmetric {
                low_px,
                high_fraction,
            } => {
                let hi = 1.0 - high_fraction;
                p[0] >= hi * w || p[0] <= low_px || p[1] >= hi * h || p[1] <= low_px
            }
        }
    }

    fn validate(&self) -> Result<(), ContourError> {
        let ok = match *self {
            BorderMargin::None => true,
            BorderMargin::Fraction(f) => (0.0..0.5).contains(&f),
            BorderMargin::Asymmetric {
                low_px,
                high_fraction,
            } => low_px >= 0.0 && (0.0..0.5).contains(&high_fraction),
        };
        if ok {
            Ok(())
        } else {
            Err(ContourError::InvalidConfig(format!(
                "border margin out of range: {:?}",
                self
            )))
        }
    }
}

/// Ray casting controls for the cortex locator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RayCastParams {
    /// Step (pixels) of the coarse region-exit search.
    pub coarse_step_px: f64,
    /// Refinement half-width as a fraction of the ray length.
    pub reach_proportion: f64,
    /// Width (pixels) of the strip averaged across the ray.
    pub strip_width_px: f64,
}

impl Default for RayCastParams {
    fn default() -> Self {
        Self {
            coarse_step_px: 0.25,
            reach_proportion: 0.005,
            strip_width_px: 30.0,
        }
    }
}

/// Angular sampling and ring statistics shared by both pipelines.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Number of evenly spaced angles.
    pub n_angles: usize,
    /// Initial half-width (angle steps) of the gap-repair window.
    pub repair_half_width: usize,
    /// Half-width (angle steps) of the final circular moving average.
    pub smooth_half_width: usize,
    /// Clamp radii to `mean ± k·std` before smoothing; `None` skips it.
    pub clamp_sigma: Option<f64>,
    /// Border rejection rule.
    pub border: BorderMargin,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self::cortex()
    }
}

impl RingConfig {
    /// Defaults for the single cortex boundary.
    pub fn cortex() -> Self {
        Self {
            n_angles: 360,
            repair_half_width: 10,
            smooth_half_width: 5,
            clamp_sigma: None,
            border: BorderMargin::Fraction(0.04),
        }
    }

    /// Defaults for the paired zona boundaries.
    pub fn zona() -> Self {
        Self {
            n_angles: 360,
            repair_half_width: 15,
            smooth_half_width: 10,
            clamp_sigma: Some(4.0),
            border: BorderMargin::Asymmetric {
                low_px: 3.0,
                high_fraction: 0.01,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ContourError> {
        if self.n_angles < MIN_ANGLES {
            return Err(ContourError::TooFewAngles {
                needed: MIN_ANGLES,
                got: self.n_angles,
            });
        }
        if let Some(k) = self.clamp_sigma {
            if !(k.is_finite() && k > 0.0) {
                return Err(ContourError::InvalidConfig(format!(
                    "clamp_sigma must be positive, got {}",
                    k
                )));
            }
        }
        self.border.validate()
    }
}

/// Top-level configuration for cortex extraction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Angular sampling and ring statistics.
    pub ring: RingConfig,
    /// Ray casting controls.
    pub ray: RayCastParams,
    /// Mask preparation.
    pub mask: MaskConfig,
    /// Ray length as a multiple of the seed's Feret diameter.
    pub seed_radius_factor: f64,
    /// Ray length as a multiple of the repair-circle radius when an existing
    /// contour is re-traced after exclusion repair.
    pub retrace_radius_factor: f64,
    /// Search the inverted, edge-enhanced slice instead of raw intensity, so
    /// refinement snaps to a dark cortex band.
    pub enhance_dark_edges: bool,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            ring: RingConfig::cortex(),
            ray: RayCastParams::default(),
            mask: MaskConfig::default(),
            seed_radius_factor: 0.7,
            retrace_radius_factor: 1.4,
            enhance_dark_edges: false,
        }
    }
}

impl CortexConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ContourError> {
        self.ring.validate()?;
        let ray = &self.ray;
        if !(ray.coarse_step_px.is_finite() && ray.coarse_step_px > 0.0) {
            return Err(ContourError::InvalidConfig(format!(
                "coarse_step_px must be positive, got {}",
                ray.coarse_step_px
            )));
        }
        if !(0.0..1.0).contains(&ray.reach_proportion) {
            return Err(ContourError::InvalidConfig(format!(
                "reach_proportion must lie in [0, 1), got {}",
                ray.reach_proportion
            )));
        }
        if !(ray.strip_width_px.is_finite() && ray.strip_width_px > 0.0) {
            return Err(ContourError::InvalidConfig(format!(
                "strip_width_px must be positive, got {}",
                ray.strip_width_px
            )));
        }
        for (name, v) in [
            ("seed_radius_factor", self.seed_radius_factor),
            ("retrace_radius_factor", self.retrace_radius_factor),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ContourError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

/// Top-level configuration for zona extraction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ZonaConfig {
    /// Angular sampling and ring statistics.
    pub ring: RingConfig,
    /// Mask preparation.
    pub mask: MaskConfig,
    /// Width (pixels) of the strip averaged across each ray.
    pub strip_width_px: f64,
    /// Strip average above which a sample is foreground (0-255 scale).
    pub foreground_threshold: f64,
    /// Ray length in pixels; `None` uses the smaller image dimension.
    pub ray_length_px: Option<f64>,
    /// Which boundaries to compute.
    pub sides: PairedSides,
    /// Re-centre each side on the mean of its repaired points before the
    /// outlier clamp.
    pub recenter: bool,
    /// Size of the image the contours are reported in, when it differs from
    /// the mask size. Points are scaled per axis, and exclusion zones and
    /// border margins are evaluated in this frame.
    pub output_size: Option<[u32; 2]>,
}

impl Default for ZonaConfig {
    fn default() -> Self {
        Self {
            ring: RingConfig::zona(),
            mask: MaskConfig::zona(),
            strip_width_px: 15.0,
            foreground_threshold: 200.0,
            ray_length_px: None,
            sides: PairedSides::Both,
            recenter: true,
            output_size: None,
        }
    }
}

impl ZonaConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ContourError> {
        self.ring.validate()?;
        if !(self.strip_width_px.is_finite() && self.strip_width_px > 0.0) {
            return Err(ContourError::InvalidConfig(format!(
                "strip_width_px must be positive, got {}",
                self.strip_width_px
            )));
        }
        if let Some(len) = self.ray_length_px {
            if !(len.is_finite() && len > 0.0) {
                return Err(ContourError::InvalidConfig(format!(
                    "ray_length_px must be positive, got {}",
                    len
                )));
            }
        }
        if let Some([w, h]) = self.output_size {
            if w == 0 || h == 0 {
                return Err(ContourError::InvalidConfig(
                    "output_size must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_missing_fields_from_defaults() {
        let cfg = CortexConfig::from_json_str(r#"{"ring": {"n_angles": 120}}"#).unwrap();
        assert_eq!(cfg.ring.n_angles, 120);
        assert_eq!(cfg.ring.smooth_half_width, 5);
        assert_eq!(cfg.ray, RayCastParams::default());

        let cfg = ZonaConfig::from_json_str(r#"{"sides": "outer_only", "recenter": false}"#)
            .unwrap();
        assert_eq!(cfg.sides, PairedSides::OuterOnly);
        assert!(!cfg.recenter);
        assert_eq!(cfg.strip_width_px, 15.0);
    }

    #[test]
    fn border_margin_round_trips_through_json() {
        let cfg = ZonaConfig::default();
        let s = serde_json::to_string(&cfg).unwrap();
        assert_eq!(ZonaConfig::from_json_str(&s).unwrap(), cfg);
        let m: BorderMargin = serde_json::from_str(r#"{"fraction": 0.1}"#).unwrap();
        assert_eq!(m, BorderMargin::Fraction(0.1));
    }

    #[test]
    fn border_rules() {
        let cortex = BorderMargin::Fraction(0.04);
        assert!(cortex.is_near_border([3.9, 50.0], 100, 100));
        assert!(cortex.is_near_border([50.0, 96.0], 100, 100));
        assert!(!cortex.is_near_border([50.0, 50.0], 100, 100));

        let zona = RingConfig::zona().border;
        assert!(zona.is_near_border([3.0, 50.0], 100, 100));
        assert!(!zona.is_near_border([3.5, 50.0], 100, 100));
        assert!(zona.is_near_border([50.0, 99.0], 100, 100));
        assert!(!zona.is_near_border([50.0, 98.5], 100, 100));
        assert!(zona.is_near_border([f64::NAN, 50.0], 100, 100));

        assert!(!BorderMargin::None.is_near_border([0.0, 100.0], 100, 100));
        assert!(BorderMargin::None.is_near_border([-0.1, 10.0], 100, 100));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = CortexConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.ring.n_angles = 2;
        assert_eq!(
            cfg.validate(),
            Err(ContourError::TooFewAngles { needed: 3, got: 2 })
        );

        let mut cfg = CortexConfig::default();
        cfg.ray.reach_proportion = 1.5;
        assert!(matches!(cfg.validate(), Err(ContourError::InvalidConfig(_))));

        let mut cfg = ZonaConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.ring.border = BorderMargin::Fraction(0.7);
        assert!(cfg.validate().is_err());
    }
}
