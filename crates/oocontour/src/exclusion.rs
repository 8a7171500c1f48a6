//! Exclusion zones and repair of contour points that fall inside them.
//!
//! A zone marks an image area where the segmentation cannot be trusted
//! (debris, a pipette, a neighbouring cell). Boundary points inside an active
//! zone are replaced by the circle fitted to the remaining points.

use serde::{Deserialize, Serialize};

use crate::circle::{fit_circle_pratt, Circle};
use crate::region::{polygon_contains, Region};

/// Slices on which a zone applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceScope {
    All,
    /// One 1-based slice.
    Slice(u32),
}

impl SliceScope {
    #[inline]
    pub fn applies_to(self, slice: u32) -> bool {
        match self {
            SliceScope::All => true,
            SliceScope::Slice(s) => s == slice,
        }
    }
}

/// Polygon whose interior is untrusted on the slices of `scope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub scope: SliceScope,
    pub polygon: Vec<[f64; 2]>,
}

impl ExclusionZone {
    pub fn new(scope: SliceScope, polygon: Vec<[f64; 2]>) -> Self {
        Self { scope, polygon }
    }

    #[inline]
    pub fn is_active(&self, slice: u32) -> bool {
        self.scope.applies_to(slice)
    }
}

impl Region for ExclusionZone {
    fn contains(&self, p: [f64; 2]) -> bool {
        polygon_contains(&self.polygon, p)
    }
}

/// All exclusion zones of one image, in the order they were drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    pub zones: Vec<ExclusionZone>,
}

impl ExclusionSet {
    pub fn new(zones: Vec<ExclusionZone>) -> Self {
        Self { zones }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Zones that apply to `slice`.
    pub fn active_at(&self, slice: u32) -> impl Iterator<Item = &ExclusionZone> + '_ {
        self.zones.iter().filter(move |z| z.is_active(slice))
    }

    pub fn has_active(&self, slice: u32) -> bool {
        self.active_at(slice).next().is_some()
    }

    /// True when `p` lies inside any zone active at `slice`.
    pub fn is_excluded(&self, slice: u32, p: [f64; 2]) -> bool {
        self.active_at(slice).any(|z| z.contains(p))
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of [`patch_erased`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// Input points with excluded ones moved onto the fitted circle.
    pub points: Vec<Option<[f64; 2]>>,
    /// Circle fitted to the kept points, when a fit was made.
    pub circle: Option<Circle>,
    /// Number of points that were moved.
    pub n_patched: usize,
}

impl PatchOutcome {
    fn unchanged(points: &[Option<[f64; 2]>]) -> Self {
        Self {
            points: points.to_vec(),
            circle: None,
            n_patched: 0,
        }
    }
}

/// Replace points inside active exclusion zones by their radial projection
/// onto the circle fitted to the other points.
///
/// Unresolved (`None`) points stay unresolved. With no active zone, or when
/// every resolved point is excluded, the input is returned unchanged.
pub fn patch_erased(points: &[Option<[f64; 2]>], zones: &ExclusionSet, slice: u32) -> PatchOutcome {
    if !zones.has_active(slice) {
        return PatchOutcome::unchanged(points);
    }

    let mut kept = Vec::with_capacity(points.len());
    let mut to_fix = Vec::new();
    for (j, p) in points.iter().enumerate() {
        let Some(p) = *p else { continue };
        if zones.is_excluded(slice, p) {
            to_fix.push(j);
        } else {
            kept.push(p);
        }
    }
    if to_fix.is_empty() {
        return PatchOutcome::unchanged(points);
    }
    if kept.is_empty() {
        tracing::debug!(slice, n_excluded = to_fix.len(), "no kept points, patch skipped");
        return PatchOutcome::unchanged(points);
    }

    let fit = fit_circle_pratt(&kept);
    let circle = fit.circle;
    let mut out = points.to_vec();
    for &j in &to_fix {
        if let Some(p) = out[j] {
            out[j] = Some(circle.project_radially(p));
        }
    }
    tracing::debug!(
        slice,
        n_kept = kept.len(),
        n_patched = to_fix.len(),
        cx = circle.cx,
        cy = circle.cy,
        r = circle.r,
        status = ?fit.status,
        "patched excluded points"
    );

    PatchOutcome {
        points: out,
        circle: Some(circle),
        n_patched: to_fix.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quadrant_zone(scope: SliceScope) -> ExclusionZone {
        ExclusionZone::new(
            scope,
            vec![[50.0, 50.0], [100.0, 50.0], [100.0, 100.0], [50.0, 100.0]],
        )
    }

    /// Ring of radius 30 around (50, 50) with the first quadrant pulled in
    /// to radius 18.
    fn dented_ring(n: usize) -> Vec<Option<[f64; 2]>> {
        (0..n)
            .map(|j| {
                let a = 2.0 * std::f64::consts::PI * j as f64 / n as f64;
                let r = if a > 0.05 && a < std::f64::consts::FRAC_PI_2 - 0.05 {
                    18.0
                } else {
                    30.0
                };
                Some([50.0 + r * a.cos(), 50.0 + r * a.sin()])
            })
            .collect()
    }

    #[test]
    fn no_active_zone_is_identity() {
        let pts = dented_ring(72);
        let out = patch_erased(&pts, &ExclusionSet::default(), 1);
        assert_eq!(out.points, pts);
        assert!(out.circle.is_none());

        let set = ExclusionSet::new(vec![quadrant_zone(SliceScope::Slice(2))]);
        let out = patch_erased(&pts, &set, 1);
        assert_eq!(out.points, pts);
        assert_eq!(out.n_patched, 0);
    }

    #[test]
    fn excluded_quadrant_follows_fitted_circle() {
        let pts = dented_ring(72);
        let set = ExclusionSet::new(vec![quadrant_zone(SliceScope::All)]);
        let out = patch_erased(&pts, &set, 4);
        let circle = out.circle.unwrap();
        assert_abs_diff_eq!(circle.r, 30.0, epsilon = 1e-6);
        assert!(out.n_patched >= 16);
        for p in out.points.iter().flatten() {
            let d = ((p[0] - 50.0).powi(2) + (p[1] - 50.0).powi(2)).sqrt();
            assert_abs_diff_eq!(d, 30.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn everything_excluded_is_identity() {
        let pts = dented_ring(36);
        let everything = ExclusionZone::new(
            SliceScope::All,
            vec![[0.0, 0.0], [200.0, 0.0], [200.0, 200.0], [0.0, 200.0]],
        );
        let out = patch_erased(&pts, &ExclusionSet::new(vec![everything]), 1);
        assert_eq!(out.points, pts);
        assert!(out.circle.is_none());
    }

    #[test]
    fn unresolved_points_stay_unresolved() {
        let mut pts = dented_ring(72);
        pts[5] = None;
        let set = ExclusionSet::new(vec![quadrant_zone(SliceScope::All)]);
        let out = patch_erased(&pts, &set, 1);
        assert!(out.points[5].is_none());
    }

    #[test]
    fn zones_load_from_json() {
        let s = r#"[
            {"scope": "all", "polygon": [[0, 0], [10, 0], [10, 10]]},
            {"scope": {"slice": 2}, "polygon": [[20, 20], [30, 20], [30, 30], [20, 30]]}
        ]"#;
        let set = ExclusionSet::from_json_str(s).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.zones[1].scope, SliceScope::Slice(2));
        assert!(set.is_excluded(2, [25.0, 25.0]));
        assert!(!set.is_excluded(3, [25.0, 25.0]));
        assert!(set.is_excluded(3, [8.0, 2.0]));
        let back = ExclusionSet::from_json_str(&set.to_json().unwrap()).unwrap();
        assert_eq!(back, set);
    }
}
