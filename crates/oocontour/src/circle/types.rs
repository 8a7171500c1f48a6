//! Circle type and fit diagnostics.

use serde::{Deserialize, Serialize};

/// Radius reported when the closed-form fit produces a non-finite value.
pub const DEGENERATE_RADIUS: f64 = 100_000.0;

/// Geometric circle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Radius, finite and non-negative.
    pub r: f64,
}

impl Circle {
    /// Create a circle from its center and radius.
    pub fn new(center: [f64; 2], r: f64) -> Self {
        Self {
            cx: center[0],
            cy: center[1],
            r,
        }
    }

    /// Center as `[x, y]`.
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [self.cx, self.cy]
    }

    /// True when the fit fell back to [`DEGENERATE_RADIUS`].
    pub fn is_degenerate(&self) -> bool {
        self.r >= DEGENERATE_RADIUS
    }

    /// Point on the circle at `angle` radians (measured from +x towards +y).
    pub fn point_at(&self, angle: f64) -> [f64; 2] {
        [self.cx + self.r * angle.cos(), self.cy + self.r * angle.sin()]
    }

    /// Move `p` onto the circle along the direction from the center.
    pub fn project_radially(&self, p: [f64; 2]) -> [f64; 2] {
        let angle = (p[1] - self.cy).atan2(p[0] - self.cx);
        self.point_at(angle)
    }

    /// Signed distance from `p` to the circle boundary (positive outside).
    pub fn radial_residual(&self, p: [f64; 2]) -> f64 {
        let dx = p[0] - self.cx;
        let dy = p[1] - self.cy;
        (dx * dx + dy * dy).sqrt() - self.r
    }

    /// Sample `n` points on the circle, starting at angle 0.
    pub fn sample_points(&self, n: usize) -> Vec<[f64; 2]> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
                self.point_at(t)
            })
            .collect()
    }
}

/// Why the Newton iteration was reset to the zero root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootReset {
    /// The residual grew between two iterations.
    Diverged,
    /// The iterate became negative.
    NegativeRoot,
    /// The iteration budget ran out before the step converged.
    NotConverged,
}

/// Outcome category of a Pratt fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// Newton's method converged to a non-negative root.
    Converged,
    /// Newton's method was abandoned and the root reset to zero.
    RootReset(RootReset),
    /// Too few points or a non-finite closed form; radius is the sentinel.
    Degenerate,
}

/// Pratt fit result with diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrattFit {
    /// Fitted circle (always finite).
    pub circle: Circle,
    /// Newton iterations performed.
    pub iterations: usize,
    /// Outcome category.
    pub status: FitStatus,
}
