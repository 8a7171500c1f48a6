//! Algebraic circle fit (Pratt, 1987) solved with Newton's method.
//!
//! Follows Chernov's formulation: the data are centred on their centroid, the
//! Pratt characteristic polynomial is built from second and third order
//! moments, and its smallest non-negative root is found by Newton iteration
//! starting at zero.

use nalgebra::{Matrix2, Vector2};

use super::types::{Circle, FitStatus, PrattFit, RootReset, DEGENERATE_RADIUS};

const NEWTON_MAX_ITERS: usize = 20;
const NEWTON_REL_TOL: f64 = 1e-12;

/// Moments of a centred point set, normalised by the point count.
#[derive(Debug, Clone, Copy)]
struct Moments {
    mxx: f64,
    myy: f64,
    mxy: f64,
    mxz: f64,
    myz: f64,
    mzz: f64,
}

impl Moments {
    fn from_centered(points: &[[f64; 2]], mean: [f64; 2]) -> Self {
        let mut m = Moments {
            mxx: 0.0,
            myy: 0.0,
            mxy: 0.0,
            mxz: 0.0,
            myz: 0.0,
            mzz: 0.0,
        };
        for p in points {
            let x = p[0] - mean[0];
            let y = p[1] - mean[1];
            let z = x * x + y * y;
            m.mxx += x * x;
            m.myy += y * y;
            m.mxy += x * y;
            m.mxz += x * z;
            m.myz += y * z;
            m.mzz += z * z;
        }
        let n = points.len() as f64;
        m.mxx /= n;
        m.myy /= n;
        m.mxy /= n;
        m.mxz /= n;
        m.myz /= n;
        m.mzz /= n;
        m
    }
}

/// Fit a circle to `points` and return it with diagnostics.
///
/// Never fails: fewer than three finite points, collinear data or a
/// non-finite closed form yield a circle centred on the centroid with radius
/// [`DEGENERATE_RADIUS`].
pub fn fit_circle_pratt(points: &[[f64; 2]]) -> PrattFit {
    let pts: Vec<[f64; 2]> = points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect();
    let n = pts.len();
    if n == 0 {
        return degenerate([0.0, 0.0], 0);
    }

    let nf = n as f64;
    let mean = [
        pts.iter().map(|p| p[0]).sum::<f64>() / nf,
        pts.iter().map(|p| p[1]).sum::<f64>() / nf,
    ];
    if n < 3 {
        return degenerate(mean, 0);
    }

    let m = Moments::from_centered(&pts, mean);

    // Characteristic polynomial A0 + A1 x + A2 x^2 + 4 x^4.
    let mz = m.mxx + m.myy;
    let cov_xy = m.mxx * m.myy - m.mxy * m.mxy;
    let mxz2 = m.mxz * m.mxz;
    let myz2 = m.myz * m.myz;
    let a2 = 4.0 * cov_xy - 3.0 * mz * mz - m.mzz;
    let a1 = m.mzz * mz + 4.0 * cov_xy * mz - mxz2 - myz2 - mz * mz * mz;
    let a0 = mxz2 * m.myy + myz2 * m.mxx - m.mzz * cov_xy - 2.0 * m.mxz * m.myz * m.mxy
        + mz * mz * cov_xy;

    let (root, iterations, status) = newton_root(a0, a1, a2);

    let system = Matrix2::new(m.mxx - root, m.mxy, m.mxy, m.myy - root);
    let Some(inv) = system.try_inverse() else {
        tracing::trace!(n, root, "pratt fit: singular center system");
        return degenerate(mean, iterations);
    };
    let c = inv * Vector2::new(m.mxz, m.myz) * 0.5;
    let r = (c.x * c.x + c.y * c.y + mz + 2.0 * root).sqrt();
    if !r.is_finite() || !c.x.is_finite() || !c.y.is_finite() || r >= DEGENERATE_RADIUS {
        tracing::trace!(n, root, "pratt fit: non-finite closed form");
        return degenerate(mean, iterations);
    }

    PrattFit {
        circle: Circle {
            cx: c.x + mean[0],
            cy: c.y + mean[1],
            r,
        },
        iterations,
        status,
    }
}

/// Convenience wrapper returning only the circle.
pub fn fit_circle(points: &[[f64; 2]]) -> Circle {
    fit_circle_pratt(points).circle
}

fn degenerate(center: [f64; 2], iterations: usize) -> PrattFit {
    PrattFit {
        circle: Circle::new(center, DEGENERATE_RADIUS),
        iterations,
        status: FitStatus::Degenerate,
    }
}

/// Newton iteration on `A0 + x (A1 + x (A2 + 4 x^2))` from `x = 0`.
///
/// Returns the root, the number of iterations and the outcome. Every abort
/// path resets the root to zero.
fn newton_root(a0: f64, a1: f64, a2: f64) -> (f64, usize, FitStatus) {
    let a22 = a2 + a2;
    let mut x = 0.0f64;
    let mut y = f64::INFINITY;

    for iter in 1..=NEWTON_MAX_ITERS {
        let y_old = y;
        y = a0 + x * (a1 + x * (a2 + 4.0 * x * x));
        if y.abs() > y_old.abs() {
            tracing::trace!(iter, "pratt fit: residual grew, resetting root");
            return (0.0, iter, FitStatus::RootReset(RootReset::Diverged));
        }
        if y == 0.0 {
            return (x, iter, FitStatus::Converged);
        }

        let dy = a1 + x * (a22 + 16.0 * x * x);
        let x_old = x;
        x = x_old - y / dy;
        if !x.is_finite() {
            tracing::trace!(iter, "pratt fit: non-finite newton step");
            return (0.0, iter, FitStatus::RootReset(RootReset::Diverged));
        }
        if x < 0.0 {
            tracing::trace!(iter, x, "pratt fit: negative root");
            return (0.0, iter, FitStatus::RootReset(RootReset::NegativeRoot));
        }
        if (x - x_old).abs() <= NEWTON_REL_TOL * x.abs() {
            return (x, iter, FitStatus::Converged);
        }
    }

    tracing::trace!("pratt fit: newton did not converge");
    (
        0.0,
        NEWTON_MAX_ITERS,
        FitStatus::RootReset(RootReset::NotConverged),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newton_on_zero_polynomial_converges_at_origin() {
        let (x, iters, status) = newton_root(0.0, 1.0, -1.0);
        assert_eq!(x, 0.0);
        assert_eq!(iters, 1);
        assert_eq!(status, FitStatus::Converged);
    }

    #[test]
    fn newton_finds_small_positive_root() {
        // 1 - 10x + 4x^4 has a root just above 0.1.
        let (x, iters, status) = newton_root(1.0, -10.0, 0.0);
        assert_eq!(status, FitStatus::Converged);
        assert!(x > 0.1 && x < 0.101, "root {x}");
        assert!(iters < NEWTON_MAX_ITERS);
        let y = 1.0 - 10.0 * x + 4.0 * x.powi(4);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn newton_resets_negative_root() {
        // First step from zero lands at x = -3.
        let (x, _, status) = newton_root(-3.0, -1.0, 0.0);
        assert_eq!(x, 0.0);
        assert_eq!(status, FitStatus::RootReset(RootReset::NegativeRoot));
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let mut pts = Circle::new([10.0, 20.0], 5.0).sample_points(24);
        pts.push([f64::NAN, 1.0]);
        pts.push([1.0, f64::INFINITY]);
        let fit = fit_circle_pratt(&pts);
        assert!((fit.circle.cx - 10.0).abs() < 1e-6);
        assert!((fit.circle.cy - 20.0).abs() < 1e-6);
        assert!((fit.circle.r - 5.0).abs() < 1e-6);
    }
}
