//! Circle fitting primitives.
//!
//! Implements:
//! - Pratt algebraic circle fit with a Newton root search (Chernov's variant).
//! - Radial projection of points onto a fitted circle.

mod fit;
mod types;

pub use fit::{fit_circle, fit_circle_pratt};
pub use types::{Circle, FitStatus, PrattFit, RootReset, DEGENERATE_RADIUS};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn make_test_circle() -> Circle {
        Circle::new([100.0, 80.0], 30.0)
    }

    #[test]
    fn test_exact_circle_recovered() {
        let c = make_test_circle();
        let pts = c.sample_points(50);
        let fit = fit_circle_pratt(&pts);
        assert_relative_eq!(fit.circle.cx, 100.0, epsilon = 1e-6);
        assert_relative_eq!(fit.circle.cy, 80.0, epsilon = 1e-6);
        assert_relative_eq!(fit.circle.r, 30.0, epsilon = 1e-6);
        assert_ne!(fit.status, FitStatus::Degenerate);
    }

    #[test]
    fn test_partial_arc_recovered() {
        let c = make_test_circle();
        let pts: Vec<[f64; 2]> = (0..60)
            .map(|i| c.point_at(1.5 * std::f64::consts::PI * i as f64 / 59.0))
            .collect();
        let fit = fit_circle(&pts);
        assert_relative_eq!(fit.cx, 100.0, epsilon = 1e-6);
        assert_relative_eq!(fit.cy, 80.0, epsilon = 1e-6);
        assert_relative_eq!(fit.r, 30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_noisy_circle() {
        let c = make_test_circle();
        let mut rng = StdRng::seed_from_u64(42);
        let pts: Vec<[f64; 2]> = c
            .sample_points(200)
            .into_iter()
            .map(|[x, y]| [x + rng.gen_range(-0.5..0.5), y + rng.gen_range(-0.5..0.5)])
            .collect();
        let fit = fit_circle_pratt(&pts);
        assert!((fit.circle.cx - 100.0).abs() < 0.5, "cx = {}", fit.circle.cx);
        assert!((fit.circle.cy - 80.0).abs() < 0.5, "cy = {}", fit.circle.cy);
        assert!((fit.circle.r - 30.0).abs() < 0.5, "r = {}", fit.circle.r);
        assert!(!fit.circle.is_degenerate());
    }

    #[test]
    fn test_too_few_points_is_degenerate() {
        let fit = fit_circle_pratt(&[]);
        assert_eq!(fit.status, FitStatus::Degenerate);
        assert_eq!(fit.circle.r, DEGENERATE_RADIUS);

        let fit = fit_circle_pratt(&[[4.0, 6.0], [8.0, 10.0]]);
        assert_eq!(fit.status, FitStatus::Degenerate);
        assert_relative_eq!(fit.circle.cx, 6.0);
        assert_relative_eq!(fit.circle.cy, 8.0);
        assert!(fit.circle.r.is_finite());
    }

    #[test]
    fn test_collinear_points_give_finite_sentinel() {
        for pts in [
            vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
            vec![[0.0, 0.0], [1.0, 0.0], [5.0, 0.0]],
        ] {
            let fit = fit_circle_pratt(&pts);
            assert!(fit.circle.r.is_finite() && fit.circle.r >= 0.0);
            assert!(fit.circle.cx.is_finite() && fit.circle.cy.is_finite());
            assert!(fit.circle.is_degenerate());
        }
    }

    #[test]
    fn test_random_point_sets_stay_finite() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(3..30);
            let pts: Vec<[f64; 2]> = (0..n)
                .map(|_| [rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0)])
                .collect();
            let fit = fit_circle_pratt(&pts);
            assert!(fit.circle.r.is_finite() && fit.circle.r >= 0.0);
            assert!(fit.circle.cx.is_finite() && fit.circle.cy.is_finite());
        }
    }

    #[test]
    fn test_project_radially_lands_on_circle() {
        let c = make_test_circle();
        for p in [[160.0, 80.0], [100.0, 81.0], [50.0, 20.0]] {
            let q = c.project_radially(p);
            assert_relative_eq!(c.radial_residual(q), 0.0, epsilon = 1e-9);
            let a = (p[1] - c.cy).atan2(p[0] - c.cx);
            let b = (q[1] - c.cy).atan2(q[0] - c.cx);
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}
