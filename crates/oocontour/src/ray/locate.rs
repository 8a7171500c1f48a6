//! Single-boundary locator: region exit followed by local-maximum refinement.

use image::GrayImage;

use super::Ray;
use crate::config::RayCastParams;
use crate::region::Region;
use crate::sampling::StripSampler;

/// Boundary point found along one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedPoint {
    /// Point in image coordinates.
    pub point: [f64; 2],
    /// Distance from the ray origin.
    pub t: f64,
    /// True when the local-maximum search moved the point off the coarse exit.
    pub refined: bool,
}

/// Locate the boundary of `inside` along `ray`, snapped to the brightest
/// strip sample nearby.
///
/// Returns `None` when the ray starts outside the region or never leaves it.
pub fn locate_boundary<R: Region + ?Sized>(
    image: &GrayImage,
    inside: &R,
    ray: &Ray,
    params: &RayCastParams,
) -> Option<LocatedPoint> {
    let t_exit = coarse_exit(inside, ray, params.coarse_step_px)?;
    let coarse = LocatedPoint {
        point: ray.point_at(t_exit),
        t: t_exit,
        refined: false,
    };

    let half = (ray.length * params.reach_proportion).floor();
    if !(half >= 1.0) {
        return Some(coarse);
    }
    let half = half as usize;

    let n = ray.n_samples();
    let step = ray.sample_step();
    let center = ((t_exit / step).round() as usize).min(n - 1);
    let lo = center.saturating_sub(half);
    let hi = (center + half).min(n - 1);

    let strip = StripSampler::new(image, params.strip_width_px);
    let normal = ray.normal();
    let mut best: Option<(usize, f64)> = None;
    for j in lo..=hi {
        let v = strip.sample(ray.point_at(j as f64 * step), normal);
        if v > 0.0 && best.map_or(true, |(_, b)| v > b) {
            best = Some((j, v));
        }
    }

    Some(match best {
        Some((j, _)) => {
            let t = j as f64 * step;
            LocatedPoint {
                point: ray.point_at(t),
                t,
                refined: true,
            }
        }
        None => coarse,
    })
}

/// First distance at which the ray leaves `inside`, stepping by `step`.
fn coarse_exit<R: Region + ?Sized>(inside: &R, ray: &Ray, step: f64) -> Option<f64> {
    if !(step > 0.0) || !inside.contains(ray.origin) {
        return None;
    }
    let n_steps = (ray.length / step).floor() as usize;
    (1..=n_steps)
        .map(|k| k as f64 * step)
        .find(|&t| !inside.contains(ray.point_at(t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::Circle;
    use crate::mask::BinaryMask;
    use crate::test_utils::{draw_disk_mask, draw_ridge_image};
    use approx::assert_abs_diff_eq;

    fn disk_mask() -> BinaryMask {
        BinaryMask::from_nonzero(&draw_disk_mask(100, 100, [50.0, 50.0], 30.0, 255))
    }

    #[test]
    fn coarse_exit_without_refinement() {
        let mask = disk_mask();
        let img = GrayImage::new(100, 100);
        let ray = Ray::from_angle([50.0, 50.0], 0.0, 42.0);
        let hit = locate_boundary(&img, &mask, &ray, &RayCastParams::default()).unwrap();
        assert!(!hit.refined);
        assert_abs_diff_eq!(hit.t, 30.5, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.point[0], 80.5, epsilon = 1e-9);
    }

    #[test]
    fn refinement_snaps_to_intensity_ridge() {
        let mask = disk_mask();
        let img = draw_ridge_image(100, 100, [50.0, 50.0], 33.0);
        let params = RayCastParams {
            reach_proportion: 0.05,
            strip_width_px: 1.0,
            ..RayCastParams::default()
        };
        let ray = Ray::from_angle([50.0, 50.0], 0.0, 100.0);
        let hit = locate_boundary(&img, &mask, &ray, &params).unwrap();
        assert!(hit.refined);
        assert!((hit.t - 33.0).abs() <= 0.5, "t = {}", hit.t);
    }

    #[test]
    fn dark_window_keeps_coarse_point() {
        let mask = disk_mask();
        let img = GrayImage::new(100, 100);
        let params = RayCastParams {
            reach_proportion: 0.05,
            ..RayCastParams::default()
        };
        let ray = Ray::from_angle([50.0, 50.0], 0.0, 100.0);
        let hit = locate_boundary(&img, &mask, &ray, &params).unwrap();
        assert!(!hit.refined);
        assert_abs_diff_eq!(hit.t, 30.5, epsilon = 1e-9);
    }

    #[test]
    fn unresolved_when_ray_never_exits_or_starts_outside() {
        let img = GrayImage::new(100, 100);
        let big = Circle::new([50.0, 50.0], 80.0);
        let ray = Ray::from_angle([50.0, 50.0], 1.0, 20.0);
        assert!(locate_boundary(&img, &big, &ray, &RayCastParams::default()).is_none());

        let small = Circle::new([0.0, 0.0], 5.0);
        assert!(locate_boundary(&img, &small, &ray, &RayCastParams::default()).is_none());
    }

    #[test]
    fn polygon_region_drives_exit() {
        let img = GrayImage::new(100, 100);
        let square = vec![[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0]];
        let ray = Ray::from_angle([50.0, 50.0], 0.0, 30.0);
        let hit = locate_boundary(&img, &square[..], &ray, &RayCastParams::default()).unwrap();
        assert_abs_diff_eq!(hit.t, 10.0, epsilon = 1e-9);
    }
}
