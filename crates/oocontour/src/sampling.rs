//! Strip sampling primitives shared by the ray casters.
//!
//! A strip is a band of fixed width centred on a ray. Sampling the strip at a
//! distance `t` along the ray averages the image across the band, which is
//! what the boundary locators read instead of single pixels.

use image::GrayImage;

/// Sample a grayscale image at sub-pixel position using bilinear interpolation.
///
/// Returns intensity on the raw `[0, 255]` scale, or `None` when `(x, y)`
/// lies outside `[0, w-1] × [0, h-1]`. Samples on the last row or column
/// reuse the edge pixel.
#[inline]
pub fn bilinear_sample_u8_checked(img: &GrayImage, x: f64, y: f64) -> Option<f64> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return None;
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let stride = w as usize;
    let raw = img.as_raw();
    let at = |xx: u32, yy: u32| raw[yy as usize * stride + xx as usize] as f64;
    let p00 = at(x0, y0);
    let p10 = at(x1, y0);
    let p01 = at(x0, y1);
    let p11 = at(x1, y1);

    Some(
        (1.0 - fx) * (1.0 - fy) * p00
            + fx * (1.0 - fy) * p10
            + (1.0 - fx) * fy * p01
            + fx * fy * p11,
    )
}

/// Sample a grayscale image at sub-pixel position; out-of-bounds reads as 0.
#[inline]
pub fn bilinear_sample_u8(img: &GrayImage, x: f64, y: f64) -> f64 {
    bilinear_sample_u8_checked(img, x, y).unwrap_or(0.0)
}

/// Averages an image across a band of fixed width around a ray.
#[derive(Clone, Copy)]
pub struct StripSampler<'a> {
    img: &'a GrayImage,
    taps: usize,
}

impl<'a> StripSampler<'a> {
    /// Create a sampler whose band spans `width_px` pixels (at least one tap).
    pub fn new(img: &'a GrayImage, width_px: f64) -> Self {
        let taps = if width_px.is_finite() && width_px >= 1.0 {
            width_px.round() as usize
        } else {
            1
        };
        Self { img, taps }
    }

    /// Number of samples taken across the band.
    #[inline]
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Mean intensity across the band centred on `p`.
    ///
    /// Taps are spaced one pixel apart along the unit vector `normal`.
    /// Out-of-bounds taps count as zero and still enter the denominator.
    pub fn sample(&self, p: [f64; 2], normal: [f64; 2]) -> f64 {
        let half = (self.taps as f64 - 1.0) * 0.5;
        let mut sum = 0.0;
        for k in 0..self.taps {
            let s = k as f64 - half;
            sum += bilinear_sample_u8(self.img, p[0] + s * normal[0], p[1] + s * normal[1]);
        }
        sum / self.taps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Luma;

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let mut img = GrayImage::new(3, 3);
        img.put_pixel(1, 1, Luma([200]));
        assert_abs_diff_eq!(bilinear_sample_u8(&img, 1.0, 1.0), 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bilinear_sample_u8(&img, 0.5, 1.0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bilinear_sample_u8(&img, 1.5, 1.5), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn bilinear_reads_last_row_and_column() {
        let img = GrayImage::from_pixel(4, 4, Luma([80]));
        assert_eq!(bilinear_sample_u8_checked(&img, 3.0, 3.0), Some(80.0));
        assert_eq!(bilinear_sample_u8_checked(&img, 3.01, 1.0), None);
        assert_eq!(bilinear_sample_u8_checked(&img, -0.01, 1.0), None);
    }

    #[test]
    fn strip_counts_outside_taps_as_zero() {
        let img = GrayImage::from_pixel(10, 10, Luma([255]));
        let strip = StripSampler::new(&img, 5.0);
        assert_eq!(strip.taps(), 5);
        assert_abs_diff_eq!(strip.sample([5.0, 5.0], [0.0, 1.0]), 255.0, epsilon = 1e-9);
        // Taps at y = -2, -1 fall outside.
        assert_abs_diff_eq!(strip.sample([5.0, 0.0], [0.0, 1.0]), 153.0, epsilon = 1e-9);
    }

    #[test]
    fn strip_width_below_one_uses_single_tap() {
        let img = GrayImage::from_pixel(4, 4, Luma([10]));
        let strip = StripSampler::new(&img, 0.2);
        assert_eq!(strip.taps(), 1);
        assert_abs_diff_eq!(strip.sample([1.0, 1.0], [1.0, 0.0]), 10.0, epsilon = 1e-9);
    }
}
