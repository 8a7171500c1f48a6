//! Intensity preparation for the cortex refinement search.
//!
//! The cortex shows up as a dark band. Inverting the slice turns it into a
//! ridge, and blending in the clamped directional gradients sharpens its
//! inner flank so the local-maximum search lands on the membrane instead of
//! the bright cytoplasm next to it.

use image::{GrayImage, Luma};
use imageproc::filter::filter3x3;

/// Right-minus-left difference, summed over three rows.
const X_GRADIENT: [i32; 9] = [-1, 0, 1, -1, 0, 1, -1, 0, 1];
/// Bottom-minus-top difference, summed over three columns.
const Y_GRADIENT: [i32; 9] = [-1, -1, -1, 0, 0, 0, 1, 1, 1];

/// Invert `img` and blend in its edge response.
///
/// Each output pixel is `inverted / 4 + 3 * edges / 4`, where `edges` is the
/// sum of both gradient responses of the inverted image, each clamped to
/// `0..=255` before summing and clamped again after.
pub fn enhance_dark_edges(img: &GrayImage) -> GrayImage {
    let inverted = GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([255 - img.get_pixel(x, y)[0]])
    });
    let gx: GrayImage = filter3x3::<_, i32, u8>(&inverted, &X_GRADIENT);
    let gy: GrayImage = filter3x3::<_, i32, u8>(&inverted, &Y_GRADIENT);

    let mut out = inverted;
    for ((p, a), b) in out.pixels_mut().zip(gx.pixels()).zip(gy.pixels()) {
        let edges = (a[0] as f64 + b[0] as f64).min(255.0);
        let v = 0.25 * p[0] as f64 + 0.75 * edges;
        p[0] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_ring_image;

    #[test]
    fn flat_image_is_inverted_and_quartered() {
        let img = GrayImage::from_pixel(8, 8, Luma([55]));
        let out = enhance_dark_edges(&img);
        // inverted 200, no gradient
        assert!(out.pixels().all(|p| p[0] == 50));
    }

    #[test]
    fn dark_band_becomes_the_brightest_response() {
        let img = draw_ring_image(120, 120, [60.0, 60.0], 34.5, 31.5, 30, 200);
        let out = enhance_dark_edges(&img);
        let profile: Vec<u8> = (25..40).map(|x| out.get_pixel(60 + x, 60)[0]).collect();
        let (best, _) = profile
            .iter()
            .enumerate()
            .max_by_key(|(i, v)| (**v, std::cmp::Reverse(*i)))
            .unwrap();
        let d = 25 + best;
        assert!((31..=34).contains(&d), "peak at {d}");
        // bright cytoplasm inside the band stays dim
        assert!(out.get_pixel(60 + 26, 60)[0] < 20);
    }
}
