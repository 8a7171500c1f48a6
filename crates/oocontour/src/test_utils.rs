//! Synthetic slices for unit tests: radially symmetric renders around a
//! centre, plus a blurred ridge for the refinement tests.

use image::{GrayImage, Luma};

/// Render `w × h` pixels whose value depends only on the distance to
/// `center`.
pub(crate) fn render_radial(
    w: u32,
    h: u32,
    center: [f64; 2],
    value_at: impl Fn(f64) -> u8,
) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let d = (x as f64 - center[0]).hypot(y as f64 - center[1]);
        Luma([value_at(d)])
    })
}

/// Filled disk of `value` on a zero background.
pub(crate) fn draw_disk_mask(w: u32, h: u32, center: [f64; 2], radius: f64, value: u8) -> GrayImage {
    render_radial(w, h, center, |d| if d <= radius { value } else { 0 })
}

/// Band `inner..=outer` filled with `band`, everything else `bg`.
pub(crate) fn draw_ring_image(
    w: u32,
    h: u32,
    center: [f64; 2],
    outer: f64,
    inner: f64,
    band: u8,
    bg: u8,
) -> GrayImage {
    render_radial(w, h, center, |d| {
        if (inner..=outer).contains(&d) {
            band
        } else {
            bg
        }
    })
}

/// Bright thin ring on a dark background, blurred so its ridge sits at
/// `radius`.
pub(crate) fn draw_ridge_image(w: u32, h: u32, center: [f64; 2], radius: f64) -> GrayImage {
    let ring = draw_ring_image(w, h, center, radius + 1.0, radius - 1.0, 220, 20);
    imageproc::filter::gaussian_blur_f32(&ring, 1.5)
}
