//! Binary mask preparation: binarize, fix polarity, clean, and seed.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

use crate::region::Region;

const FG: u8 = 255;
const BG: u8 = 0;

/// Configuration for turning a raw segmentation map into a clean mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Pixels with value `>= threshold` are foreground.
    pub threshold: u8,
    /// Threshold used when the first pass yields almost no foreground.
    pub fallback_threshold: u8,
    /// Foreground mean (0-255 scale) at or below which the fallback
    /// threshold is applied.
    pub min_foreground_mean: f64,
    /// Invert the mask when its foreground mean exceeds this value.
    pub invert_above_mean: Option<f64>,
    /// Components smaller than this many pixels are discarded.
    pub min_component_area: usize,
    /// Keep only the largest surviving 8-connected component.
    pub keep_largest: bool,
    /// Fill background regions that do not touch the image border.
    pub fill_holes: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            threshold: 128,
            fallback_threshold: 1,
            min_foreground_mean: 10.0,
            invert_above_mean: Some(175.0),
            min_component_area: 100,
            keep_largest: true,
            fill_holes: true,
        }
    }
}

impl MaskConfig {
    /// Preset for zona masks: any non-zero value is foreground, no polarity
    /// flip, and the annulus interior is left open.
    pub fn zona() -> Self {
        Self {
            threshold: 1,
            invert_above_mean: None,
            fill_holes: false,
            ..Self::default()
        }
    }
}

/// Two-level mask stored as a `GrayImage` holding only 0 and 255.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    img: GrayImage,
}

/// Centre and size estimate derived from a mask's foreground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskSeed {
    /// Foreground centroid.
    pub center: [f64; 2],
    /// Largest distance between two outer-border pixels.
    pub feret_diameter: f64,
    /// Foreground pixel count.
    pub area: usize,
}

impl BinaryMask {
    /// Foreground where `img >= threshold`.
    pub fn from_threshold(img: &GrayImage, threshold: u8) -> Self {
        let mut out = GrayImage::new(img.width(), img.height());
        for (dst, src) in out.pixels_mut().zip(img.pixels()) {
            dst[0] = if src[0] >= threshold { FG } else { BG };
        }
        Self { img: out }
    }

    /// Treat every non-zero pixel as foreground.
    pub fn from_nonzero(img: &GrayImage) -> Self {
        Self::from_threshold(img, 1)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    /// The mask as a 0/255 image, suitable for strip sampling.
    pub fn as_image(&self) -> &GrayImage {
        &self.img
    }

    /// Foreground test for an integer pixel; out of range is background.
    #[inline]
    pub fn is_foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return false;
        }
        self.img.get_pixel(x as u32, y as u32)[0] == FG
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> usize {
        self.img.pixels().filter(|p| p[0] == FG).count()
    }

    /// Mean pixel value on the 0-255 scale.
    pub fn foreground_mean(&self) -> f64 {
        let n = self.width() as usize * self.height() as usize;
        if n == 0 {
            return 0.0;
        }
        self.area() as f64 * FG as f64 / n as f64
    }

    pub fn invert(&mut self) {
        for p in self.img.pixels_mut() {
            p[0] = if p[0] == FG { BG } else { FG };
        }
    }

    /// Drop 8-connected components smaller than `min_area`; with
    /// `keep_largest` only the biggest survivor remains.
    pub fn keep_components(&mut self, min_area: usize, keep_largest: bool) {
        let labels = connected_components(&self.img, Connectivity::Eight, Luma([BG]));
        let mut areas: Vec<usize> = Vec::new();
        for (_, _, label) in labels.enumerate_pixels() {
            let l = label[0] as usize;
            if l == 0 {
                continue;
            }
            if l >= areas.len() {
                areas.resize(l + 1, 0);
            }
            areas[l] += 1;
        }

        let largest = areas
            .iter()
            .enumerate()
            .filter(|(_, a)| **a >= min_area && **a > 0)
            .max_by_key(|(_, a)| **a)
            .map(|(l, _)| l);
        let keep = |l: usize| -> bool {
            if l == 0 || areas[l] < min_area {
                return false;
            }
            !keep_largest || Some(l) == largest
        };

        for (dst, label) in self.img.pixels_mut().zip(labels.pixels()) {
            dst[0] = if keep(label[0] as usize) { FG } else { BG };
        }
    }

    /// Turn background regions that do not reach the image border into
    /// foreground.
    pub fn fill_holes(&mut self) {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let mut complement = self.clone();
        complement.invert();
        let labels = connected_components(&complement.img, Connectivity::Four, Luma([BG]));

        let mut touches_border = vec![false; 1];
        for (x, y, label) in labels.enumerate_pixels() {
            let l = label[0] as usize;
            if l >= touches_border.len() {
                touches_border.resize(l + 1, false);
            }
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                touches_border[l] = true;
            }
        }

        for (dst, label) in self.img.pixels_mut().zip(labels.pixels()) {
            let l = label[0] as usize;
            if l != 0 && !touches_border[l] {
                dst[0] = FG;
            }
        }
    }

    /// Mean position of the foreground pixels.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        let (mut sx, mut sy, mut n) = (0.0f64, 0.0f64, 0usize);
        for (x, y, p) in self.img.enumerate_pixels() {
            if p[0] == FG {
                sx += x as f64;
                sy += y as f64;
                n += 1;
            }
        }
        (n > 0).then(|| [sx / n as f64, sy / n as f64])
    }

    /// Largest distance between two pixels of the outer borders.
    pub fn feret_diameter(&self) -> f64 {
        let border: Vec<Point<i32>> = find_contours::<i32>(&self.img)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .flat_map(|c| c.points)
            .collect();
        if border.len() < 2 {
            return 0.0;
        }
        let hull = convex_hull(&border[..]);
        let mut best = 0.0f64;
        for (i, a) in hull.iter().enumerate() {
            for b in &hull[i + 1..] {
                let dx = (a.x - b.x) as f64;
                let dy = (a.y - b.y) as f64;
                best = best.max((dx * dx + dy * dy).sqrt());
            }
        }
        best
    }

    /// Centroid, Feret diameter and area of the foreground, if any.
    pub fn seed(&self) -> Option<MaskSeed> {
        let center = self.centroid()?;
        Some(MaskSeed {
            center,
            feret_diameter: self.feret_diameter(),
            area: self.area(),
        })
    }
}

impl Region for BinaryMask {
    /// Nearest-pixel lookup; points outside the image are outside the region.
    fn contains(&self, p: [f64; 2]) -> bool {
        if !p[0].is_finite() || !p[1].is_finite() {
            return false;
        }
        self.is_foreground(p[0].round() as i64, p[1].round() as i64)
    }
}

/// Binarize, fix polarity, and clean a raw segmentation map.
pub fn prepare_mask(raw: &GrayImage, cfg: &MaskConfig) -> BinaryMask {
    let mut mask = BinaryMask::from_threshold(raw, cfg.threshold);
    let mean = mask.foreground_mean();
    if mean <= cfg.min_foreground_mean {
        tracing::debug!(
            mean,
            threshold = cfg.fallback_threshold,
            "mask nearly empty, re-thresholding"
        );
        mask = BinaryMask::from_threshold(raw, cfg.fallback_threshold);
    }

    if let Some(limit) = cfg.invert_above_mean {
        let mean = mask.foreground_mean();
        if mean > limit {
            tracing::debug!(mean, limit, "mask polarity inverted");
            mask.invert();
        }
    }

    mask.keep_components(cfg.min_component_area, cfg.keep_largest);
    if cfg.fill_holes {
        mask.fill_holes();
    }
    mask
}
