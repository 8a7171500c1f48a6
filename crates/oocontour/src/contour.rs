//! Closed contours: assembly from a radius ring and polygon geometry.

use serde::{Deserialize, Serialize};

use crate::ray::ring_angle;
use crate::region::{polygon_contains, Region};

/// Which structure a contour outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContourRole {
    #[serde(rename = "cortex")]
    Cortex,
    #[serde(rename = "zp-inner")]
    ZonaInner,
    #[serde(rename = "zp-outer")]
    ZonaOuter,
}

impl ContourRole {
    /// Display name of a contour with this role on a 1-based `slice`.
    pub fn name(self, slice: u32) -> String {
        match self {
            ContourRole::Cortex => format!("cortex_{}", slice),
            ContourRole::ZonaInner => format!("zp_{}-in", slice),
            ContourRole::ZonaOuter => format!("zp_{}-out", slice),
        }
    }
}

/// Closed polygon outlining one structure on one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// 1-based slice index.
    pub slice: u32,
    pub role: ContourRole,
    pub name: String,
    /// Vertices in angle order; the last vertex connects back to the first.
    pub points: Vec<[f64; 2]>,
}

impl Contour {
    pub fn new(slice: u32, role: ContourRole, points: Vec<[f64; 2]>) -> Self {
        Self {
            slice,
            role,
            name: role.name(slice),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Absolute polygon area (shoelace).
    pub fn area(&self) -> f64 {
        polygon_signed_area(&self.points).abs()
    }

    /// Area centroid; the vertex mean for polygons with (near) zero area.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        polygon_centroid(&self.points)
    }

    /// Length of the closed outline.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| distance(self.points[i], self.points[(i + 1) % n]))
            .sum()
    }

    /// Largest distance between two vertices.
    pub fn feret_diameter(&self) -> f64 {
        let mut best = 0.0f64;
        for (i, &a) in self.points.iter().enumerate() {
            for &b in &self.points[i + 1..] {
                best = best.max(distance(a, b));
            }
        }
        best
    }

    /// Mean vertex distance from `center`.
    pub fn mean_radius(&self, center: [f64; 2]) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|&p| distance(p, center)).sum::<f64>() / self.points.len() as f64
    }

    /// Population standard deviation of the vertex distances from `center`.
    pub fn radius_std(&self, center: [f64; 2]) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let mean = self.mean_radius(center);
        let var = self
            .points
            .iter()
            .map(|&p| (distance(p, center) - mean).powi(2))
            .sum::<f64>()
            / self.points.len() as f64;
        var.sqrt()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl Region for Contour {
    fn contains(&self, p: [f64; 2]) -> bool {
        polygon_contains(&self.points, p)
    }
}

/// Place `radii[j]` at angle `j · 2π / n` around `center`.
pub fn ring_points(center: [f64; 2], radii: &[f64]) -> Vec<[f64; 2]> {
    let n = radii.len();
    radii
        .iter()
        .enumerate()
        .map(|(j, &r)| {
            let a = ring_angle(j, n);
            [center[0] + r * a.cos(), center[1] + r * a.sin()]
        })
        .collect()
}

/// Build the closed contour for `role` on `slice` from a repaired radius
/// ring.
pub fn assemble_contour(center: [f64; 2], radii: &[f64], slice: u32, role: ContourRole) -> Contour {
    Contour::new(slice, role, ring_points(center, radii))
}

#[inline]
pub(crate) fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Signed shoelace area; positive for counter-clockwise vertices in a
/// y-up frame.
pub fn polygon_signed_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i][0] * points[j][1] - points[j][0] * points[i][1]
        })
        .sum::<f64>()
        / 2.0
}

/// Area centroid of a closed polygon, falling back to the vertex mean.
pub fn polygon_centroid(points: &[[f64; 2]]) -> Option<[f64; 2]> {
    let n = points.len();
    if n == 0 {
        return None;
    }
    let a = polygon_signed_area(points);
    if a.abs() > 1e-12 {
        let (mut cx, mut cy) = (0.0f64, 0.0f64);
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let cross = p[0] * q[1] - q[0] * p[1];
            cx += (p[0] + q[0]) * cross;
            cy += (p[1] + q[1]) * cross;
        }
        return Some([cx / (6.0 * a), cy / (6.0 * a)]);
    }
    let sx: f64 = points.iter().map(|p| p[0]).sum();
    let sy: f64 = points.iter().map(|p| p[1]).sum();
    Some([sx / n as f64, sy / n as f64])
}
