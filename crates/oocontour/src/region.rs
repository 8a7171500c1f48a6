//! Inside tests used as the reference shape when casting rays.

use crate::circle::Circle;

/// A planar region that can answer point membership.
pub trait Region {
    /// True when `p` (image pixel coordinates) lies inside the region.
    fn contains(&self, p: [f64; 2]) -> bool;
}

impl<R: Region + ?Sized> Region for &R {
    fn contains(&self, p: [f64; 2]) -> bool {
        (**self).contains(p)
    }
}

impl Region for Circle {
    fn contains(&self, p: [f64; 2]) -> bool {
        self.radial_residual(p) <= 0.0
    }
}

impl Region for [[f64; 2]] {
    fn contains(&self, p: [f64; 2]) -> bool {
        polygon_contains(self, p)
    }
}

impl Region for Vec<[f64; 2]> {
    fn contains(&self, p: [f64; 2]) -> bool {
        polygon_contains(self, p)
    }
}

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
pub fn polygon_contains(poly: &[[f64; 2]], p: [f64; 2]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let (px, py) = (p[0], p[1]);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = poly[i];
        let [xj, yj] = poly[j];
        if (yi > py) != (yj > py) {
            let x_cross = xi + (py - yi) * (xj - xi) / (yj - yi);
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
    }

    #[test]
    fn polygon_even_odd() {
        let sq = square();
        assert!(polygon_contains(&sq, [5.0, 5.0]));
        assert!(!polygon_contains(&sq, [15.0, 5.0]));
        assert!(!polygon_contains(&sq, [5.0, -0.1]));

        // Reversed winding answers the same.
        let rev: Vec<[f64; 2]> = sq.iter().rev().copied().collect();
        assert!(Region::contains(&rev, [5.0, 5.0]));
        assert!(!Region::contains(&rev, [-1.0, 5.0]));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!polygon_contains(&[[0.0, 0.0], [1.0, 1.0]], [0.5, 0.5]));
    }

    #[test]
    fn circle_region_includes_boundary() {
        let c = Circle::new([0.0, 0.0], 2.0);
        assert!(c.contains([2.0, 0.0]));
        assert!(c.contains([1.0, 1.0]));
        assert!(!c.contains([2.0, 0.1]));
    }

    #[test]
    fn references_forward_membership() {
        fn holds_unit_point<R: Region>(r: R) -> bool {
            r.contains([1.0, 1.0])
        }
        let sq = square();
        let r: &dyn Region = &sq;
        assert!(holds_unit_point(r));
        assert!(!holds_unit_point(&Circle::new([5.0, 5.0], 1.0)));
    }
}
