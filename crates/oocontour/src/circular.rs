//! Statistics and gap repair over rings of per-angle values.
//!
//! A ring stores one value per angle step and wraps around: index `n - 1` is
//! adjacent to index `0`. Radius tables mark unresolved angles with `None`;
//! only finite, strictly positive samples count as valid.

use serde::{Deserialize, Serialize};

/// Gap repair stops widening its window once the half-width exceeds this
/// fraction of the ring length.
pub const REPAIR_MAX_FRACTION: f64 = 0.8;

/// A sample takes part in ring statistics only when finite and positive.
#[inline]
pub fn is_valid(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[inline]
fn valid_sample(s: Option<f64>) -> Option<f64> {
    s.filter(|v| is_valid(*v))
}

/// Mean over the positive elements of `values`; `0.0` when there are none.
pub fn mean_positive(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| is_valid(**v))
        .fold((0.0f64, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Population standard deviation of the positive elements around `mean`;
/// `0.0` when there are none.
pub fn std_positive(values: &[f64], mean: f64) -> f64 {
    let (sum_sq, n) = values
        .iter()
        .filter(|v| is_valid(**v))
        .fold((0.0f64, 0usize), |(s, n), &v| {
            let d = v - mean;
            (s + d * d, n + 1)
        });
    if n == 0 {
        0.0
    } else {
        (sum_sq / n as f64).sqrt()
    }
}

/// Average of `values` at offsets `±1..=±half_width` around `index`, wrapping
/// around the ring.
///
/// With `include_self` the centre sample joins the average with the same
/// weight as each neighbour. With `half_width == 0` and no self sample the
/// value at `index` is returned unchanged.
pub fn circular_window_mean(
    values: &[f64],
    index: usize,
    half_width: usize,
    include_self: bool,
) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let index = index % n;

    let mut sum = if include_self { values[index] } else { 0.0 };
    let mut count = usize::from(include_self);
    for k in 1..=half_width {
        let k = k % n;
        sum += values[(index + k) % n];
        sum += values[(index + n - k) % n];
        count += 2;
    }
    if count == 0 {
        return values[index];
    }
    sum / count as f64
}

/// Mean of the valid samples within `±half_width` of `index`, each ring
/// index counted at most once.
fn window_valid_mean(table: &[Option<f64>], index: usize, half_width: usize) -> Option<f64> {
    let n = table.len();
    let (sum, count) = if 2 * half_width + 1 >= n {
        table
            .iter()
            .filter_map(|s| valid_sample(*s))
            .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1))
    } else {
        (0..=2 * half_width)
            .map(|k| (index + n - half_width + k) % n)
            .filter_map(|i| valid_sample(table[i]))
            .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1))
    };
    (count > 0).then(|| sum / count as f64)
}

/// Resolve the sample at `index` from its valid neighbours.
///
/// Returns the sample itself when it is already valid. Otherwise the valid
/// samples within `±half_width` are averaged; an empty window doubles the
/// half-width and retries. Returns `None` once the half-width exceeds
/// [`REPAIR_MAX_FRACTION`] of the ring, leaving the caller to apply a global
/// fallback.
pub fn repair_gap(table: &[Option<f64>], index: usize, half_width: usize) -> Option<f64> {
    let n = table.len();
    if n == 0 {
        return None;
    }
    let index = index % n;
    if let Some(v) = valid_sample(table[index]) {
        return Some(v);
    }

    let limit = REPAIR_MAX_FRACTION * n as f64;
    let mut hw = half_width.max(1);
    while hw as f64 <= limit {
        if let Some(mean) = window_valid_mean(table, index, hw) {
            return Some(mean);
        }
        hw = hw.saturating_mul(2);
    }
    None
}

/// Counters produced by [`repair_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairStats {
    /// Entries filled from neighbouring samples.
    pub n_gap_filled: usize,
    /// Entries that fell back to the global value.
    pub n_fallback: usize,
}

/// Repair every unresolved entry of `table`.
///
/// Gaps are filled from the raw table only, so repaired values never feed
/// other gaps. Entries that [`repair_gap`] cannot resolve take `fallback`.
pub fn repair_all(table: &[Option<f64>], half_width: usize, fallback: f64) -> (Vec<f64>, RepairStats) {
    let mut stats = RepairStats::default();
    let repaired = (0..table.len())
        .map(|i| {
            if let Some(v) = valid_sample(table[i]) {
                return v;
            }
            match repair_gap(table, i, half_width) {
                Some(v) => {
                    stats.n_gap_filled += 1;
                    v
                }
                None => {
                    stats.n_fallback += 1;
                    fallback
                }
            }
        })
        .collect();
    (repaired, stats)
}

/// Bounds applied by [`clamp_outliers`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampBounds {
    /// Positive-only mean before clamping.
    pub mean: f64,
    /// Positive-only standard deviation before clamping.
    pub std: f64,
    /// Lower clamp bound (`mean - k * std`).
    pub lo: f64,
    /// Upper clamp bound (`mean + k * std`).
    pub hi: f64,
}

/// Clamp every value to `mean ± k_sigma * std` of the positive samples.
///
/// Non-positive values are replaced by the mean first.
pub fn clamp_outliers(values: &mut [f64], k_sigma: f64) -> ClampBounds {
    let mean = mean_positive(values);
    let std = std_positive(values, mean);
    let lo = mean - k_sigma * std;
    let hi = mean + k_sigma * std;
    for v in values.iter_mut() {
        if !is_valid(*v) {
            *v = mean;
        }
        *v = v.clamp(lo, hi);
    }
    ClampBounds { mean, std, lo, hi }
}

/// Circular moving average with the centre sample included.
pub fn smooth(values: &[f64], half_width: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| circular_window_mean(values, i, half_width, true))
        .collect()
}
