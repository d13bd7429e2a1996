// =============================================================================
// Volume helpers — window means and the recent/base volume ratio
// =============================================================================

/// Bars in the "recent" volume window.
pub const RECENT_VOLUME_BARS: usize = 3;

/// Bars in the baseline volume window.
pub const BASE_VOLUME_BARS: usize = 20;

/// Mean of the last `n` values, or of every value when fewer exist.
///
/// Returns `None` for an empty slice or `n == 0`.
pub fn mean_tail(values: &[f64], n: usize) -> Option<f64> {
    if values.is_empty() || n == 0 {
        return None;
    }
    let window = &values[values.len().saturating_sub(n)..];
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

/// Ratio of the recent average volume to the baseline average volume.
///
/// A zero (or missing) baseline yields 0.0 so that dead markets never look
/// like volume spikes.
pub fn volume_ratio(volumes: &[f64], recent: usize, base: usize) -> f64 {
    match (mean_tail(volumes, recent), mean_tail(volumes, base)) {
        (Some(r), Some(b)) if b > 0.0 && r.is_finite() && b.is_finite() => r / b,
        _ => 0.0,
    }
}
