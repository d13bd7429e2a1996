// =============================================================================
// Historical Volatility — mean absolute bar-to-bar return
// =============================================================================
//
//   r_t = |close_t - close_{t-1}| / close_{t-1} * 100
//   HV  = mean(r_t), clamped to [0, 5] percent
//
// The clamp keeps one pathological bar (a bad tick, a relisting) from pushing
// the volatility layer outside its scoring band forever.
// =============================================================================

/// Returned when fewer than two usable closes exist.
pub const DEFAULT_VOLATILITY_PCT: f64 = 1.0;

/// Upper clamp of the volatility reading, in percent.
pub const MAX_VOLATILITY_PCT: f64 = 5.0;

/// Mean absolute percent return of consecutive closes, in `[0, 5]`.
///
/// Bars whose previous close is zero are skipped.  If no bar survives (or the
/// input is shorter than two points) the documented default of 1.0 is
/// returned.
pub fn historical_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return DEFAULT_VOLATILITY_PCT;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| ((w[1] - w[0]) / w[0]).abs() * 100.0)
        .filter(|r| r.is_finite())
        .collect();

    if returns.is_empty() {
        return DEFAULT_VOLATILITY_PCT;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    mean.clamp(0.0, MAX_VOLATILITY_PCT)
}
