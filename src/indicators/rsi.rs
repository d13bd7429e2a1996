// =============================================================================
// Relative Strength Index (RSI) — windowed averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Take the last `period` deltas of consecutive closes.
// Step 2 — avg_gain = sum(positive deltas) / period
//          avg_loss = sum(|negative deltas|) / period
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// No loss in the window pins RSI at 100; too little data yields a neutral 50.
// =============================================================================

/// Default look-back used when a caller does not specify one.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Neutral value returned when fewer than `period + 1` closes are available.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Compute the RSI of the most recent `period` deltas of `closes`.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => 50.0
/// - average loss exactly zero => 100.0 (including a perfectly flat window)
/// - non-finite arithmetic => 50.0
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let window = &closes[closes.len() - period - 1..];
    let (sum_gain, sum_loss) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0_f64, 0.0_f64), |(g, l), d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });

    let period_f = period as f64;
    let avg_gain = sum_gain / period_f;
    let avg_loss = sum_loss / period_f;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let value = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        NEUTRAL_RSI
    }
}
