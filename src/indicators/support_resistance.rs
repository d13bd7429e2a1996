// =============================================================================
// Support / Resistance — local-extrema level detection
// =============================================================================
//
// Scans the interior bars of a look-back window with a 3-point comparison:
//
//   support candidate    : low[i]  <= low[i-1]  && low[i]  <= low[i+1]
//   resistance candidate : high[i] >= high[i-1] && high[i] >= high[i+1]
//
// Supports must sit strictly below the current price and resistances strictly
// above it.  Candidates of the same kind that fall inside a band of
// `current_price * 1%` of an existing level are merged into it; each merge is
// one more "touch".  Levels come back nearest-first.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Merge band around a level, as a fraction of the current price.
const MERGE_TOLERANCE: f64 = 0.01;

/// Touch count at which a level reaches full strength.
const FULL_STRENGTH_TOUCHES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "support"),
            Self::Resistance => write!(f, "resistance"),
        }
    }
}

/// A detected support or resistance price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalLevel {
    pub price: f64,
    pub kind: LevelKind,
    /// How many extrema were merged into this level (>= 1).
    pub touches: u32,
    /// Reliability in [0, 1], growing with touches.
    pub strength: f64,
}

impl TechnicalLevel {
    fn new(price: f64, kind: LevelKind) -> Self {
        Self {
            price,
            kind,
            touches: 1,
            strength: strength_for(1),
        }
    }

    fn absorb(&mut self, price: f64) {
        let n = f64::from(self.touches);
        self.price = (self.price * n + price) / (n + 1.0);
        self.touches += 1;
        self.strength = strength_for(self.touches);
    }

    /// Distance to `price` as a fraction of `price`.
    pub fn distance_pct(&self, price: f64) -> f64 {
        if price == 0.0 {
            return f64::INFINITY;
        }
        (self.price - price).abs() / price
    }
}

fn strength_for(touches: u32) -> f64 {
    (f64::from(touches) / FULL_STRENGTH_TOUCHES).min(1.0)
}

/// Detect support and resistance levels around `current_price`.
///
/// `highs` and `lows` are parallel series (oldest first); only the last
/// `lookback` bars are scanned.  Returns an empty vec for non-positive prices
/// or when fewer than three bars are available.
pub fn find_support_resistance(
    highs: &[f64],
    lows: &[f64],
    current_price: f64,
    lookback: usize,
) -> Vec<TechnicalLevel> {
    let len = highs.len().min(lows.len());
    if len < 3 || !current_price.is_finite() || current_price <= 0.0 {
        return Vec::new();
    }

    let start = len.saturating_sub(lookback.max(3));
    let highs = &highs[start..len];
    let lows = &lows[start..len];
    let tolerance = current_price * MERGE_TOLERANCE;

    let mut levels: Vec<TechnicalLevel> = Vec::new();

    for i in 1..highs.len() - 1 {
        let low = lows[i];
        if low <= lows[i - 1] && low <= lows[i + 1] && low < current_price {
            merge_level(&mut levels, low, LevelKind::Support, tolerance);
        }

        let high = highs[i];
        if high >= highs[i - 1] && high >= highs[i + 1] && high > current_price {
            merge_level(&mut levels, high, LevelKind::Resistance, tolerance);
        }
    }

    levels.sort_by(|a, b| {
        (a.price - current_price)
            .abs()
            .total_cmp(&(b.price - current_price).abs())
    });
    levels
}

fn merge_level(levels: &mut Vec<TechnicalLevel>, price: f64, kind: LevelKind, tolerance: f64) {
    if !price.is_finite() {
        return;
    }
    match levels
        .iter_mut()
        .find(|l| l.kind == kind && (l.price - price).abs() <= tolerance)
    {
        Some(level) => level.absorb(price),
        None => levels.push(TechnicalLevel::new(price, kind)),
    }
}

/// Nearest detected level to `current_price`, if any.
pub fn nearest_level(levels: &[TechnicalLevel]) -> Option<&TechnicalLevel> {
    levels.first()
}
