// =============================================================================
// Validation Layers — independently scored technical checks
// =============================================================================
//
// Every layer is a pure function of the shared snapshot (and, for the
// confidence gate, an upstream candidate decision) that returns a 0-100
// sub-score with a human-readable reason.  The score is on the layer's own
// scale; the plan applies the external weight.
//
// Layers:
//   EMA                — fast/slow alignment, price above both, separation
//   RSI                — neutral zone preferred, oversold tolerated
//   Volume             — recent 3-bar vs 20-bar average volume
//   SupportResistance  — proximity of the nearest detected level
//   Momentum           — 24h percent change against a minimum
//   Volatility         — historical volatility inside a band
//   Confidence         — upstream candidate confidence against a minimum
//   Trend              — multi-horizon trend condition
// =============================================================================

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::indicators::support_resistance::nearest_level;
use crate::indicators::volume::{BASE_VOLUME_BARS, RECENT_VOLUME_BARS};
use crate::indicators::{
    ema, find_support_resistance, historical_volatility, rsi, volume_ratio,
};
use crate::market_data::MarketSnapshot;
use crate::trend::{self, MarketCondition, TrendHorizons};
use crate::types::Decision;

/// Minimum layer score that counts as a pass.
pub const LAYER_PASS_SCORE: f64 = 60.0;

/// Minimum fast/slow EMA separation (fraction of the slow EMA).
const EMA_MIN_SEPARATION: f64 = 0.005;

// =============================================================================
// Core types
// =============================================================================

/// Atomic output of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerResult {
    pub is_valid: bool,
    /// Sub-score in [0, 100].
    pub score: f64,
    pub reason: String,
}

impl LayerResult {
    /// Result whose validity follows the default pass score.
    pub fn new(score: f64, reason: impl Into<String>) -> Self {
        Self {
            is_valid: score >= LAYER_PASS_SCORE,
            score,
            reason: reason.into(),
        }
    }

    /// Failed result with a zero score.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            score: 0.0,
            reason: reason.into(),
        }
    }
}

/// Inputs shared by every layer in one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct LayerContext<'a> {
    pub snapshot: &'a MarketSnapshot,
    /// Upstream candidate decision, when an analyst proposed one.
    pub candidate: Option<&'a Decision>,
}

impl<'a> LayerContext<'a> {
    pub fn new(snapshot: &'a MarketSnapshot) -> Self {
        Self {
            snapshot,
            candidate: None,
        }
    }

    pub fn with_candidate(mut self, candidate: &'a Decision) -> Self {
        self.candidate = Some(candidate);
        self
    }
}

/// A scoring function the validation plan can run.
///
/// Implementations must be deterministic and free of I/O.  Returning `Err`
/// (or panicking) does not abort the evaluation: the plan records a warning
/// and the layer contributes nothing.
pub trait ValidationLayer: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, ctx: &LayerContext<'_>) -> Result<LayerResult>;
}

// =============================================================================
// Built-in layers
// =============================================================================

/// Built-in layers and their parameters, as plain configuration data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum LayerKind {
    Ema {
        fast_period: usize,
        slow_period: usize,
    },
    Rsi {
        period: usize,
    },
    Volume {
        multiplier: f64,
    },
    SupportResistance {
        /// Proximity tolerance as a fraction of price (0.02 = 2 %).
        tolerance: f64,
        #[serde(default = "default_lookback")]
        lookback: usize,
    },
    Momentum {
        /// Minimum absolute 24h move as a fraction (0.01 = 1 %).
        min_momentum: f64,
    },
    Volatility {
        /// Band bounds in percent.
        min_vol: f64,
        max_vol: f64,
    },
    ConfidenceGate {
        min_confidence: f64,
    },
    Trend {
        #[serde(default)]
        horizons: TrendHorizons,
    },
}

fn default_lookback() -> usize {
    50
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ema { .. } => "EMA",
            Self::Rsi { .. } => "RSI",
            Self::Volume { .. } => "Volume",
            Self::SupportResistance { .. } => "SupportResistance",
            Self::Momentum { .. } => "Momentum",
            Self::Volatility { .. } => "Volatility",
            Self::ConfidenceGate { .. } => "Confidence",
            Self::Trend { .. } => "Trend",
        }
    }

    /// Score this layer against `ctx`.
    pub fn score(&self, ctx: &LayerContext<'_>) -> LayerResult {
        let snapshot = ctx.snapshot;
        match *self {
            Self::Ema {
                fast_period,
                slow_period,
            } => ema_layer(snapshot, fast_period, slow_period),
            Self::Rsi { period } => rsi_layer(snapshot, period),
            Self::Volume { multiplier } => volume_layer(snapshot, multiplier),
            Self::SupportResistance {
                tolerance,
                lookback,
            } => support_resistance_layer(snapshot, tolerance, lookback),
            Self::Momentum { min_momentum } => momentum_layer(snapshot, min_momentum),
            Self::Volatility { min_vol, max_vol } => volatility_layer(snapshot, min_vol, max_vol),
            Self::ConfidenceGate { min_confidence } => {
                confidence_layer(ctx.candidate, min_confidence)
            }
            Self::Trend { horizons } => trend_layer(snapshot, &horizons),
        }
    }
}

impl ValidationLayer for LayerKind {
    fn name(&self) -> &str {
        LayerKind::name(self)
    }

    fn evaluate(&self, ctx: &LayerContext<'_>) -> Result<LayerResult> {
        Ok(self.score(ctx))
    }
}

// =============================================================================
// Scoring functions
// =============================================================================

/// +40 fast above slow, +40 price above both, +20 separation above 0.5 %.
pub fn ema_layer(snapshot: &MarketSnapshot, fast_period: usize, slow_period: usize) -> LayerResult {
    let closes = snapshot.closes();
    let price = snapshot.current_price();
    let fast = ema(closes, fast_period);
    let slow = ema(closes, slow_period);

    let mut score = 0.0;
    let mut notes = Vec::with_capacity(3);

    if fast > slow {
        score += 40.0;
        notes.push("bullish alignment");
    } else {
        notes.push("no bullish alignment");
    }

    if price > fast && price > slow {
        score += 40.0;
        notes.push("price above both EMAs");
    }

    let separation = if slow.abs() > f64::EPSILON {
        (fast - slow).abs() / slow.abs()
    } else {
        0.0
    };
    if separation > EMA_MIN_SEPARATION {
        score += 20.0;
        notes.push("adequate separation");
    }

    LayerResult::new(
        score,
        format!(
            "EMA{fast_period} {fast:.4} vs EMA{slow_period} {slow:.4} ({:.2}% apart): {}",
            separation * 100.0,
            notes.join(", ")
        ),
    )
}

/// 100 neutral [25, 75], 80 oversold (< 25), 20 overbought (> 75).
pub fn rsi_layer(snapshot: &MarketSnapshot, period: usize) -> LayerResult {
    let value = rsi(snapshot.closes(), period);
    let (score, zone) = if value > 75.0 {
        (20.0, "overbought")
    } else if value < 25.0 {
        (80.0, "oversold opportunity")
    } else {
        (100.0, "neutral")
    };
    LayerResult::new(score, format!("RSI{period} {value:.1} ({zone})"))
}

/// 100 for a ratio >= 1.5x multiplier, 80 for >= multiplier, 40 otherwise.
pub fn volume_layer(snapshot: &MarketSnapshot, multiplier: f64) -> LayerResult {
    let Some(volumes) = snapshot.volumes() else {
        return LayerResult::rejected("volume data unavailable");
    };

    let ratio = volume_ratio(volumes, RECENT_VOLUME_BARS, BASE_VOLUME_BARS);
    let score = if ratio >= multiplier * 1.5 {
        100.0
    } else if ratio >= multiplier {
        80.0
    } else {
        40.0
    };
    LayerResult::new(
        score,
        format!("volume ratio {ratio:.2}x (required {multiplier:.2}x)"),
    )
}

/// 100/80/60/30 as the nearest level sits within tol/2, tol, 2*tol or beyond.
pub fn support_resistance_layer(
    snapshot: &MarketSnapshot,
    tolerance: f64,
    lookback: usize,
) -> LayerResult {
    let price = snapshot.current_price();
    let levels = find_support_resistance(snapshot.highs(), snapshot.lows(), price, lookback);

    let Some(nearest) = nearest_level(&levels) else {
        return LayerResult::rejected("no support or resistance level detected");
    };

    let distance = nearest.distance_pct(price);
    let score = if distance <= tolerance / 2.0 {
        100.0
    } else if distance <= tolerance {
        80.0
    } else if distance <= tolerance * 2.0 {
        60.0
    } else {
        30.0
    };
    LayerResult::new(
        score,
        format!(
            "nearest {} {:.4} is {:.2}% away ({} touches)",
            nearest.kind,
            nearest.price,
            distance * 100.0,
            nearest.touches
        ),
    )
}

/// 100 for a move >= 2x minimum, 80 for >= minimum, 40 otherwise.
pub fn momentum_layer(snapshot: &MarketSnapshot, min_momentum: f64) -> LayerResult {
    let change_pct = snapshot.price_change_percent();
    let momentum = change_pct.abs() / 100.0;
    let score = if momentum >= min_momentum * 2.0 {
        100.0
    } else if momentum >= min_momentum {
        80.0
    } else {
        40.0
    };
    LayerResult::new(
        score,
        format!(
            "24h change {change_pct:+.2}% (minimum {:.2}%)",
            min_momentum * 100.0
        ),
    )
}

/// 100 inside [min_vol, max_vol], 60 below, 40 above.
pub fn volatility_layer(snapshot: &MarketSnapshot, min_vol: f64, max_vol: f64) -> LayerResult {
    let vol = historical_volatility(snapshot.closes());
    let (score, band) = if vol < min_vol {
        (60.0, "below band")
    } else if vol > max_vol {
        (40.0, "above band")
    } else {
        (100.0, "within band")
    };
    LayerResult::new(
        score,
        format!("volatility {vol:.2}% {band} [{min_vol:.2}%, {max_vol:.2}%]"),
    )
}

/// Scores an upstream candidate's confidence against `min_confidence`.
///
/// 100 at least 10 points above the minimum, 80 at the minimum, 60 within 10
/// points below it, 20 further below.  Only candidates at or above the
/// minimum pass.
pub fn confidence_layer(candidate: Option<&Decision>, min_confidence: f64) -> LayerResult {
    let Some(decision) = candidate else {
        return LayerResult::rejected("no upstream decision to gate");
    };

    let c = decision.confidence.clamp(0.0, 100.0);
    let score = if c >= min_confidence + 10.0 {
        100.0
    } else if c >= min_confidence {
        80.0
    } else if c >= min_confidence - 10.0 {
        60.0
    } else {
        20.0
    };
    LayerResult {
        is_valid: c >= min_confidence,
        score,
        reason: format!(
            "{} candidate confidence {c:.1}% (minimum {min_confidence:.1}%)",
            decision.action
        ),
    }
}

/// 100 strong uptrend, 80 moderate uptrend, 50 sideways, 20 bear market.
pub fn trend_layer(snapshot: &MarketSnapshot, horizons: &TrendHorizons) -> LayerResult {
    let analysis = trend::analyze(snapshot, horizons);
    let condition = analysis.market_condition();

    let (score, label) = if analysis.is_strong_uptrend() {
        (100.0, "strong uptrend")
    } else if analysis.is_moderate_uptrend() {
        (80.0, "moderate uptrend")
    } else if condition.condition == MarketCondition::BearMarket {
        (20.0, "bearish")
    } else {
        (50.0, "sideways")
    };
    LayerResult::new(
        score,
        format!(
            "{label} (short {}, medium {}, long {}, strength {:.1}, momentum {:.1})",
            analysis.short.trend,
            analysis.medium.trend,
            analysis.long.trend,
            analysis.overall_strength,
            analysis.momentum
        ),
    )
}
