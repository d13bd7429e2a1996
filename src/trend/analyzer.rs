// =============================================================================
// Multi-Horizon Trend Analysis
// =============================================================================
//
// Evaluates the directional alignment of three EMA pairs (short, medium, long)
// against the current price and blends them with momentum, RSI and volume
// into one overall strength score.
//
// Per horizon:
//   UP        current > fast > slow
//   DOWN      current < fast < slow
//   SIDEWAYS  anything else
//   strength  = min(100, |0.6 * spread% + 0.4 * lead%| * 10)
//               spread% = (fast - slow) / slow * 100
//               lead%   = (current - fast) / fast * 100
//
// Overall strength weights:
//   short 30 %, medium 25 %, momentum 20 %, RSI 15 %, volume 10 %
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{ema, mean_tail, rsi, volume_ratio, DEFAULT_RSI_PERIOD};
use crate::indicators::volume::{BASE_VOLUME_BARS, RECENT_VOLUME_BARS};
use crate::market_data::MarketSnapshot;

/// Bars in each half of the momentum comparison.
const MOMENTUM_BARS: usize = 7;

const SHORT_WEIGHT: f64 = 0.30;
const MEDIUM_WEIGHT: f64 = 0.25;
const MOMENTUM_WEIGHT: f64 = 0.20;
const RSI_WEIGHT: f64 = 0.15;
const VOLUME_WEIGHT: f64 = 0.10;

// =============================================================================
// Types
// =============================================================================

/// Direction of one EMA horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

/// A fast/slow EMA period pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaPair {
    pub fast: usize,
    pub slow: usize,
}

impl EmaPair {
    pub const fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }
}

/// The three horizons evaluated by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendHorizons {
    #[serde(default = "default_short")]
    pub short: EmaPair,
    #[serde(default = "default_medium")]
    pub medium: EmaPair,
    #[serde(default = "default_long")]
    pub long: EmaPair,
}

fn default_short() -> EmaPair {
    TrendHorizons::STANDARD.short
}

fn default_medium() -> EmaPair {
    TrendHorizons::STANDARD.medium
}

fn default_long() -> EmaPair {
    TrendHorizons::STANDARD.long
}

impl TrendHorizons {
    /// 12/26 short, 50/100 medium, 50/200 long.
    pub const STANDARD: Self = Self {
        short: EmaPair::new(12, 26),
        medium: EmaPair::new(50, 100),
        long: EmaPair::new(50, 200),
    };
}

impl Default for TrendHorizons {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Reading of a single horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonTrend {
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub trend: Trend,
    /// Alignment strength in [0, 100].
    pub strength: f64,
}

/// Full multi-horizon analysis of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub current_price: f64,
    pub short: HorizonTrend,
    pub medium: HorizonTrend,
    pub long: HorizonTrend,
    /// Recent-vs-prior price momentum in [0, 100], 50 = flat.
    pub momentum: f64,
    pub rsi: f64,
    /// Recent-vs-baseline volume in [0, 100], 50 when volume is unknown.
    pub volume_strength: f64,
    pub overall_strength: f64,
}

/// Compact trend summary handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub trend: Trend,
    pub strength: f64,
    pub momentum: f64,
    pub rsi: f64,
}

/// Broad market condition used to pick adaptive thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCondition {
    BullMarket,
    BearMarket,
    Sideways,
}

impl std::fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullMarket => write!(f, "BULL_MARKET"),
            Self::BearMarket => write!(f, "BEAR_MARKET"),
            Self::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

impl MarketCondition {
    /// Approval threshold (score percentage) adapted to this condition.
    ///
    /// Bull markets relax the bar by 5 points, bear markets raise it by 10.
    pub fn approval_threshold(self, base: f64) -> f64 {
        match self {
            Self::BullMarket => base - 5.0,
            Self::BearMarket => base + 10.0,
            Self::Sideways => base,
        }
    }
}

/// Market condition together with the analyzer's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionReading {
    pub condition: MarketCondition,
    /// Confidence in [0, 100].
    pub confidence: f64,
}

// =============================================================================
// Analysis
// =============================================================================

/// Run the multi-horizon trend analysis on `snapshot`.
pub fn analyze(snapshot: &MarketSnapshot, horizons: &TrendHorizons) -> TrendAnalysis {
    let closes = snapshot.closes();
    let current_price = snapshot.current_price();

    let short = horizon(closes, current_price, horizons.short);
    let medium = horizon(closes, current_price, horizons.medium);
    let long = horizon(closes, current_price, horizons.long);

    let momentum = momentum_score(closes);
    let rsi_value = rsi(closes, DEFAULT_RSI_PERIOD);
    let volume_strength = snapshot
        .volumes()
        .map(|v| (volume_ratio(v, RECENT_VOLUME_BARS, BASE_VOLUME_BARS) * 50.0).clamp(0.0, 100.0))
        .unwrap_or(50.0);

    let overall_strength = (short.strength * SHORT_WEIGHT
        + medium.strength * MEDIUM_WEIGHT
        + momentum * MOMENTUM_WEIGHT
        + rsi_strength(rsi_value) * RSI_WEIGHT
        + volume_strength * VOLUME_WEIGHT)
        .clamp(0.0, 100.0);

    debug!(
        short = %short.trend,
        medium = %medium.trend,
        long = %long.trend,
        momentum = format!("{:.1}", momentum),
        rsi = format!("{:.1}", rsi_value),
        overall = format!("{:.1}", overall_strength),
        "trend analysis complete"
    );

    TrendAnalysis {
        current_price,
        short,
        medium,
        long,
        momentum,
        rsi: rsi_value,
        volume_strength,
        overall_strength,
    }
}

impl TrendAnalysis {
    /// All three horizons up, momentum > 60, overall > 75, 30 < RSI < 80.
    pub fn is_strong_uptrend(&self) -> bool {
        self.short.trend == Trend::Up
            && self.medium.trend == Trend::Up
            && self.long.trend == Trend::Up
            && self.momentum > 60.0
            && self.overall_strength > 75.0
            && self.rsi > 30.0
            && self.rsi < 80.0
    }

    /// Short horizon up plus medium or long up, momentum > 40, overall > 60.
    pub fn is_moderate_uptrend(&self) -> bool {
        self.short.trend == Trend::Up
            && (self.medium.trend == Trend::Up || self.long.trend == Trend::Up)
            && self.momentum > 40.0
            && self.overall_strength > 60.0
    }

    /// Short horizon down plus medium or long down.
    pub fn is_bearish(&self) -> bool {
        self.short.trend == Trend::Down
            && (self.medium.trend == Trend::Down || self.long.trend == Trend::Down)
    }

    pub fn market_condition(&self) -> ConditionReading {
        if self.is_strong_uptrend() {
            return ConditionReading {
                condition: MarketCondition::BullMarket,
                confidence: self.overall_strength.min(95.0),
            };
        }
        if self.is_moderate_uptrend() {
            return ConditionReading {
                condition: MarketCondition::BullMarket,
                confidence: self.overall_strength * 0.85,
            };
        }
        if self.is_bearish() {
            let bearish: Vec<f64> = [&self.short, &self.medium, &self.long]
                .iter()
                .filter(|h| h.trend == Trend::Down)
                .map(|h| h.strength)
                .collect();
            let mean = bearish.iter().sum::<f64>() / bearish.len() as f64;
            return ConditionReading {
                condition: MarketCondition::BearMarket,
                confidence: (50.0 + mean / 2.0).min(95.0),
            };
        }
        ConditionReading {
            condition: MarketCondition::Sideways,
            confidence: 50.0,
        }
    }

    /// Compact reading keyed on the short horizon.
    pub fn reading(&self) -> TrendReading {
        TrendReading {
            trend: self.short.trend,
            strength: self.overall_strength,
            momentum: self.momentum,
            rsi: self.rsi,
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn horizon(closes: &[f64], current: f64, pair: EmaPair) -> HorizonTrend {
    let fast = ema(closes, pair.fast);
    let slow = ema(closes, pair.slow);

    let trend = if current > fast && fast > slow {
        Trend::Up
    } else if current < fast && fast < slow {
        Trend::Down
    } else {
        Trend::Sideways
    };

    let spread = if slow.abs() > f64::EPSILON {
        (fast - slow) / slow * 100.0
    } else {
        0.0
    };
    let lead = if fast.abs() > f64::EPSILON {
        (current - fast) / fast * 100.0
    } else {
        0.0
    };
    let strength = ((spread * 0.6 + lead * 0.4).abs() * 10.0).min(100.0);

    HorizonTrend {
        fast_ema: fast,
        slow_ema: slow,
        trend,
        strength: if strength.is_finite() { strength } else { 0.0 },
    }
}

/// Mean of the last 7 closes against the 7 before them, mapped around 50.
pub(crate) fn momentum_score(closes: &[f64]) -> f64 {
    if closes.len() < MOMENTUM_BARS * 2 {
        return 50.0;
    }
    let split = closes.len() - MOMENTUM_BARS;
    let recent = mean_tail(closes, MOMENTUM_BARS).unwrap_or(0.0);
    let prior = mean_tail(&closes[..split], MOMENTUM_BARS).unwrap_or(0.0);
    if prior.abs() < f64::EPSILON {
        return 50.0;
    }
    let pct = (recent - prior) / prior * 100.0;
    let score = 50.0 + pct * 5.0;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        50.0
    }
}

/// Re-centre RSI so that 50 maps to 50 and either extreme maps to 100.
fn rsi_strength(rsi: f64) -> f64 {
    50.0 + (rsi - 50.0).abs()
}
