// =============================================================================
// Presets — named, ready-made layer configurations
// =============================================================================

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::layers::LayerKind;
use super::plan::LayerConfig;
use crate::trend::TrendHorizons;

/// Named layer configurations, from the strictest to the loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Preset {
    UltraConservative,
    Conservative,
    Balanced,
    Simulation,
    RealBot,
    Aggressive,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::UltraConservative,
        Preset::Conservative,
        Preset::Balanced,
        Preset::Simulation,
        Preset::RealBot,
        Preset::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UltraConservative => "ultra_conservative",
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Simulation => "simulation",
            Self::RealBot => "real_bot",
            Self::Aggressive => "aggressive",
        }
    }

    /// Layers and weights of this preset.
    pub fn layers(self) -> &'static [LayerConfig] {
        match self {
            Self::UltraConservative => ULTRA_CONSERVATIVE,
            Self::Conservative => CONSERVATIVE,
            Self::Balanced => BALANCED,
            Self::Simulation => SIMULATION,
            Self::RealBot => REAL_BOT,
            Self::Aggressive => AGGRESSIVE,
        }
    }

    /// Sum of the preset's layer weights.
    pub fn total_weight(self) -> f64 {
        self.layers().iter().map(|l| l.weight).sum()
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    /// Case-insensitive; `_`, `-` and spaces are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let preset = match key.as_str() {
            "ultraconservative" => Self::UltraConservative,
            "conservative" => Self::Conservative,
            "balanced" => Self::Balanced,
            "simulation" => Self::Simulation,
            "realbot" => Self::RealBot,
            "aggressive" => Self::Aggressive,
            _ => bail!("unknown preset '{s}'"),
        };
        Ok(preset)
    }
}

impl TryFrom<String> for Preset {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Preset> for String {
    fn from(preset: Preset) -> Self {
        preset.as_str().to_string()
    }
}

// =============================================================================
// Preset tables
// =============================================================================

const fn layer(kind: LayerKind, weight: f64) -> LayerConfig {
    LayerConfig { kind, weight }
}

const EMA_12_26: LayerKind = LayerKind::Ema {
    fast_period: 12,
    slow_period: 26,
};

const EMA_9_21: LayerKind = LayerKind::Ema {
    fast_period: 9,
    slow_period: 21,
};

const RSI_14: LayerKind = LayerKind::Rsi { period: 14 };

const TREND: LayerKind = LayerKind::Trend {
    horizons: TrendHorizons::STANDARD,
};

static ULTRA_CONSERVATIVE: &[LayerConfig] = &[
    layer(EMA_12_26, 25.0),
    layer(RSI_14, 15.0),
    layer(LayerKind::Volume { multiplier: 1.5 }, 15.0),
    layer(
        LayerKind::SupportResistance {
            tolerance: 0.02,
            lookback: 50,
        },
        15.0,
    ),
    layer(LayerKind::Momentum { min_momentum: 0.02 }, 10.0),
    layer(
        LayerKind::Volatility {
            min_vol: 0.5,
            max_vol: 3.0,
        },
        10.0,
    ),
    layer(LayerKind::ConfidenceGate { min_confidence: 80.0 }, 10.0),
];

static CONSERVATIVE: &[LayerConfig] = &[
    layer(EMA_12_26, 25.0),
    layer(RSI_14, 20.0),
    layer(LayerKind::Volume { multiplier: 1.3 }, 15.0),
    layer(
        LayerKind::SupportResistance {
            tolerance: 0.02,
            lookback: 50,
        },
        15.0,
    ),
    layer(
        LayerKind::Volatility {
            min_vol: 0.5,
            max_vol: 4.0,
        },
        10.0,
    ),
    layer(TREND, 15.0),
];

static BALANCED: &[LayerConfig] = &[
    layer(EMA_12_26, 25.0),
    layer(RSI_14, 20.0),
    layer(LayerKind::Volume { multiplier: 1.2 }, 20.0),
    layer(LayerKind::Momentum { min_momentum: 0.01 }, 15.0),
    layer(
        LayerKind::Volatility {
            min_vol: 0.3,
            max_vol: 4.0,
        },
        10.0,
    ),
    layer(TREND, 10.0),
];

static SIMULATION: &[LayerConfig] = &[
    layer(EMA_9_21, 30.0),
    layer(RSI_14, 25.0),
    layer(LayerKind::Volume { multiplier: 1.0 }, 20.0),
    layer(LayerKind::Momentum { min_momentum: 0.01 }, 15.0),
    layer(
        LayerKind::Volatility {
            min_vol: 0.2,
            max_vol: 5.0,
        },
        10.0,
    ),
];

static REAL_BOT: &[LayerConfig] = &[
    layer(EMA_12_26, 25.0),
    layer(RSI_14, 15.0),
    layer(LayerKind::Volume { multiplier: 1.5 }, 15.0),
    layer(
        LayerKind::SupportResistance {
            tolerance: 0.015,
            lookback: 50,
        },
        15.0,
    ),
    layer(LayerKind::Momentum { min_momentum: 0.015 }, 10.0),
    layer(
        LayerKind::Volatility {
            min_vol: 0.5,
            max_vol: 3.5,
        },
        10.0,
    ),
    layer(LayerKind::ConfidenceGate { min_confidence: 70.0 }, 10.0),
];

static AGGRESSIVE: &[LayerConfig] = &[
    layer(EMA_9_21, 35.0),
    layer(LayerKind::Rsi { period: 7 }, 25.0),
    layer(LayerKind::Volume { multiplier: 1.0 }, 20.0),
    layer(LayerKind::Momentum { min_momentum: 0.005 }, 20.0),
];
