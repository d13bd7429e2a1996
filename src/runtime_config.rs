// =============================================================================
// Engine Configuration — preset, layer overrides and thresholds
// =============================================================================
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON file
// loads cleanly.  An explicit `layers` list replaces the preset's layers;
// thresholds and trend horizons apply either way.
//
// Persistence uses an atomic tmp + rename pattern.
// =============================================================================

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::Engine;
use crate::trend::TrendHorizons;
use crate::validation::{LayerConfig, Preset, ScoringThresholds, ValidationPlan};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub preset: Preset,

    /// Explicit layer list; overrides the preset when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerConfig>>,

    #[serde(default)]
    pub thresholds: ScoringThresholds,

    #[serde(default)]
    pub trend_horizons: TrendHorizons,

    /// Shift the approval threshold by market condition.
    #[serde(default)]
    pub adaptive_threshold: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            layers: None,
            thresholds: ScoringThresholds::default(),
            trend_horizons: TrendHorizons::default(),
            adaptive_threshold: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// Missing or malformed files return an error so the caller can fall back
    /// to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            preset = %config.preset,
            custom_layers = config.layers.as_ref().map_or(0, Vec::len),
            adaptive = config.adaptive_threshold,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Reject threshold combinations that cannot produce a sensible verdict.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        ensure!(
            t.min_confidence <= t.max_confidence,
            "min_confidence {} exceeds max_confidence {}",
            t.min_confidence,
            t.max_confidence
        );
        ensure!(
            t.medium_risk_pct <= t.low_risk_pct,
            "medium_risk_pct {} exceeds low_risk_pct {}",
            t.medium_risk_pct,
            t.low_risk_pct
        );
        ensure!(
            (0.0..=100.0).contains(&t.approval_pct),
            "approval_pct {} outside [0, 100]",
            t.approval_pct
        );
        let h = &self.trend_horizons;
        for pair in [h.short, h.medium, h.long] {
            ensure!(
                pair.fast > 0 && pair.slow > 0,
                "trend horizon periods must be positive"
            );
        }
        Ok(())
    }

    /// Validation plan described by this configuration.
    pub fn plan(&self) -> ValidationPlan {
        let plan = match &self.layers {
            Some(layers) => ValidationPlan::from_configs(layers),
            None => ValidationPlan::from_preset(self.preset),
        };
        plan.with_thresholds(self.thresholds)
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.plan())
            .with_horizons(self.trend_horizons)
            .with_adaptive_threshold(self.adaptive_threshold)
    }
}
