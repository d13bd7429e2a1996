// =============================================================================
// Validation Plan — ordered, weighted layers and the scoring pass
// =============================================================================
//
// A plan is built once (from a preset, a config file or by hand) and then
// run against any number of snapshots.  Running it is a pure function of
// (plan, context): layers are evaluated in insertion order and the outcome
// carries no timestamps, so identical inputs serialise identically.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::layers::{LayerContext, LayerKind, LayerResult, ValidationLayer};
use super::outcome::{LayerReport, ScoringThresholds, ValidationOutcome};
use super::presets::Preset;

/// One configured built-in layer with its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(flatten)]
    pub kind: LayerKind,
    pub weight: f64,
}

#[derive(Clone)]
struct WeightedLayer {
    layer: Arc<dyn ValidationLayer>,
    weight: f64,
}

/// Ordered list of weighted validation layers plus scoring thresholds.
#[derive(Clone)]
pub struct ValidationPlan {
    layers: Vec<WeightedLayer>,
    thresholds: ScoringThresholds,
}

impl fmt::Debug for ValidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<(&str, f64)> = self
            .layers
            .iter()
            .map(|l| (l.layer.name(), l.weight))
            .collect();
        f.debug_struct("ValidationPlan")
            .field("layers", &layers)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl Default for ValidationPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationPlan {
    /// Empty plan with default thresholds.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            thresholds: ScoringThresholds::default(),
        }
    }

    pub fn from_configs(configs: &[LayerConfig]) -> Self {
        configs
            .iter()
            .fold(Self::new(), |plan, cfg| plan.with_layer(cfg.kind, cfg.weight))
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::from_configs(preset.layers())
    }

    /// Append a built-in layer.
    pub fn with_layer(self, kind: LayerKind, weight: f64) -> Self {
        self.with_custom(kind, weight)
    }

    /// Append any layer implementation.
    pub fn with_custom<L>(self, layer: L, weight: f64) -> Self
    where
        L: ValidationLayer + 'static,
    {
        self.with_shared(Arc::new(layer), weight)
    }

    pub fn with_shared(mut self, layer: Arc<dyn ValidationLayer>, weight: f64) -> Self {
        self.layers.push(WeightedLayer { layer, weight });
        self
    }

    pub fn with_thresholds(mut self, thresholds: ScoringThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.layer.name()).collect()
    }

    /// Sum of the usable (positive, finite) weights.
    pub fn total_weight(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.weight)
            .filter(|w| usable_weight(*w))
            .sum()
    }

    /// Run every layer against `ctx` with the plan's own thresholds.
    pub fn validate(&self, ctx: &LayerContext<'_>) -> ValidationOutcome {
        self.validate_with(ctx, &self.thresholds)
    }

    /// Run every layer against `ctx` with explicit thresholds.
    ///
    /// Never fails.  A layer that errors or panics is reported with a zero
    /// contribution while its weight still counts toward the maximum.  A
    /// non-positive or non-finite weight skips the layer and forces an
    /// invalid outcome.
    pub fn validate_with(
        &self,
        ctx: &LayerContext<'_>,
        thresholds: &ScoringThresholds,
    ) -> ValidationOutcome {
        if self.layers.is_empty() {
            warn!("validation requested with no layers configured");
            return ValidationOutcome::unconfigured(thresholds);
        }

        let mut reports = Vec::with_capacity(self.layers.len());
        let mut warnings = Vec::new();
        let mut misconfigured = false;
        let mut max_possible = 0.0;

        for entry in &self.layers {
            let name = entry.layer.name().to_string();

            if !usable_weight(entry.weight) {
                warn!(layer = %name, weight = entry.weight, "skipping layer with unusable weight");
                warnings.push(format!("{name}: unusable weight {}", entry.weight));
                misconfigured = true;
                continue;
            }
            max_possible += entry.weight;

            let report = match run_layer(entry.layer.as_ref(), ctx) {
                Ok(result) => {
                    let score = result.score.clamp(0.0, 100.0);
                    debug!(layer = %name, score, valid = result.is_valid, "{}", result.reason);
                    LayerReport {
                        name,
                        weight: entry.weight,
                        score,
                        contribution: score / 100.0 * entry.weight,
                        is_valid: result.is_valid,
                        reason: result.reason,
                        failed: false,
                    }
                }
                Err(e) => {
                    warn!(layer = %name, error = %e, "validation layer failed");
                    warnings.push(format!("{name}: layer failed: {e:#}"));
                    LayerReport {
                        name,
                        weight: entry.weight,
                        score: 0.0,
                        contribution: 0.0,
                        is_valid: false,
                        reason: format!("{e:#}"),
                        failed: true,
                    }
                }
            };
            reports.push(report);
        }

        let outcome =
            ValidationOutcome::aggregate(reports, max_possible, warnings, misconfigured, thresholds);
        debug!(
            score_pct = outcome.score_percentage,
            valid = outcome.is_valid,
            risk = %outcome.risk_level,
            "validation complete"
        );
        outcome
    }
}

fn usable_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Evaluate one layer, turning panics and non-finite scores into errors.
fn run_layer(layer: &dyn ValidationLayer, ctx: &LayerContext<'_>) -> Result<LayerResult> {
    let result = match panic::catch_unwind(AssertUnwindSafe(|| layer.evaluate(ctx))) {
        Ok(result) => result?,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            return Err(anyhow!("layer panicked: {msg}"));
        }
    };
    if !result.score.is_finite() {
        return Err(anyhow!("layer produced a non-finite score"));
    }
    Ok(result)
}
