// =============================================================================
// Engine — trend analysis + weighted validation + final decision
// =============================================================================
//
// Pipeline for one snapshot:
//   1. Multi-horizon trend analysis and market condition
//   2. Approval threshold (adapted to the condition when enabled)
//   3. Weighted validation plan
//   4. Decision: BUY when approved, SELL when rejected in a bear market,
//      HOLD otherwise
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::market_data::MarketSnapshot;
use crate::trend::{self, ConditionReading, MarketCondition, TrendHorizons, TrendReading};
use crate::types::{Action, Decision};
use crate::validation::{LayerContext, Preset, ScoringThresholds, ValidationOutcome, ValidationPlan};

/// Everything produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub outcome: ValidationOutcome,
    pub trend: TrendReading,
    pub condition: ConditionReading,
    /// Approval threshold actually applied (score percentage).
    pub approval_pct: f64,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
pub struct Engine {
    plan: ValidationPlan,
    horizons: TrendHorizons,
    adaptive_threshold: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Engine {
    pub fn new(plan: ValidationPlan) -> Self {
        Self {
            plan,
            horizons: TrendHorizons::STANDARD,
            adaptive_threshold: false,
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::new(ValidationPlan::from_preset(preset))
    }

    pub fn with_horizons(mut self, horizons: TrendHorizons) -> Self {
        self.horizons = horizons;
        self
    }

    /// Shift the approval threshold by market condition.
    pub fn with_adaptive_threshold(mut self, enabled: bool) -> Self {
        self.adaptive_threshold = enabled;
        self
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }

    pub fn evaluate(&self, snapshot: &MarketSnapshot, candidate: Option<&Decision>) -> Evaluation {
        // ── 1. Trend ────────────────────────────────────────────────────
        let analysis = trend::analyze(snapshot, &self.horizons);
        let condition = analysis.market_condition();
        let reading = analysis.reading();

        // ── 2. Threshold ────────────────────────────────────────────────
        let base = *self.plan.thresholds();
        let thresholds = if self.adaptive_threshold {
            ScoringThresholds {
                approval_pct: condition.condition.approval_threshold(base.approval_pct),
                ..base
            }
        } else {
            base
        };
        debug!(
            condition = %condition.condition,
            approval_pct = thresholds.approval_pct,
            "approval threshold selected"
        );

        // ── 3. Validation ───────────────────────────────────────────────
        let mut ctx = LayerContext::new(snapshot);
        if let Some(c) = candidate {
            ctx = ctx.with_candidate(c);
        }
        let outcome = self.plan.validate_with(&ctx, &thresholds);

        // ── 4. Decision ─────────────────────────────────────────────────
        let (action, confidence) = if outcome.is_valid {
            (Action::Buy, outcome.confidence)
        } else if condition.condition == MarketCondition::BearMarket {
            (Action::Sell, condition.confidence)
        } else {
            (Action::Hold, outcome.confidence)
        };
        let decision =
            Decision::new(action, confidence, outcome.summary()).with_risk(outcome.risk_level);

        info!(
            action = %decision.action,
            confidence = decision.confidence,
            score_pct = outcome.score_percentage,
            condition = %condition.condition,
            "evaluation complete"
        );

        Evaluation {
            outcome,
            trend: reading,
            condition,
            approval_pct: thresholds.approval_pct,
            decision,
        }
    }
}

/// Reconcile an upstream candidate decision with a validation outcome.
///
/// A rejected outcome turns the candidate into HOLD, citing the warnings.
/// An approved one keeps the candidate's action, averages the two
/// confidences and attaches the outcome's risk tier.
pub fn merge_candidate(candidate: &Decision, outcome: &ValidationOutcome) -> Decision {
    if !outcome.is_valid {
        let reason = if outcome.warnings.is_empty() {
            format!("validation rejected: {}", outcome.summary())
        } else {
            format!("validation rejected: {}", outcome.warnings.join("; "))
        };
        return Decision::hold(reason).with_risk(outcome.risk_level);
    }

    let confidence = (candidate.confidence + outcome.confidence) / 2.0;
    let reason = format!(
        "{} | validated {:.1}% ({} risk)",
        candidate.reason, outcome.score_percentage, outcome.risk_level
    );
    Decision::new(candidate.action, confidence, reason).with_risk(outcome.risk_level)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;
    use crate::validation::{LayerResult, ValidationLayer};

    struct Fixed(f64);

    impl ValidationLayer for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn evaluate(&self, _ctx: &LayerContext<'_>) -> anyhow::Result<LayerResult> {
            Ok(LayerResult::new(self.0, "fixed"))
        }
    }

    fn engine(score: f64) -> Engine {
        Engine::new(ValidationPlan::new().with_custom(Fixed(score), 10.0))
    }

    fn flat() -> MarketSnapshot {
        MarketSnapshot::new(vec![100.0; 250]).unwrap()
    }

    fn decline() -> MarketSnapshot {
        MarketSnapshot::new((0..250).map(|i| 500.0 - i as f64).collect()).unwrap()
    }

    fn rally() -> MarketSnapshot {
        let mut price = 100.0;
        let closes = (0..250)
            .map(|i| {
                price *= if i % 3 == 2 { 0.98 } else { 1.03 };
                price
            })
            .collect();
        MarketSnapshot::new(closes).unwrap()
    }

    // ---- decisions ---------------------------------------------------------

    #[test]
    fn approved_outcome_buys() {
        let eval = engine(90.0).evaluate(&flat(), None);
        assert!(eval.outcome.is_valid);
        assert_eq!(eval.decision.action, Action::Buy);
        assert!((eval.decision.confidence - 90.0).abs() < 1e-10);
        assert_eq!(eval.decision.risk_level, Some(RiskLevel::Low));
        assert_eq!(eval.condition.condition, MarketCondition::Sideways);
    }

    #[test]
    fn rejected_in_sideways_market_holds() {
        let eval = engine(20.0).evaluate(&flat(), None);
        assert!(!eval.outcome.is_valid);
        assert_eq!(eval.decision.action, Action::Hold);
        assert_eq!(eval.decision.risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn rejected_in_bear_market_sells() {
        let eval = engine(20.0).evaluate(&decline(), None);
        assert_eq!(eval.condition.condition, MarketCondition::BearMarket);
        assert_eq!(eval.decision.action, Action::Sell);
        assert!((eval.decision.confidence - eval.condition.confidence).abs() < 1e-10);
    }

    // ---- adaptive threshold ------------------------------------------------

    #[test]
    fn adaptive_threshold_relaxes_in_bull_market() {
        let snap = rally();
        let fixed = engine(57.0).evaluate(&snap, None);
        assert_eq!(fixed.condition.condition, MarketCondition::BullMarket);
        assert!((fixed.approval_pct - 60.0).abs() < 1e-10);
        assert!(!fixed.outcome.is_valid);

        let adaptive = engine(57.0).with_adaptive_threshold(true).evaluate(&snap, None);
        assert!((adaptive.approval_pct - 55.0).abs() < 1e-10);
        assert!(adaptive.outcome.is_valid);
        assert_eq!(adaptive.decision.action, Action::Buy);
    }

    #[test]
    fn adaptive_threshold_tightens_in_bear_market() {
        let snap = decline();
        assert!(engine(65.0).evaluate(&snap, None).outcome.is_valid);

        let adaptive = engine(65.0).with_adaptive_threshold(true).evaluate(&snap, None);
        assert!((adaptive.approval_pct - 70.0).abs() < 1e-10);
        assert!(!adaptive.outcome.is_valid);
        assert_eq!(adaptive.decision.action, Action::Sell);
    }

    #[test]
    fn candidate_reaches_confidence_gate() {
        use crate::validation::LayerKind;
        let plan = ValidationPlan::new()
            .with_layer(LayerKind::ConfidenceGate { min_confidence: 70.0 }, 10.0);
        let engine = Engine::new(plan);
        let candidate = Decision::new(Action::Buy, 85.0, "analyst");

        assert!(!engine.evaluate(&flat(), None).outcome.is_valid);
        assert!(engine.evaluate(&flat(), Some(&candidate)).outcome.is_valid);
    }

    #[test]
    fn default_engine_runs_balanced_preset() {
        let engine = Engine::default();
        assert_eq!(engine.plan().len(), Preset::Balanced.layers().len());
        let eval = engine.evaluate(&rally(), None);
        assert!(eval.outcome.score_percentage >= 0.0 && eval.outcome.score_percentage <= 100.0);
    }

    // ---- merge_candidate ---------------------------------------------------

    #[test]
    fn merge_rejected_outcome_holds() {
        let outcome = engine(20.0).evaluate(&flat(), None).outcome;
        let candidate = Decision::new(Action::Buy, 80.0, "breakout");
        let merged = merge_candidate(&candidate, &outcome);
        assert_eq!(merged.action, Action::Hold);
        assert!(merged.reason.contains("Fixed"));
        assert_eq!(merged.risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn merge_approved_outcome_averages_confidence() {
        let outcome = engine(90.0).evaluate(&flat(), None).outcome;
        let candidate = Decision::new(Action::Sell, 70.0, "breakdown");
        let merged = merge_candidate(&candidate, &outcome);
        assert_eq!(merged.action, Action::Sell);
        assert!((merged.confidence - 80.0).abs() < 1e-10);
        assert_eq!(merged.risk_level, Some(RiskLevel::Low));
        assert!(merged.reason.starts_with("breakdown"));
    }
}
