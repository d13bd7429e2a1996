// =============================================================================
// Validation Outcome — weighted aggregate of every layer result
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

/// Score cut-offs applied to the aggregate score percentage.
///
/// The defaults are the documented contract (approve at 60 %, LOW risk from
/// 80 %, MEDIUM from 65 %, confidence clamped to 50-95) and can be tuned
/// through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringThresholds {
    #[serde(default = "default_approval_pct")]
    pub approval_pct: f64,
    #[serde(default = "default_low_risk_pct")]
    pub low_risk_pct: f64,
    #[serde(default = "default_medium_risk_pct")]
    pub medium_risk_pct: f64,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,
}

fn default_approval_pct() -> f64 {
    60.0
}

fn default_low_risk_pct() -> f64 {
    80.0
}

fn default_medium_risk_pct() -> f64 {
    65.0
}

fn default_min_confidence() -> f64 {
    50.0
}

fn default_max_confidence() -> f64 {
    95.0
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            approval_pct: default_approval_pct(),
            low_risk_pct: default_low_risk_pct(),
            medium_risk_pct: default_medium_risk_pct(),
            min_confidence: default_min_confidence(),
            max_confidence: default_max_confidence(),
        }
    }
}

impl ScoringThresholds {
    pub fn risk_level(&self, score_pct: f64) -> RiskLevel {
        if score_pct >= self.low_risk_pct {
            RiskLevel::Low
        } else if score_pct >= self.medium_risk_pct {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Score percentage bounded to the confidence range.  Never panics,
    /// even when the bounds are inverted.
    pub fn confidence(&self, score_pct: f64) -> f64 {
        score_pct.max(self.min_confidence).min(self.max_confidence)
    }
}

/// One layer's line in the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    pub name: String,
    pub weight: f64,
    pub score: f64,
    /// `score / 100 * weight`.
    pub contribution: f64,
    pub is_valid: bool,
    pub reason: String,
    /// The layer returned an error or panicked.
    #[serde(default)]
    pub failed: bool,
}

/// Aggregate verdict of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub total_score: f64,
    pub max_possible_score: f64,
    pub score_percentage: f64,
    pub is_valid: bool,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    /// Layers whose own result was valid.
    pub active_layers: Vec<String>,
    /// Reasons of passing layers.
    pub reasons: Vec<String>,
    /// Reasons of failing layers, layer errors and configuration problems.
    pub warnings: Vec<String>,
    pub layers: Vec<LayerReport>,
}

impl ValidationOutcome {
    /// Build the outcome from per-layer reports.
    ///
    /// `misconfigured` forces an invalid, minimum-confidence, HIGH-risk
    /// verdict regardless of the scores.
    pub(crate) fn aggregate(
        layers: Vec<LayerReport>,
        max_possible_score: f64,
        mut warnings: Vec<String>,
        misconfigured: bool,
        thresholds: &ScoringThresholds,
    ) -> Self {
        let total_score: f64 = layers.iter().map(|l| l.contribution).sum();
        let score_percentage = if max_possible_score > 0.0 {
            total_score / max_possible_score * 100.0
        } else {
            0.0
        };

        let mut active_layers = Vec::new();
        let mut reasons = Vec::new();
        for layer in &layers {
            if layer.is_valid {
                active_layers.push(layer.name.clone());
                reasons.push(format!("{}: {}", layer.name, layer.reason));
            } else if !layer.failed {
                warnings.push(format!("{}: {}", layer.name, layer.reason));
            }
        }

        let (is_valid, confidence, risk_level) = if misconfigured {
            (false, thresholds.min_confidence, RiskLevel::High)
        } else {
            (
                score_percentage >= thresholds.approval_pct,
                thresholds.confidence(score_percentage),
                thresholds.risk_level(score_percentage),
            )
        };

        Self {
            total_score,
            max_possible_score,
            score_percentage,
            is_valid,
            confidence,
            risk_level,
            active_layers,
            reasons,
            warnings,
            layers,
        }
    }

    /// Outcome for a plan with nothing to run.
    pub(crate) fn unconfigured(thresholds: &ScoringThresholds) -> Self {
        Self::aggregate(
            Vec::new(),
            0.0,
            vec!["no validation layers configured".to_string()],
            true,
            thresholds,
        )
    }

    /// One-line summary suitable for logs.
    pub fn summary(&self) -> String {
        let verdict = if self.is_valid { "APPROVED" } else { "REJECTED" };
        let active = if self.active_layers.is_empty() {
            "none".to_string()
        } else {
            self.active_layers.join(", ")
        };
        let mut line = format!(
            "{verdict} {:.1}% ({:.1}/{:.1}) | confidence {:.1} | risk {} | active: {active}",
            self.score_percentage,
            self.total_score,
            self.max_possible_score,
            self.confidence,
            self.risk_level
        );
        if !self.warnings.is_empty() {
            line.push_str(" | warnings: ");
            line.push_str(&self.warnings.join("; "));
        }
        line
    }
}
