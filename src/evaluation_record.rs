// =============================================================================
// Evaluation Record — auditable envelope around one engine evaluation
// =============================================================================
//
// The validation outcome itself is deterministic and carries no identity or
// time.  The record adds both, plus the upstream candidate and the merged
// decision, so every verdict can be audited after the fact.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::engine::{merge_candidate, Evaluation};
use crate::types::{Action, Decision};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique identifier for this evaluation (UUID v4).
    pub id: String,

    pub symbol: String,

    /// Preset name or "custom" for an explicit layer list.
    pub plan: String,

    /// Action the caller should act on: the merged decision when a
    /// candidate was supplied, the engine's own decision otherwise.
    pub final_action: Action,

    pub evaluation: Evaluation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Decision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<Decision>,

    /// ISO 8601 timestamp of when this record was created.
    pub created_at: String,
}

impl EvaluationRecord {
    pub fn new(
        symbol: impl Into<String>,
        plan: impl Into<String>,
        evaluation: Evaluation,
        candidate: Option<Decision>,
    ) -> Self {
        let merged = candidate
            .as_ref()
            .map(|c| merge_candidate(c, &evaluation.outcome));
        let final_action = merged
            .as_ref()
            .map_or(evaluation.decision.action, |d| d.action);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            plan: plan.into(),
            final_action,
            evaluation,
            candidate,
            merged,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The decision `final_action` was taken from.
    pub fn final_decision(&self) -> &Decision {
        self.merged.as_ref().unwrap_or(&self.evaluation.decision)
    }
}
