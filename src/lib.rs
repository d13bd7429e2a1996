// =============================================================================
// Signal Engine — multi-factor validation of trading signals
// =============================================================================
//
// Scores a market snapshot through weighted, independently computed
// technical layers and turns the aggregate into an approve/reject verdict
// with confidence and risk tier.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod engine;
pub mod evaluation_record;
pub mod indicators;
pub mod market_data;
pub mod request;
pub mod runtime_config;
pub mod trend;
pub mod types;
pub mod validation;

pub use engine::{merge_candidate, Engine, Evaluation};
pub use evaluation_record::EvaluationRecord;
pub use market_data::{Candle, MarketSnapshot, TickerStats};
pub use request::EvaluationRequest;
pub use runtime_config::EngineConfig;
pub use types::{Action, Decision, RiskLevel};
pub use validation::{
    LayerConfig, LayerContext, LayerKind, LayerResult, Preset, ScoringThresholds,
    ValidationLayer, ValidationOutcome, ValidationPlan,
};
