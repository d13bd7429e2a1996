// =============================================================================
// Validation Module
// =============================================================================
//
// Multi-factor validation: independent layers score a market snapshot, the
// plan weighs them and the outcome reports an approval verdict with
// confidence and risk tier.

pub mod layers;
pub mod outcome;
pub mod plan;
pub mod presets;

pub use layers::{LayerContext, LayerKind, LayerResult, ValidationLayer, LAYER_PASS_SCORE};
pub use outcome::{LayerReport, ScoringThresholds, ValidationOutcome};
pub use plan::{LayerConfig, ValidationPlan};
pub use presets::Preset;
