// =============================================================================
// Signal Engine — command-line runner
// =============================================================================
//
// Usage: signal-engine <request.json>
//
// Reads one evaluation request (symbol, candles, optional ticker and
// candidate), runs the configured validation engine and prints the audit
// record as JSON on stdout.
//
// Environment:
//   SIGNAL_ENGINE_CONFIG  config file path (default engine_config.json)
//   SIGNAL_ENGINE_PRESET  preset name overriding the config file
//   RUST_LOG              log filter (default info)
// =============================================================================

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signal_engine::{EngineConfig, EvaluationRecord, EvaluationRequest, Preset};

const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("SIGNAL_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    if let Ok(name) = std::env::var("SIGNAL_ENGINE_PRESET") {
        match name.parse::<Preset>() {
            Ok(preset) => {
                config.preset = preset;
                config.layers = None;
            }
            Err(e) => warn!(error = %e, "Ignoring SIGNAL_ENGINE_PRESET"),
        }
    }

    let plan_label = if config.layers.is_some() {
        "custom".to_string()
    } else {
        config.preset.to_string()
    };
    info!(
        plan = %plan_label,
        adaptive = config.adaptive_threshold,
        approval_pct = config.thresholds.approval_pct,
        "Engine configured"
    );

    // ── 2. Request ───────────────────────────────────────────────────────
    let request_path = std::env::args()
        .nth(1)
        .context("usage: signal-engine <request.json>")?;
    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("failed to read request from {request_path}"))?;
    let request = EvaluationRequest::from_json(&raw)?;
    let snapshot = request.snapshot()?;

    // ── 3. Evaluate ──────────────────────────────────────────────────────
    let engine = config.engine();
    let evaluation = engine.evaluate(&snapshot, request.candidate.as_ref());
    info!(
        symbol = %request.symbol,
        bars = snapshot.len(),
        "{}",
        evaluation.outcome.summary()
    );

    let record = EvaluationRecord::new(request.symbol, plan_label, evaluation, request.candidate);
    info!(
        id = %record.id,
        action = %record.final_action,
        "Evaluation recorded"
    );

    // ── 4. Output ────────────────────────────────────────────────────────
    let json = serde_json::to_string_pretty(&record).context("failed to serialise record")?;
    println!("{json}");
    Ok(())
}
