//! End-to-end scenarios through the public API.

use anyhow::{bail, Result};
use signal_engine::validation::layers::{ema_layer, rsi_layer, volume_layer};
use signal_engine::{
    Action, Candle, Decision, EngineConfig, EvaluationRecord, EvaluationRequest, LayerContext,
    LayerResult, MarketSnapshot, Preset, RiskLevel, TickerStats, ValidationLayer, ValidationPlan,
};

struct Fixed {
    name: &'static str,
    score: f64,
}

impl ValidationLayer for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, _ctx: &LayerContext<'_>) -> Result<LayerResult> {
        Ok(LayerResult::new(self.score, "fixed"))
    }
}

struct Failing;

impl ValidationLayer for Failing {
    fn name(&self) -> &str {
        "OrderFlow"
    }

    fn evaluate(&self, _ctx: &LayerContext<'_>) -> Result<LayerResult> {
        bail!("depth snapshot missing")
    }
}

fn candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle {
            open_time: i as i64 * 60_000,
            close_time: i as i64 * 60_000 + 59_999,
            open: c,
            high: c * 1.01,
            low: c * 0.99,
            close: c,
            volume: 1_000.0,
        })
        .collect()
}

// ── Layer scenarios ──────────────────────────────────────────────────

#[test]
fn scenario_a_ema_on_rising_series() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let snapshot = MarketSnapshot::new(closes).unwrap();
    let result = ema_layer(&snapshot, 12, 26);
    assert!(result.score >= 80.0);
    assert!(result.is_valid);
}

#[test]
fn scenario_b_rsi_at_fifty() {
    let closes: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    let snapshot = MarketSnapshot::new(closes).unwrap();
    let result = rsi_layer(&snapshot, 14);
    assert!((result.score - 100.0).abs() < 1e-10);
    assert!(result.is_valid);
}

#[test]
fn scenario_c_volume_below_multiplier() {
    let mut volumes = vec![3700.0 / 17.0; 17];
    volumes.extend([100.0, 100.0, 100.0]);
    let snapshot = MarketSnapshot::new(vec![100.0; 20])
        .unwrap()
        .with_volumes(volumes)
        .unwrap();
    let result = volume_layer(&snapshot, 2.0);
    assert!((result.score - 40.0).abs() < 1e-10);
    assert!(!result.is_valid);
}

// ── Aggregation scenarios ────────────────────────────────────────────

#[test]
fn scenario_d_weighted_aggregation() {
    let plan = ValidationPlan::new()
        .with_custom(Fixed { name: "EMA", score: 80.0 }, 25.0)
        .with_custom(Fixed { name: "RSI", score: 100.0 }, 15.0);
    let snapshot = MarketSnapshot::new(vec![100.0; 30]).unwrap();
    let outcome = plan.validate(&LayerContext::new(&snapshot));

    assert!((outcome.layers[0].contribution - 20.0).abs() < 1e-10);
    assert!((outcome.layers[1].contribution - 15.0).abs() < 1e-10);
    assert!((outcome.total_score - 35.0).abs() < 1e-10);
    assert!((outcome.max_possible_score - 40.0).abs() < 1e-10);
    assert!((outcome.score_percentage - 87.5).abs() < 1e-10);
    assert!(outcome.is_valid);
    assert_eq!(outcome.risk_level, RiskLevel::Low);
}

#[test]
fn scenario_e_failing_layer_is_isolated() {
    let plan = ValidationPlan::new()
        .with_custom(Fixed { name: "EMA", score: 80.0 }, 25.0)
        .with_custom(Failing, 15.0);
    let snapshot = MarketSnapshot::new(vec![100.0; 30]).unwrap();
    let outcome = plan.validate(&LayerContext::new(&snapshot));

    let failed = outcome.layers.iter().find(|l| l.name == "OrderFlow").unwrap();
    assert!(failed.failed);
    assert_eq!(failed.contribution, 0.0);
    assert!(outcome.warnings.iter().any(|w| w.contains("OrderFlow")));
    // 20 of 40
    assert!((outcome.score_percentage - 50.0).abs() < 1e-10);
    assert!(!outcome.is_valid);
}

// ── Full pipeline ────────────────────────────────────────────────────

#[test]
fn request_to_record() {
    let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i % 7) as f64).collect();
    let request = EvaluationRequest {
        symbol: "BTCUSDT".to_string(),
        candles: candles(&closes),
        ticker: Some(TickerStats {
            price_change_percent: 1.8,
            last_price: Some(103.0),
            quote_volume: None,
        }),
        candidate: Some(Decision::new(Action::Buy, 75.0, "analyst breakout")),
    };

    let config = EngineConfig {
        preset: Preset::RealBot,
        ..EngineConfig::default()
    };
    let snapshot = request.snapshot().unwrap();
    assert!((snapshot.current_price() - 103.0).abs() < 1e-10);

    let evaluation = config
        .engine()
        .evaluate(&snapshot, request.candidate.as_ref());
    assert_eq!(evaluation.outcome.layers.len(), Preset::RealBot.layers().len());

    let record = EvaluationRecord::new(
        request.symbol.clone(),
        config.preset.to_string(),
        evaluation,
        request.candidate.clone(),
    );
    assert_eq!(record.plan, "real_bot");
    let merged = record.merged.as_ref().unwrap();
    if record.evaluation.outcome.is_valid {
        assert_eq!(merged.action, Action::Buy);
    } else {
        assert_eq!(merged.action, Action::Hold);
    }
    assert_eq!(record.final_action, merged.action);
}
