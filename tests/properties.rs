//! Property tests for indicator and aggregation invariants.
//!
//! Uses proptest to verify:
//! 1. EMA bound — on a monotonic series the EMA stays between first and last close
//! 2. RSI range — always within [0, 100], and 100 when no delta is negative
//! 3. Volatility clamp — always within [0, 5]
//! 4. Level sides — supports below, resistances above the current price
//! 5. Aggregation — bounded, deterministic outcomes for every preset

use proptest::prelude::*;
use signal_engine::indicators::{ema, find_support_resistance, historical_volatility, rsi, LevelKind};
use signal_engine::{LayerContext, MarketSnapshot, Preset, ValidationPlan};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), min_len..max_len)
}

/// Non-decreasing series built from a start price and non-negative steps.
fn arb_rising_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (
        arb_price(),
        prop::collection::vec(0.0..5.0_f64, min_len..max_len),
    )
        .prop_map(|(start, steps)| {
            let mut price = start;
            let mut out = Vec::with_capacity(steps.len() + 1);
            out.push(price);
            for step in steps {
                price += step;
                out.push(price);
            }
            out
        })
}

fn tolerance(x: f64) -> f64 {
    1e-9 * x.abs().max(1.0)
}

// ── 1. EMA Bound ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_of_rising_series_is_bounded(
        closes in arb_rising_series(30, 120),
        period in 2usize..30,
    ) {
        let first = closes[0];
        let last = *closes.last().unwrap();
        let value = ema(&closes, period);
        prop_assert!(value >= first - tolerance(first), "ema {} < first {}", value, first);
        prop_assert!(value <= last + tolerance(last), "ema {} > last {}", value, last);
    }

    #[test]
    fn ema_of_falling_series_is_bounded(
        closes in arb_rising_series(30, 120),
        period in 2usize..30,
    ) {
        let falling: Vec<f64> = closes.iter().rev().copied().collect();
        let first = falling[0];
        let last = *falling.last().unwrap();
        let value = ema(&falling, period);
        prop_assert!(value <= first + tolerance(first));
        prop_assert!(value >= last - tolerance(last));
    }
}

// ── 2. RSI Range ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_within_range(closes in arb_series(1, 80), period in 1usize..30) {
        let value = rsi(&closes, period);
        prop_assert!((0.0..=100.0).contains(&value), "rsi {}", value);
    }

    #[test]
    fn rsi_without_losses_is_100(closes in arb_rising_series(15, 60)) {
        prop_assert!((rsi(&closes, 14) - 100.0).abs() < 1e-10);
    }
}

// ── 3. Volatility Clamp ──────────────────────────────────────────────

proptest! {
    #[test]
    fn volatility_is_clamped(closes in arb_series(0, 80)) {
        let vol = historical_volatility(&closes);
        prop_assert!((0.0..=5.0).contains(&vol), "volatility {}", vol);
        if closes.len() < 2 {
            prop_assert!((vol - 1.0).abs() < 1e-10);
        }
    }
}

// ── 4. Support / Resistance Sides ────────────────────────────────────

proptest! {
    #[test]
    fn levels_sit_on_the_correct_side(
        highs in arb_series(3, 80),
        price in arb_price(),
        lookback in 3usize..100,
    ) {
        let lows: Vec<f64> = highs.iter().map(|h| h * 0.98).collect();
        let levels = find_support_resistance(&highs, &lows, price, lookback);
        for level in &levels {
            match level.kind {
                LevelKind::Support => prop_assert!(level.price < price),
                LevelKind::Resistance => prop_assert!(level.price > price),
            }
            prop_assert!(level.strength > 0.0 && level.strength <= 1.0);
        }
        for pair in levels.windows(2) {
            prop_assert!(pair[0].distance_pct(price) <= pair[1].distance_pct(price));
        }
    }
}

// ── 5. Aggregation ───────────────────────────────────────────────────

fn arb_preset() -> impl Strategy<Value = Preset> {
    prop::sample::select(Preset::ALL.to_vec())
}

proptest! {
    #[test]
    fn outcome_is_bounded_and_deterministic(
        closes in arb_series(1, 120),
        preset in arb_preset(),
    ) {
        let volumes: Vec<f64> = closes.iter().map(|c| c * 10.0).collect();
        let snapshot = MarketSnapshot::new(closes)
            .unwrap()
            .with_volumes(volumes)
            .unwrap();
        let plan = ValidationPlan::from_preset(preset);
        let ctx = LayerContext::new(&snapshot);

        let a = plan.validate(&ctx);
        let b = plan.validate(&ctx);
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );

        prop_assert!(a.score_percentage >= 0.0 && a.score_percentage <= 100.0 + 1e-9);
        prop_assert!(a.confidence >= 50.0 && a.confidence <= 95.0);
        prop_assert!((a.max_possible_score - 100.0).abs() < 1e-9);
        prop_assert_eq!(a.is_valid, a.score_percentage >= 60.0);
        prop_assert_eq!(a.layers.len(), preset.layers().len());
    }
}
