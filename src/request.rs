// =============================================================================
// Evaluation Request — JSON input accepted by the runner
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::market_data::{Candle, MarketSnapshot, TickerStats};
use crate::types::Decision;

/// One symbol's candles, optional 24h ticker and optional upstream candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub symbol: String,
    pub candles: Vec<Candle>,
    #[serde(default)]
    pub ticker: Option<TickerStats>,
    #[serde(default)]
    pub candidate: Option<Decision>,
}

impl EvaluationRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse evaluation request")
    }

    pub fn snapshot(&self) -> Result<MarketSnapshot> {
        MarketSnapshot::from_candles(&self.candles, self.ticker.clone())
            .with_context(|| format!("invalid market data for {}", self.symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_request() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "candles": [
                { "open_time": 0, "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 10 },
                { "open_time": 60000, "open": 1.5, "high": 2.5, "low": 1, "close": 2, "volume": 12 }
            ]
        }"#;
        let req = EvaluationRequest::from_json(json).unwrap();
        assert_eq!(req.symbol, "BTCUSDT");
        assert!(req.ticker.is_none());
        assert!(req.candidate.is_none());

        let snap = req.snapshot().unwrap();
        assert_eq!(snap.len(), 2);
        assert!((snap.current_price() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn empty_candles_fail_with_symbol_context() {
        let req = EvaluationRequest::from_json(r#"{ "symbol": "ETHUSDT", "candles": [] }"#).unwrap();
        let err = req.snapshot().unwrap_err();
        assert!(err.to_string().contains("ETHUSDT"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EvaluationRequest::from_json("{ not json").is_err());
    }
}
