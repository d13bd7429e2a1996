// =============================================================================
// Market Snapshot — immutable input to one evaluation
// =============================================================================
//
// A snapshot is assembled by the data-fetch layer from exchange candles and
// the 24h ticker.  Every optional series runs parallel to the closes; a
// length mismatch is a caller bug and is rejected at construction time
// because it would silently corrupt every layer's math.
// =============================================================================

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV candle as delivered by the exchange kline endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(default)]
    pub open_time: i64,
    #[serde(default)]
    pub close_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Rolling 24h ticker statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerStats {
    /// Percent change over the last 24h (e.g. `3.5` for +3.5 %).
    pub price_change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_volume: Option<f64>,
}

/// Immutable price/volume history for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    closes: Vec<f64>,
    volumes: Option<Vec<f64>>,
    highs: Option<Vec<f64>>,
    lows: Option<Vec<f64>>,
    current_price: Option<f64>,
    ticker: Option<TickerStats>,
}

impl MarketSnapshot {
    /// Create a snapshot from a close series (oldest first).
    pub fn new(closes: Vec<f64>) -> Result<Self> {
        ensure!(!closes.is_empty(), "market snapshot requires at least one close");
        ensure_finite("close", &closes)?;
        Ok(Self {
            closes,
            volumes: None,
            highs: None,
            lows: None,
            current_price: None,
            ticker: None,
        })
    }

    /// Build a snapshot from exchange candles plus optional 24h statistics.
    ///
    /// When the ticker carries a `last_price` it becomes the current price.
    pub fn from_candles(candles: &[Candle], ticker: Option<TickerStats>) -> Result<Self> {
        let closes = candles.iter().map(|c| c.close).collect();
        let volumes = candles.iter().map(|c| c.volume).collect();
        let highs = candles.iter().map(|c| c.high).collect();
        let lows = candles.iter().map(|c| c.low).collect();

        let mut snapshot = Self::new(closes)?
            .with_volumes(volumes)?
            .with_highs_lows(highs, lows)?;

        if let Some(price) = ticker.as_ref().and_then(|t| t.last_price) {
            snapshot = snapshot.with_current_price(price)?;
        }
        if let Some(stats) = ticker {
            snapshot = snapshot.with_ticker(stats);
        }
        Ok(snapshot)
    }

    pub fn with_volumes(mut self, volumes: Vec<f64>) -> Result<Self> {
        ensure!(
            volumes.len() == self.closes.len(),
            "volume series length {} does not match close series length {}",
            volumes.len(),
            self.closes.len()
        );
        ensure_finite("volume", &volumes)?;
        self.volumes = Some(volumes);
        Ok(self)
    }

    pub fn with_highs_lows(mut self, highs: Vec<f64>, lows: Vec<f64>) -> Result<Self> {
        ensure!(
            highs.len() == self.closes.len() && lows.len() == self.closes.len(),
            "high/low series lengths ({}, {}) do not match close series length {}",
            highs.len(),
            lows.len(),
            self.closes.len()
        );
        ensure_finite("high", &highs)?;
        ensure_finite("low", &lows)?;
        self.highs = Some(highs);
        self.lows = Some(lows);
        Ok(self)
    }

    pub fn with_current_price(mut self, price: f64) -> Result<Self> {
        ensure!(
            price.is_finite() && price > 0.0,
            "current price must be positive and finite, got {price}"
        );
        self.current_price = Some(price);
        Ok(self)
    }

    pub fn with_ticker(mut self, ticker: TickerStats) -> Self {
        self.ticker = Some(ticker);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.volumes.as_deref()
    }

    /// Highs for level detection; the close series stands in when absent.
    pub fn highs(&self) -> &[f64] {
        self.highs.as_deref().unwrap_or(&self.closes)
    }

    /// Lows for level detection; the close series stands in when absent.
    pub fn lows(&self) -> &[f64] {
        self.lows.as_deref().unwrap_or(&self.closes)
    }

    /// Explicit current price, or the last close.
    pub fn current_price(&self) -> f64 {
        self.current_price
            .or_else(|| self.closes.last().copied())
            .unwrap_or(0.0)
    }

    pub fn ticker(&self) -> Option<&TickerStats> {
        self.ticker.as_ref()
    }

    /// 24h percent change, falling back to the change across the whole close
    /// series when no ticker was supplied.
    pub fn price_change_percent(&self) -> f64 {
        if let Some(t) = &self.ticker {
            return t.price_change_percent;
        }
        match (self.closes.first(), self.closes.last()) {
            (Some(&first), Some(&last)) if first != 0.0 => (last - first) / first * 100.0,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

fn ensure_finite(series: &str, values: &[f64]) -> Result<()> {
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        bail!("{series} series has a non-finite value at index {i}");
    }
    Ok(())
}
