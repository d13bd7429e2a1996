// =============================================================================
// Trend Module
// =============================================================================
//
// Multi-horizon EMA trend classification, strength/momentum scoring and the
// market-condition read used to adapt approval thresholds.

pub mod analyzer;

pub use analyzer::{
    analyze, ConditionReading, EmaPair, HorizonTrend, MarketCondition, Trend, TrendAnalysis,
    TrendHorizons, TrendReading,
};
