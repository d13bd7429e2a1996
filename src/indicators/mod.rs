// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shared by the
// trend analyzer and every validation layer.  None of these functions fail:
// insufficient data yields a documented neutral or degenerate value so the
// engine always has something to score.

pub mod ema;
pub mod rsi;
pub mod support_resistance;
pub mod volatility;
pub mod volume;

pub use ema::{calculate_ema, ema};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
pub use support_resistance::{find_support_resistance, LevelKind, TechnicalLevel};
pub use volatility::historical_volatility;
pub use volume::{mean_tail, volume_ratio};
