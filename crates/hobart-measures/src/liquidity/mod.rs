//! Liquidity measures
//!
//! Characteristics that describe how costly a stock is to trade (Amihud
//! illiquidity, turnover) and how exposed its return is to aggregate
//! liquidity shocks (liquidity beta).

pub mod amihud;
pub mod liquidity_beta;
pub mod turnover;

pub use amihud::{AmihudConfig, AmihudIlliquidity};
pub use liquidity_beta::{LiquidityBeta, LiquidityBetaConfig, LiquidityBetaEstimate};
pub use turnover::{Turnover, TurnoverConfig};
