//! Payoff and risk analysis of a leg set.
//!
//! The metrics are always derived from the same sampled curve that is
//! returned to the caller, so max profit/loss and breakevens agree with what
//! is plotted.

mod greeks;
mod metrics;
mod payoff;

pub use greeks::{aggregate_greeks, leg_greeks};
pub use metrics::{
    calculate_metrics, find_breakevens, has_naked_short, probability_of_profit, required_margin,
    risk_reward,
};
pub use payoff::{generate_payoff_curve, pnl_at, tail_exposure};

use crate::config::EngineConfig;
use crate::types::{OptionLeg, StrategyAnalysis, UnderlyingSnapshot};
use crate::Result;

/// Compute the payoff curve and metrics with the default engine settings.
pub fn compute_payoff_and_metrics(
    legs: &[OptionLeg],
    snapshot: &UnderlyingSnapshot,
) -> Result<StrategyAnalysis> {
    compute_payoff_and_metrics_with(legs, snapshot, &EngineConfig::default())
}

/// Compute the payoff curve and metrics using `config` for the window, sampling and margin.
pub fn compute_payoff_and_metrics_with(
    legs: &[OptionLeg],
    snapshot: &UnderlyingSnapshot,
    config: &EngineConfig,
) -> Result<StrategyAnalysis> {
    snapshot.validate()?;
    for leg in legs {
        leg.validate()?;
    }

    let curve = generate_payoff_curve(
        legs,
        snapshot.spot_price,
        snapshot.lot_size,
        config.range_fraction,
        config.sample_count,
    )?;
    let metrics = calculate_metrics(legs, &curve, snapshot, config.margin_rate)?;

    Ok(StrategyAnalysis { curve, metrics })
}
