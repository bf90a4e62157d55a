//! Payoff Engine - Options strategy payoff and risk metrics.
//!
//! This crate provides the calculation core behind the Stanley options
//! strategy builder:
//!
//! - **Strike ladder**: ATM strike and tradable strikes around spot
//! - **Premium estimation**: Simplified intrinsic + decayed time value model
//! - **Strategy templates**: Built-in catalog and template instantiation
//! - **Leg store**: Ordered, editable leg collection with automatic re-pricing
//! - **Analysis**: Expiry payoff curve, breakevens, max profit/loss, margin and Greeks
//!
//! Every calculation is synchronous and free of I/O. The premium and Greek
//! figures are teaching approximations, not exchange-grade prices.
//!
//! # Example
//!
//! ```rust
//! use payoff_engine::{
//!     compute_payoff_and_metrics, generate_strike_ladder, get_template, instantiate_template,
//!     UnderlyingSnapshot,
//! };
//!
//! let snapshot = UnderlyingSnapshot::new(22_000.0, 50, 14.0, 21.0).unwrap();
//! let ladder = generate_strike_ladder(snapshot.spot_price, 50.0, 15).unwrap();
//!
//! let template = get_template("bull_call_spread").unwrap();
//! let legs = instantiate_template(&template, ladder.atm_strike, 50.0, &snapshot).unwrap();
//!
//! let analysis = compute_payoff_and_metrics(&legs, &snapshot).unwrap();
//! println!("Breakevens: {:?}", analysis.metrics.breakevens);
//! ```

pub mod analysis;
pub mod config;
pub mod pricing;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use types::{
    Action, ApiResponse, Bound, Greeks, LegId, OptionLeg, OptionType, PayoffPoint, RiskReward,
    StrategyAnalysis, StrategyMetrics, TailExposure, UnderlyingSnapshot,
};

// Re-export main functionality
pub use analysis::{
    calculate_metrics, compute_payoff_and_metrics, compute_payoff_and_metrics_with,
    generate_payoff_curve, pnl_at,
};
pub use config::EngineConfig;
pub use pricing::{estimate_premium, generate_strike_ladder, StrikeLadder};
pub use strategy::{
    get_template, instantiate_template, list_templates, LegStore, LegUpdate, StrategyCategory,
    StrategyTemplate, TemplateLeg, BUILTIN_TEMPLATES,
};

/// Error types for payoff-engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Leg not found: {0}")]
    LegNotFound(String),

    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Result type for payoff-engine operations.
pub type Result<T> = std::result::Result<T, Error>;
