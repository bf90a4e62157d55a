//! Core data types for the payoff engine.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Option right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Signed distance into the money: `spot - strike` for calls, `strike - spot` for puts.
    pub fn moneyness(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => spot - strike,
            OptionType::Put => strike - spot,
        }
    }

    /// Exercise value per unit at the given underlying price.
    pub fn intrinsic(self, price: f64, strike: f64) -> f64 {
        self.moneyness(price, strike).max(0.0)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

/// Position direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// +1 for long, -1 for short.
    pub fn direction(self) -> f64 {
        match self {
            Action::Buy => 1.0,
            Action::Sell => -1.0,
        }
    }
}

/// Opaque leg identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct LegId(Uuid);

impl LegId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LegId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single option position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionLeg {
    /// Leg identifier
    #[serde(default)]
    pub id: LegId,
    /// Strike price (a ladder strike)
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Buy or sell
    pub action: Action,
    /// Number of lots
    pub lots: u32,
    /// Premium per unit of underlying
    pub premium: f64,
    /// Implied volatility in percent at the time the leg was priced
    #[serde(default)]
    pub implied_volatility: f64,
}

impl OptionLeg {
    /// Create a leg with a fresh id.
    pub fn new(
        strike: f64,
        option_type: OptionType,
        action: Action,
        lots: u32,
        premium: f64,
        implied_volatility: f64,
    ) -> Self {
        Self {
            id: LegId::new(),
            strike,
            option_type,
            action,
            lots,
            premium,
            implied_volatility,
        }
    }

    /// Signed position size in units of underlying.
    pub fn signed_units(&self, lot_size: u32) -> f64 {
        self.action.direction() * self.lots as f64 * lot_size as f64
    }

    /// Expiry P&L of this leg if the underlying settles at `price`.
    pub fn expiry_pnl(&self, price: f64, lot_size: u32) -> f64 {
        let intrinsic = self.option_type.intrinsic(price, self.strike);
        (intrinsic - self.premium) * self.signed_units(lot_size)
    }

    /// Premium cash flow on entry: positive when received, negative when paid.
    pub fn premium_flow(&self, lot_size: u32) -> f64 {
        -self.premium * self.signed_units(lot_size)
    }

    /// Parse a JSON array of legs and validate each one.
    ///
    /// Missing ids are filled with fresh ones.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let legs: Vec<Self> = serde_json::from_str(json)?;
        for leg in &legs {
            leg.validate()?;
        }
        Ok(legs)
    }

    /// Check the leg against the data-model constraints.
    pub fn validate(&self) -> Result<()> {
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Leg {} strike must be positive, got {}",
                self.id, self.strike
            )));
        }
        if self.lots == 0 {
            return Err(Error::InvalidInput(format!(
                "Leg {} must have at least one lot",
                self.id
            )));
        }
        if !(self.premium.is_finite() && self.premium >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "Leg {} premium must be non-negative, got {}",
                self.id, self.premium
            )));
        }
        Ok(())
    }
}

/// Market parameters of the underlying at analysis time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnderlyingSnapshot {
    /// Current spot price
    pub spot_price: f64,
    /// Contract multiplier
    pub lot_size: u32,
    /// Annualized implied volatility in percent (e.g. 15.0)
    pub implied_volatility: f64,
    /// Calendar days until expiry
    pub days_to_expiry: f64,
}

impl UnderlyingSnapshot {
    /// Create a validated snapshot.
    pub fn new(
        spot_price: f64,
        lot_size: u32,
        implied_volatility: f64,
        days_to_expiry: f64,
    ) -> Result<Self> {
        let snapshot = Self {
            spot_price,
            lot_size,
            implied_volatility,
            days_to_expiry,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Create a snapshot whose days to expiry are counted from `as_of` to `expiry`.
    pub fn with_expiry(
        spot_price: f64,
        lot_size: u32,
        implied_volatility: f64,
        expiry: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Self> {
        let days = (expiry - as_of).num_days();
        if days < 0 {
            return Err(Error::InvalidInput(format!(
                "Expiry {} is before {}",
                expiry, as_of
            )));
        }
        Self::new(spot_price, lot_size, implied_volatility, days as f64)
    }

    /// Check the snapshot against the invalid-input rules.
    pub fn validate(&self) -> Result<()> {
        if !(self.spot_price.is_finite() && self.spot_price > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Spot price must be positive, got {}",
                self.spot_price
            )));
        }
        if self.lot_size == 0 {
            return Err(Error::InvalidInput("Lot size must be positive".to_string()));
        }
        if !(self.implied_volatility.is_finite() && self.implied_volatility >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "Implied volatility must be non-negative, got {}",
                self.implied_volatility
            )));
        }
        if !(self.days_to_expiry.is_finite() && self.days_to_expiry >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "Days to expiry must be non-negative, got {}",
                self.days_to_expiry
            )));
        }
        Ok(())
    }

    /// One standard deviation price move until expiry implied by the volatility.
    pub fn expected_move(&self) -> f64 {
        self.spot_price * (self.implied_volatility / 100.0) * (self.days_to_expiry / 365.0).sqrt()
    }
}

/// One sample of the expiry payoff curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PayoffPoint {
    /// Underlying price at expiry
    pub price: f64,
    /// Aggregate P&L of all legs at that price
    pub pnl: f64,
}

/// A profit or loss extreme that may have no finite bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Bound {
    Bounded(f64),
    Unbounded,
}

impl Bound {
    /// The finite value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Bound::Bounded(v) => Some(v),
            Bound::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Bound::Unbounded)
    }
}

/// Reward per unit of risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RiskReward {
    /// `|max_profit / max_loss|`
    Ratio(f64),
    /// Profit is unbounded while loss is finite and nonzero
    Unbounded,
    /// No meaningful ratio (zero loss, or both sides unbounded)
    Undefined,
}

/// Approximate aggregate sensitivities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

impl Greeks {
    /// Multiply every sensitivity by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
        }
    }
}

impl std::ops::Add for Greeks {
    type Output = Greeks;

    fn add(self, rhs: Greeks) -> Greeks {
        Greeks {
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            theta: self.theta + rhs.theta,
            vega: self.vega + rhs.vega,
        }
    }
}

/// P&L slope beyond the strike range, in currency per unit price move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TailExposure {
    /// Slope above the highest strike (net call units)
    pub upside_slope: f64,
    /// P&L gained per unit the price falls below the lowest strike (net put units)
    pub downside_slope: f64,
}

/// Risk summary of a leg set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyMetrics {
    /// Premium received on entry (zero if the position is a debit)
    pub net_credit: f64,
    /// Premium paid on entry (zero if the position is a credit)
    pub net_debit: f64,
    /// Largest P&L, or unbounded
    pub max_profit: Bound,
    /// Smallest P&L (usually negative), or unbounded
    pub max_loss: Bound,
    /// Zero crossings of the payoff curve, ascending
    pub breakevens: Vec<f64>,
    /// Heuristic probability of profit in percent
    pub probability_of_profit: f64,
    /// Reward per unit of risk
    pub risk_reward_ratio: RiskReward,
    /// Heuristic margin requirement
    pub required_margin: f64,
    /// Aggregate approximate Greeks
    #[serde(flatten)]
    pub greeks: Greeks,
    /// Structural tail slopes
    pub tail: TailExposure,
}

impl StrategyMetrics {
    /// Metrics of an empty position.
    pub fn empty() -> Self {
        Self {
            net_credit: 0.0,
            net_debit: 0.0,
            max_profit: Bound::Bounded(0.0),
            max_loss: Bound::Bounded(0.0),
            breakevens: Vec::new(),
            probability_of_profit: 0.0,
            risk_reward_ratio: RiskReward::Undefined,
            required_margin: 0.0,
            greeks: Greeks::default(),
            tail: TailExposure::default(),
        }
    }
}

/// Payoff curve together with the metrics derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyAnalysis {
    pub curve: Vec<PayoffPoint>,
    pub metrics: StrategyMetrics,
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
