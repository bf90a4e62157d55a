//! Simplified premium estimator.
//!
//! Not an option-pricing model: premium is intrinsic value plus a time value
//! term that peaks at the money and decays exponentially with distance from
//! spot. The function is pure, so re-pricing a leg with the same inputs
//! always reproduces the same premium.

use crate::types::OptionType;
use crate::{Error, Result};

/// Smallest premium ever quoted, modelling the minimum tick / liquidity premium.
pub const MIN_PREMIUM: f64 = 5.0;

/// Share of the one-sigma move counted as ATM time value.
const TIME_VALUE_FACTOR: f64 = 0.4;

/// Decay rate of time value per unit of relative distance from spot.
const DISTANCE_DECAY: f64 = 10.0;

/// Decay weight in (0, 1] that is 1 at the money and falls off with `|spot - strike| / spot`.
pub fn distance_factor(spot_price: f64, strike: f64) -> f64 {
    (-(spot_price - strike).abs() / spot_price * DISTANCE_DECAY).exp()
}

/// Estimate the premium per unit of an option.
///
/// # Arguments
///
/// * `spot_price` - Current price of the underlying (must be positive)
/// * `strike` - Option strike (must be positive)
/// * `option_type` - Call or put
/// * `implied_volatility` - Annualized IV in percent (e.g. 15.0)
/// * `days_to_expiry` - Calendar days to expiry (must be non-negative)
///
/// # Returns
///
/// `max(5, intrinsic + time_value * distance_factor)` where
/// `time_value = spot * iv/100 * sqrt(days/365) * 0.4`.
pub fn estimate_premium(
    spot_price: f64,
    strike: f64,
    option_type: OptionType,
    implied_volatility: f64,
    days_to_expiry: f64,
) -> Result<f64> {
    if !(spot_price.is_finite() && spot_price > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Spot price must be positive, got {}",
            spot_price
        )));
    }
    if !(strike.is_finite() && strike > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Strike must be positive, got {}",
            strike
        )));
    }
    if !(implied_volatility.is_finite() && implied_volatility >= 0.0) {
        return Err(Error::InvalidInput(format!(
            "Implied volatility must be non-negative, got {}",
            implied_volatility
        )));
    }
    if !(days_to_expiry.is_finite() && days_to_expiry >= 0.0) {
        return Err(Error::InvalidInput(format!(
            "Days to expiry must be non-negative, got {}",
            days_to_expiry
        )));
    }

    let intrinsic = option_type.intrinsic(spot_price, strike);
    let time_value = spot_price
        * (implied_volatility / 100.0)
        * (days_to_expiry / 365.0).sqrt()
        * TIME_VALUE_FACTOR;

    let premium = intrinsic + time_value * distance_factor(spot_price, strike);
    Ok(premium.max(MIN_PREMIUM))
}
