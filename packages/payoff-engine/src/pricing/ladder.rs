//! Strike ladder generation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Relative tolerance when matching a strike against the ladder.
const STRIKE_TOLERANCE: f64 = 1e-9;

/// Tradable strikes around the current spot price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrikeLadder {
    /// Strike nearest to spot
    pub atm_strike: f64,
    /// Strikes in ascending order, `2 * count + 1` of them
    pub strikes: Vec<f64>,
}

/// Generate the ATM strike and `count` strikes on each side of it.
///
/// # Arguments
///
/// * `spot_price` - Current price of the underlying (must be positive)
/// * `strike_gap` - Distance between adjacent strikes (must be positive)
/// * `count` - Ladder half-width
///
/// # Returns
///
/// `StrikeLadder` with `atm_strike = round(spot / gap) * gap`. Strikes that
/// would fall at or below zero are dropped.
pub fn generate_strike_ladder(spot_price: f64, strike_gap: f64, count: u32) -> Result<StrikeLadder> {
    if !(spot_price.is_finite() && spot_price > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Spot price must be positive, got {}",
            spot_price
        )));
    }
    if !(strike_gap.is_finite() && strike_gap > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Strike gap must be positive, got {}",
            strike_gap
        )));
    }

    let atm_strike = (spot_price / strike_gap).round() * strike_gap;
    let half = count as i64;

    let strikes = (-half..=half)
        .map(|k| atm_strike + k as f64 * strike_gap)
        .filter(|&strike| strike > 0.0)
        .collect();

    Ok(StrikeLadder {
        atm_strike,
        strikes,
    })
}

impl StrikeLadder {
    /// Whether `strike` is one of the ladder's strikes.
    pub fn contains(&self, strike: f64) -> bool {
        strike.is_finite()
            && self
                .strikes
                .iter()
                .any(|&s| (s - strike).abs() <= STRIKE_TOLERANCE * s)
    }

    pub fn min_strike(&self) -> Option<f64> {
        self.strikes.first().copied()
    }

    pub fn max_strike(&self) -> Option<f64> {
        self.strikes.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_rounding() {
        let ladder = generate_strike_ladder(22_037.0, 50.0, 2).unwrap();
        assert_eq!(ladder.atm_strike, 22_050.0);

        let ladder = generate_strike_ladder(22_012.0, 50.0, 2).unwrap();
        assert_eq!(ladder.atm_strike, 22_000.0);
    }

    #[test]
    fn test_ladder_is_symmetric_and_ascending() {
        let ladder = generate_strike_ladder(20_000.0, 50.0, 15).unwrap();

        assert_eq!(ladder.strikes.len(), 31);
        assert_eq!(ladder.strikes[0], 19_250.0);
        assert_eq!(ladder.strikes[15], 20_000.0);
        assert_eq!(ladder.strikes[30], 20_750.0);
        assert!(ladder.strikes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ladder_drops_non_positive_strikes() {
        let ladder = generate_strike_ladder(100.0, 50.0, 5).unwrap();
        assert!(ladder.strikes.iter().all(|&s| s > 0.0));
        assert_eq!(ladder.strikes[0], 50.0);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        assert!(matches!(
            generate_strike_ladder(0.0, 50.0, 10),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            generate_strike_ladder(20_000.0, 0.0, 10),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            generate_strike_ladder(20_000.0, -50.0, 10),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_contains() {
        let ladder = generate_strike_ladder(20_000.0, 50.0, 15).unwrap();

        assert!(ladder.contains(20_050.0));
        assert!(ladder.contains(19_250.0));
        assert!(ladder.contains(20_750.0));
        assert!(!ladder.contains(20_025.0));
        assert!(!ladder.contains(20_800.0));
        assert!(!ladder.contains(50_000.0));
        assert!(!ladder.contains(f64::NAN));

        assert_eq!(ladder.min_strike(), Some(19_250.0));
        assert_eq!(ladder.max_strike(), Some(20_750.0));
    }

    #[test]
    fn test_contains_fractional_gap() {
        let ladder = generate_strike_ladder(100.0, 2.5, 4).unwrap();
        assert!(ladder.contains(102.5));
        assert!(!ladder.contains(101.0));
    }
}
