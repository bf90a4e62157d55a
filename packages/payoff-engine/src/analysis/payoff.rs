//! Expiry payoff curve generation.

use crate::config::{validate_range_fraction, validate_sample_count};
use crate::types::{OptionLeg, OptionType, PayoffPoint, TailExposure};
use crate::{Error, Result};

/// Aggregate expiry P&L of `legs` if the underlying settles at `price`.
pub fn pnl_at(legs: &[OptionLeg], price: f64, lot_size: u32) -> f64 {
    legs.iter().map(|leg| leg.expiry_pnl(price, lot_size)).sum()
}

/// Sample the expiry P&L of `legs` across `spot * (1 ± range_fraction)`.
///
/// # Arguments
///
/// * `legs` - Positions to evaluate (may be empty)
/// * `spot_price` - Current price of the underlying
/// * `lot_size` - Contract multiplier
/// * `range_fraction` - Half-width of the window as a fraction of spot, in (0, 1)
/// * `sample_count` - Number of points, at least 2
///
/// # Returns
///
/// `sample_count` points with strictly increasing prices whose first and last
/// prices are exactly the window bounds. An empty leg set gives a flat zero curve.
pub fn generate_payoff_curve(
    legs: &[OptionLeg],
    spot_price: f64,
    lot_size: u32,
    range_fraction: f64,
    sample_count: usize,
) -> Result<Vec<PayoffPoint>> {
    if !(spot_price.is_finite() && spot_price > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Spot price must be positive, got {}",
            spot_price
        )));
    }
    if lot_size == 0 {
        return Err(Error::InvalidInput("Lot size must be positive".to_string()));
    }
    validate_range_fraction(range_fraction)?;
    validate_sample_count(sample_count)?;

    let min_price = spot_price * (1.0 - range_fraction);
    let max_price = spot_price * (1.0 + range_fraction);
    let step = (max_price - min_price) / (sample_count - 1) as f64;

    let curve = (0..sample_count)
        .map(|i| {
            // Pin the last sample so the window end is exact
            let price = if i == sample_count - 1 {
                max_price
            } else {
                min_price + i as f64 * step
            };
            PayoffPoint {
                price,
                pnl: pnl_at(legs, price, lot_size),
            }
        })
        .collect();

    Ok(curve)
}

/// Slope of the payoff beyond the outermost strikes.
///
/// Above every strike only calls are in the money, so the upside slope is the
/// net signed call units. Below every strike only puts are, and each unit the
/// price falls adds the net signed put units to P&L.
pub fn tail_exposure(legs: &[OptionLeg], lot_size: u32) -> TailExposure {
    legs.iter().fold(TailExposure::default(), |mut tail, leg| {
        let units = leg.signed_units(lot_size);
        match leg.option_type {
            OptionType::Call => tail.upside_slope += units,
            OptionType::Put => tail.downside_slope += units,
        }
        tail
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_spans_window() {
        let legs = vec![OptionLeg::new(100.0, OptionType::Call, Action::Buy, 1, 4.0, 20.0)];
        let curve = generate_payoff_curve(&legs, 100.0, 10, 0.2, 101).unwrap();

        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0].price, 100.0 * (1.0 - 0.2));
        assert_eq!(curve[100].price, 100.0 * (1.0 + 0.2));
        assert!(curve.windows(2).all(|w| w[0].price < w[1].price));
    }

    #[test]
    fn test_curve_values() {
        let legs = vec![OptionLeg::new(100.0, OptionType::Put, Action::Buy, 2, 4.0, 20.0)];
        let curve = generate_payoff_curve(&legs, 100.0, 10, 0.2, 5).unwrap();

        // Prices 80, 90, 100, 110, 120
        assert_relative_eq!(curve[0].pnl, (20.0 - 4.0) * 20.0, epsilon = 1e-9);
        assert_relative_eq!(curve[1].pnl, (10.0 - 4.0) * 20.0, epsilon = 1e-9);
        assert_relative_eq!(curve[4].pnl, -4.0 * 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_legs_flat_zero() {
        let curve = generate_payoff_curve(&[], 20_000.0, 50, 0.15, 101).unwrap();
        assert_eq!(curve.len(), 101);
        assert!(curve.iter().all(|p| p.pnl == 0.0));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(generate_payoff_curve(&[], 0.0, 50, 0.15, 101).is_err());
        assert!(generate_payoff_curve(&[], 100.0, 0, 0.15, 101).is_err());
        assert!(generate_payoff_curve(&[], 100.0, 50, 0.0, 101).is_err());
        assert!(generate_payoff_curve(&[], 100.0, 50, 1.0, 101).is_err());
        assert!(generate_payoff_curve(&[], 100.0, 50, 0.15, 1).is_err());
    }

    #[test]
    fn test_tail_exposure() {
        let legs = vec![
            OptionLeg::new(100.0, OptionType::Call, Action::Buy, 1, 4.0, 20.0),
            OptionLeg::new(110.0, OptionType::Call, Action::Sell, 2, 1.0, 20.0),
            OptionLeg::new(90.0, OptionType::Put, Action::Buy, 3, 1.0, 20.0),
        ];
        let tail = tail_exposure(&legs, 10);

        assert_eq!(tail.upside_slope, -10.0);
        assert_eq!(tail.downside_slope, 30.0);
    }
}
