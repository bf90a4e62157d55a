//! Illustrative Greek approximations.
//!
//! These follow the shape of real sensitivities (delta from moneyness, gamma
//! peaking at the money, theta as premium bleed, vega proportional to premium)
//! without a pricing model behind them. They are for display, not hedging.

use crate::pricing::distance_factor;
use crate::types::{Greeks, OptionLeg, OptionType, UnderlyingSnapshot};

/// Delta change per unit of relative moneyness around the 0.5 ATM value.
const DELTA_SLOPE: f64 = 5.0;

/// Per-unit gamma of an ATM option.
const GAMMA_PEAK: f64 = 0.002;

/// Share of the daily premium bleed reported as theta.
const THETA_SCALE: f64 = 0.5;

/// Vega as a fraction of premium.
const VEGA_FRACTION: f64 = 0.1;

/// Per-unit Greeks of a long position in `leg`.
pub fn leg_greeks(leg: &OptionLeg, snapshot: &UnderlyingSnapshot) -> Greeks {
    let spot = snapshot.spot_price;

    let moneyness = leg.option_type.moneyness(spot, leg.strike) / spot;
    let magnitude = (0.5 + moneyness * DELTA_SLOPE).clamp(0.0, 1.0);
    let delta = match leg.option_type {
        OptionType::Call => magnitude,
        OptionType::Put => -magnitude,
    };

    // Less than a day left still bleeds a full day's worth
    let days = snapshot.days_to_expiry.max(1.0);

    Greeks {
        delta,
        gamma: GAMMA_PEAK * distance_factor(spot, leg.strike),
        theta: -leg.premium / days * THETA_SCALE,
        vega: leg.premium * VEGA_FRACTION,
    }
}

/// Sum of leg Greeks, signed by direction and scaled by lots × lot size.
pub fn aggregate_greeks(legs: &[OptionLeg], snapshot: &UnderlyingSnapshot) -> Greeks {
    legs.iter().fold(Greeks::default(), |acc, leg| {
        acc + leg_greeks(leg, snapshot).scaled(leg.signed_units(snapshot.lot_size))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use approx::assert_relative_eq;

    fn snapshot() -> UnderlyingSnapshot {
        UnderlyingSnapshot::new(20_000.0, 50, 15.0, 20.0).unwrap()
    }

    #[test]
    fn test_atm_delta() {
        let call = OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0);
        let put = OptionLeg::new(20_000.0, OptionType::Put, Action::Buy, 1, 300.0, 15.0);

        assert_relative_eq!(leg_greeks(&call, &snapshot()).delta, 0.5);
        assert_relative_eq!(leg_greeks(&put, &snapshot()).delta, -0.5);
    }

    #[test]
    fn test_delta_clamped() {
        let deep_itm = OptionLeg::new(10_000.0, OptionType::Call, Action::Buy, 1, 10_000.0, 15.0);
        let deep_otm = OptionLeg::new(30_000.0, OptionType::Put, Action::Buy, 1, 10_000.0, 15.0);

        assert_eq!(leg_greeks(&deep_itm, &snapshot()).delta, 1.0);
        assert_eq!(leg_greeks(&deep_otm, &snapshot()).delta, -1.0);
    }

    #[test]
    fn test_gamma_peaks_atm() {
        let atm = OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0);
        let otm = OptionLeg::new(20_500.0, OptionType::Call, Action::Buy, 1, 100.0, 15.0);

        let atm_gamma = leg_greeks(&atm, &snapshot()).gamma;
        assert_relative_eq!(atm_gamma, GAMMA_PEAK);
        assert!(leg_greeks(&otm, &snapshot()).gamma < atm_gamma);
    }

    #[test]
    fn test_theta_and_vega() {
        let leg = OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0);
        let greeks = leg_greeks(&leg, &snapshot());

        assert_relative_eq!(greeks.theta, -300.0 / 20.0 * THETA_SCALE);
        assert_relative_eq!(greeks.vega, 30.0);
    }

    #[test]
    fn test_theta_at_expiry_is_finite() {
        let snapshot = UnderlyingSnapshot::new(20_000.0, 50, 15.0, 0.0).unwrap();
        let leg = OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 5.0, 15.0);
        assert!(leg_greeks(&leg, &snapshot).theta.is_finite());
    }

    #[test]
    fn test_short_straddle_aggregate() {
        let legs = vec![
            OptionLeg::new(20_000.0, OptionType::Call, Action::Sell, 1, 300.0, 15.0),
            OptionLeg::new(20_000.0, OptionType::Put, Action::Sell, 1, 300.0, 15.0),
        ];
        let greeks = aggregate_greeks(&legs, &snapshot());

        assert_relative_eq!(greeks.delta, 0.0);
        assert_relative_eq!(greeks.gamma, -2.0 * GAMMA_PEAK * 50.0);
        // Short premium collects theta and is short vega
        assert!(greeks.theta > 0.0);
        assert_relative_eq!(greeks.vega, -2.0 * 30.0 * 50.0);
    }
}
