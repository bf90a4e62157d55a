//! Strategy risk metrics derived from the payoff curve.

use super::greeks::aggregate_greeks;
use super::payoff::{pnl_at, tail_exposure};
use crate::types::{
    Action, Bound, OptionLeg, OptionType, PayoffPoint, RiskReward, StrategyMetrics, UnderlyingSnapshot,
};
use crate::{Error, Result};

/// Tail slopes smaller than this are treated as flat.
const SLOPE_EPSILON: f64 = 1e-9;

/// Probability-of-profit points per unit of profit zone width in expected moves.
const POP_SCALE: f64 = 25.0;
const POP_MIN: f64 = 10.0;
const POP_MAX: f64 = 90.0;

/// Derive the risk summary of `legs` from their payoff curve.
///
/// # Arguments
///
/// * `legs` - Positions the curve was generated from
/// * `curve` - Output of [`super::generate_payoff_curve`] for the same legs
/// * `snapshot` - Market parameters
/// * `margin_rate` - Fraction of notional held against naked short legs
///
/// # Returns
///
/// `StrategyMetrics`; an empty leg set yields all-zero metrics.
pub fn calculate_metrics(
    legs: &[OptionLeg],
    curve: &[PayoffPoint],
    snapshot: &UnderlyingSnapshot,
    margin_rate: f64,
) -> Result<StrategyMetrics> {
    if legs.is_empty() {
        return Ok(StrategyMetrics::empty());
    }
    if curve.is_empty() {
        return Err(Error::InvalidInput(
            "Payoff curve must have at least one point".to_string(),
        ));
    }

    let lot_size = snapshot.lot_size;
    let net_premium: f64 = legs.iter().map(|leg| leg.premium_flow(lot_size)).sum();
    let (net_credit, net_debit) = if net_premium > 0.0 {
        (net_premium, 0.0)
    } else {
        (0.0, net_premium.abs())
    };

    let (sampled_max, sampled_min) = curve.iter().fold(
        (f64::NEG_INFINITY, f64::INFINITY),
        |(max, min), point| (max.max(point.pnl), min.min(point.pnl)),
    );

    let tail = tail_exposure(legs, lot_size);
    let upside_profit = tail.upside_slope > SLOPE_EPSILON;
    let upside_loss = tail.upside_slope < -SLOPE_EPSILON;
    let downside_profit = tail.downside_slope > SLOPE_EPSILON;
    let downside_loss = tail.downside_slope < -SLOPE_EPSILON;

    let max_profit = if upside_profit || downside_profit {
        Bound::Unbounded
    } else {
        Bound::Bounded(sampled_max)
    };
    let max_loss = if upside_loss || downside_loss {
        Bound::Unbounded
    } else {
        Bound::Bounded(sampled_min)
    };
    if max_profit.is_unbounded() || max_loss.is_unbounded() {
        tracing::trace!(
            upside_slope = tail.upside_slope,
            downside_slope = tail.downside_slope,
            "Open-ended tail exposure"
        );
    }

    let breakevens = find_breakevens(curve);
    let pnl_at_spot = pnl_at(legs, snapshot.spot_price, lot_size);

    Ok(StrategyMetrics {
        net_credit,
        net_debit,
        max_profit,
        max_loss,
        probability_of_profit: probability_of_profit(&breakevens, pnl_at_spot, snapshot),
        breakevens,
        risk_reward_ratio: risk_reward(max_profit, max_loss),
        required_margin: required_margin(legs, snapshot, net_debit, margin_rate),
        greeks: aggregate_greeks(legs, snapshot),
        tail,
    })
}

/// Zero crossings of the sampled curve, in ascending price order.
///
/// A crossing is a consecutive pair where one P&L is negative and the other
/// is not; its price is found by linear interpolation between the pair.
pub fn find_breakevens(curve: &[PayoffPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let crosses = (a.pnl < 0.0 && b.pnl >= 0.0) || (a.pnl >= 0.0 && b.pnl < 0.0);
            if !crosses {
                return None;
            }
            let weight = a.pnl.abs() / (a.pnl.abs() + b.pnl.abs());
            Some(a.price + (b.price - a.price) * weight)
        })
        .collect()
}

/// Heuristic probability of profit in percent.
///
/// Compares the width of the profit zone (outermost breakevens, or two
/// expected moves when there are fewer than two) against the one-sigma
/// expected move and maps it onto 10-90%. This is a display aid with no
/// statistical grounding; do not read it as a real probability.
pub fn probability_of_profit(
    breakevens: &[f64],
    pnl_at_spot: f64,
    snapshot: &UnderlyingSnapshot,
) -> f64 {
    let expected_move = snapshot.expected_move();
    if expected_move <= 0.0 {
        // The underlying is not expected to move: it either pays at spot or it doesn't
        return if pnl_at_spot >= 0.0 { POP_MAX } else { POP_MIN };
    }

    let profit_zone_width = match (breakevens.first(), breakevens.last()) {
        (Some(lo), Some(hi)) if breakevens.len() >= 2 => hi - lo,
        _ => 2.0 * expected_move,
    };

    (profit_zone_width / expected_move * POP_SCALE).clamp(POP_MIN, POP_MAX)
}

/// `|max_profit / max_loss|`, with explicit sentinels for the open-ended cases.
pub fn risk_reward(max_profit: Bound, max_loss: Bound) -> RiskReward {
    match (max_profit, max_loss) {
        (_, Bound::Bounded(loss)) if loss == 0.0 => RiskReward::Undefined,
        (Bound::Bounded(profit), Bound::Bounded(loss)) => RiskReward::Ratio((profit / loss).abs()),
        (Bound::Unbounded, Bound::Bounded(_)) => RiskReward::Unbounded,
        (Bound::Bounded(_), Bound::Unbounded) => RiskReward::Ratio(0.0),
        (Bound::Unbounded, Bound::Unbounded) => RiskReward::Undefined,
    }
}

/// Whether any option type has more lots sold than bought.
pub fn has_naked_short(legs: &[OptionLeg]) -> bool {
    [OptionType::Call, OptionType::Put].into_iter().any(|option_type| {
        let net_lots: i64 = legs
            .iter()
            .filter(|leg| leg.option_type == option_type)
            .map(|leg| match leg.action {
                Action::Buy => i64::from(leg.lots),
                Action::Sell => -i64::from(leg.lots),
            })
            .sum();
        net_lots < 0
    })
}

/// Heuristic margin requirement.
///
/// Naked short exposure is margined at `margin_rate` of one lot's notional
/// times the largest leg's lot count. Fully paid positions need only the
/// debit.
pub fn required_margin(
    legs: &[OptionLeg],
    snapshot: &UnderlyingSnapshot,
    net_debit: f64,
    margin_rate: f64,
) -> f64 {
    if !has_naked_short(legs) {
        return net_debit;
    }

    let max_lots = legs.iter().map(|leg| leg.lots).max().unwrap_or(0);
    let notional = snapshot.spot_price * snapshot.lot_size as f64;
    notional * max_lots as f64 * margin_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(price: f64, pnl: f64) -> PayoffPoint {
        PayoffPoint { price, pnl }
    }

    fn snapshot() -> UnderlyingSnapshot {
        UnderlyingSnapshot::new(20_000.0, 50, 15.0, 30.0).unwrap()
    }

    #[test]
    fn test_find_breakevens_interpolates() {
        let curve = vec![point(100.0, -30.0), point(110.0, 10.0), point(120.0, 20.0)];
        let breakevens = find_breakevens(&curve);

        assert_eq!(breakevens.len(), 1);
        assert_relative_eq!(breakevens[0], 107.5);
    }

    #[test]
    fn test_find_breakevens_both_directions() {
        let curve = vec![
            point(1.0, -5.0),
            point(2.0, 5.0),
            point(3.0, 5.0),
            point(4.0, -5.0),
        ];
        let breakevens = find_breakevens(&curve);

        assert_eq!(breakevens, vec![1.5, 3.5]);
    }

    #[test]
    fn test_find_breakevens_zero_is_non_negative() {
        let curve = vec![point(1.0, -2.0), point(2.0, 0.0), point(3.0, 4.0)];
        assert_eq!(find_breakevens(&curve), vec![2.0]);

        let flat = vec![point(1.0, 0.0), point(2.0, 0.0)];
        assert!(find_breakevens(&flat).is_empty());
    }

    #[test]
    fn test_risk_reward_cases() {
        assert_eq!(
            risk_reward(Bound::Bounded(5000.0), Bound::Bounded(-2500.0)),
            RiskReward::Ratio(2.0)
        );
        assert_eq!(
            risk_reward(Bound::Bounded(5000.0), Bound::Bounded(0.0)),
            RiskReward::Undefined
        );
        assert_eq!(
            risk_reward(Bound::Unbounded, Bound::Bounded(-100.0)),
            RiskReward::Unbounded
        );
        assert_eq!(
            risk_reward(Bound::Bounded(100.0), Bound::Unbounded),
            RiskReward::Ratio(0.0)
        );
        assert_eq!(
            risk_reward(Bound::Unbounded, Bound::Unbounded),
            RiskReward::Undefined
        );
    }

    #[test]
    fn test_probability_of_profit_default_zone() {
        // Fewer than two breakevens: width = 2 expected moves -> 50%
        let pop = probability_of_profit(&[20_300.0], -1.0, &snapshot());
        assert_relative_eq!(pop, 50.0);
    }

    #[test]
    fn test_probability_of_profit_clamped() {
        let snap = snapshot();
        let em = snap.expected_move();

        let narrow = probability_of_profit(&[20_000.0, 20_000.0 + em * 0.1], 1.0, &snap);
        assert_eq!(narrow, POP_MIN);

        let wide = probability_of_profit(&[20_000.0 - 3.0 * em, 20_000.0 + 3.0 * em], 1.0, &snap);
        assert_eq!(wide, POP_MAX);
    }

    #[test]
    fn test_probability_of_profit_without_expected_move() {
        let expiring = UnderlyingSnapshot::new(20_000.0, 50, 15.0, 0.0).unwrap();
        assert_eq!(probability_of_profit(&[], 10.0, &expiring), POP_MAX);
        assert_eq!(probability_of_profit(&[], -10.0, &expiring), POP_MIN);
    }

    #[test]
    fn test_naked_short_detection() {
        let covered = vec![
            OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0),
            OptionLeg::new(20_200.0, OptionType::Call, Action::Sell, 1, 200.0, 15.0),
        ];
        assert!(!has_naked_short(&covered));

        let ratio = vec![
            OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0),
            OptionLeg::new(20_200.0, OptionType::Call, Action::Sell, 2, 200.0, 15.0),
        ];
        assert!(has_naked_short(&ratio));

        let cross_type = vec![
            OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0),
            OptionLeg::new(20_000.0, OptionType::Put, Action::Sell, 1, 300.0, 15.0),
        ];
        assert!(has_naked_short(&cross_type));
    }

    #[test]
    fn test_required_margin() {
        let snap = snapshot();
        let naked = vec![
            OptionLeg::new(20_000.0, OptionType::Put, Action::Sell, 2, 300.0, 15.0),
            OptionLeg::new(19_800.0, OptionType::Put, Action::Buy, 1, 200.0, 15.0),
        ];
        // 20000 * 50 * 2 lots * 15%
        assert_relative_eq!(required_margin(&naked, &snap, 0.0, 0.15), 300_000.0);

        let long_only = vec![OptionLeg::new(20_000.0, OptionType::Put, Action::Buy, 1, 300.0, 15.0)];
        assert_relative_eq!(required_margin(&long_only, &snap, 15_000.0, 0.15), 15_000.0);
    }

    #[test]
    fn test_empty_legs_zero_metrics() {
        let curve = vec![point(1.0, 0.0), point(2.0, 0.0)];
        let metrics = calculate_metrics(&[], &curve, &snapshot(), 0.15).unwrap();
        assert_eq!(metrics, StrategyMetrics::empty());
    }

    #[test]
    fn test_empty_curve_rejected() {
        let legs = vec![OptionLeg::new(20_000.0, OptionType::Call, Action::Buy, 1, 300.0, 15.0)];
        let result = calculate_metrics(&legs, &[], &snapshot(), 0.15);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
