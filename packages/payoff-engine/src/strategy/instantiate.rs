//! Expansion of strategy templates into priced legs.

use super::catalog::StrategyTemplate;
use crate::pricing::estimate_premium;
use crate::types::{OptionLeg, UnderlyingSnapshot};
use crate::{Error, Result};

/// Expand a template into concrete legs, in template order.
///
/// Each leg's strike is `atm_strike + strike_offset * strike_gap` and its
/// premium comes from [`estimate_premium`] with the snapshot's IV and days to
/// expiry. Either every leg is produced or the call fails; a malformed
/// template never yields a partial leg set.
pub fn instantiate_template(
    template: &StrategyTemplate,
    atm_strike: f64,
    strike_gap: f64,
    snapshot: &UnderlyingSnapshot,
) -> Result<Vec<OptionLeg>> {
    snapshot.validate()?;
    if !(atm_strike.is_finite() && atm_strike > 0.0) {
        return Err(Error::InvalidInput(format!(
            "ATM strike must be positive, got {}",
            atm_strike
        )));
    }
    if !(strike_gap.is_finite() && strike_gap > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Strike gap must be positive, got {}",
            strike_gap
        )));
    }
    template.validate()?;

    let legs = template
        .legs
        .iter()
        .map(|tl| {
            let strike = atm_strike + tl.strike_offset * strike_gap;
            if strike <= 0.0 {
                return Err(Error::MalformedTemplate(format!(
                    "Template '{}' places a leg at non-positive strike {}",
                    template.id, strike
                )));
            }

            let premium = estimate_premium(
                snapshot.spot_price,
                strike,
                tl.option_type,
                snapshot.implied_volatility,
                snapshot.days_to_expiry,
            )?;

            Ok(OptionLeg::new(
                strike,
                tl.option_type,
                tl.action,
                tl.lots,
                premium,
                snapshot.implied_volatility,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        template = %template.id,
        atm_strike,
        legs = legs.len(),
        "Instantiated strategy template"
    );

    Ok(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::catalog::{get_template, StrategyCategory, TemplateLeg};
    use crate::types::{Action, OptionType};

    fn snapshot() -> UnderlyingSnapshot {
        UnderlyingSnapshot::new(20_010.0, 50, 15.0, 30.0).unwrap()
    }

    #[test]
    fn test_iron_condor_strikes() {
        let template = get_template("iron_condor").unwrap();
        let legs = instantiate_template(&template, 20_000.0, 50.0, &snapshot()).unwrap();

        let strikes: Vec<f64> = legs.iter().map(|l| l.strike).collect();
        assert_eq!(strikes, vec![19_800.0, 19_900.0, 20_100.0, 20_200.0]);
        assert_eq!(legs[0].option_type, OptionType::Put);
        assert_eq!(legs[0].action, Action::Buy);
        assert_eq!(legs[3].option_type, OptionType::Call);
    }

    #[test]
    fn test_legs_are_priced_with_snapshot() {
        let snap = snapshot();
        let template = get_template("bull_call_spread").unwrap();
        let legs = instantiate_template(&template, 20_000.0, 50.0, &snap).unwrap();

        for leg in &legs {
            let expected = estimate_premium(
                snap.spot_price,
                leg.strike,
                leg.option_type,
                snap.implied_volatility,
                snap.days_to_expiry,
            )
            .unwrap();
            assert_eq!(leg.premium, expected);
            assert_eq!(leg.implied_volatility, 15.0);
        }
        assert_ne!(legs[0].id, legs[1].id);
    }

    #[test]
    fn test_lots_carried_over() {
        let template = get_template("long_call_butterfly").unwrap();
        let legs = instantiate_template(&template, 20_000.0, 50.0, &snapshot()).unwrap();
        let lots: Vec<u32> = legs.iter().map(|l| l.lots).collect();
        assert_eq!(lots, vec![1, 2, 1]);
    }

    #[test]
    fn test_malformed_template_rejected_whole() {
        let template = StrategyTemplate {
            id: "broken".to_string(),
            name: "Broken".to_string(),
            category: StrategyCategory::Neutral,
            description: String::new(),
            legs: vec![
                TemplateLeg {
                    strike_offset: 0.0,
                    option_type: OptionType::Call,
                    action: Action::Buy,
                    lots: 1,
                },
                TemplateLeg {
                    strike_offset: f64::INFINITY,
                    option_type: OptionType::Call,
                    action: Action::Sell,
                    lots: 1,
                },
            ],
        };

        let result = instantiate_template(&template, 20_000.0, 50.0, &snapshot());
        assert!(matches!(result, Err(Error::MalformedTemplate(_))));
    }

    #[test]
    fn test_strike_below_zero_rejected() {
        let template = get_template("iron_condor").unwrap();
        let snap = UnderlyingSnapshot::new(100.0, 100, 20.0, 30.0).unwrap();

        let result = instantiate_template(&template, 100.0, 50.0, &snap);
        assert!(matches!(result, Err(Error::MalformedTemplate(_))));
    }

    #[test]
    fn test_invalid_gap() {
        let template = get_template("long_call").unwrap();
        let result = instantiate_template(&template, 20_000.0, 0.0, &snapshot());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
