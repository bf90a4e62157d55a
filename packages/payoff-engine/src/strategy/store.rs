//! Editable, ordered collection of strategy legs.

use super::catalog::StrategyTemplate;
use super::instantiate::instantiate_template;
use crate::analysis::compute_payoff_and_metrics_with;
use crate::config::EngineConfig;
use crate::pricing::{estimate_premium, generate_strike_ladder, StrikeLadder};
use crate::types::{Action, LegId, OptionLeg, OptionType, StrategyAnalysis, UnderlyingSnapshot};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Partial edit of a leg. `None` fields are left as they are.
///
/// Premium is not editable: a changed `strike` or `option_type` re-estimates
/// it, while `action` and `lots` edits keep it as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lots: Option<u32>,
}

/// Leg store bound to one underlying snapshot and strike ladder.
#[derive(Debug, Clone)]
pub struct LegStore {
    /// Legs in insertion order
    legs: Vec<OptionLeg>,
    /// Market parameters used for re-pricing
    snapshot: UnderlyingSnapshot,
    /// Ladder spacing
    strike_gap: f64,
    /// Strikes on each side of ATM
    ladder_half_width: u32,
    /// Strikes a leg may use, regenerated with the snapshot
    ladder: StrikeLadder,
}

impl LegStore {
    /// Create an empty store whose legs must sit on the
    /// `ladder_half_width`-wide ladder around the snapshot's spot.
    pub fn new(
        snapshot: UnderlyingSnapshot,
        strike_gap: f64,
        ladder_half_width: u32,
    ) -> Result<Self> {
        snapshot.validate()?;
        let ladder = generate_strike_ladder(snapshot.spot_price, strike_gap, ladder_half_width)?;

        Ok(Self {
            legs: Vec::new(),
            snapshot,
            strike_gap,
            ladder_half_width,
            ladder,
        })
    }

    /// Create an empty store using the ladder settings from `config`.
    pub fn with_config(snapshot: UnderlyingSnapshot, config: &EngineConfig) -> Result<Self> {
        Self::new(snapshot, config.strike_gap, config.ladder_half_width)
    }

    pub fn snapshot(&self) -> &UnderlyingSnapshot {
        &self.snapshot
    }

    pub fn strike_gap(&self) -> f64 {
        self.strike_gap
    }

    /// Strikes new and edited legs may use.
    pub fn ladder(&self) -> &StrikeLadder {
        &self.ladder
    }

    /// Replace the snapshot and re-centre the ladder on its spot.
    ///
    /// Existing legs and premiums are kept, even if their strikes are now
    /// off the ladder; see [`LegStore::reprice_all`].
    pub fn set_snapshot(&mut self, snapshot: UnderlyingSnapshot) -> Result<()> {
        snapshot.validate()?;
        let ladder =
            generate_strike_ladder(snapshot.spot_price, self.strike_gap, self.ladder_half_width)?;

        self.snapshot = snapshot;
        self.ladder = ladder;
        Ok(())
    }

    /// Re-estimate every premium against the current snapshot.
    pub fn reprice_all(&mut self) -> Result<()> {
        let premiums = self
            .legs
            .iter()
            .map(|leg| self.estimate(leg.strike, leg.option_type))
            .collect::<Result<Vec<_>>>()?;

        for (leg, premium) in self.legs.iter_mut().zip(premiums) {
            leg.premium = premium;
            leg.implied_volatility = self.snapshot.implied_volatility;
        }
        tracing::debug!(legs = self.legs.len(), "Re-priced all legs");
        Ok(())
    }

    /// All legs in insertion order.
    pub fn legs(&self) -> &[OptionLeg] {
        &self.legs
    }

    /// Look up a leg by id.
    pub fn get(&self, id: LegId) -> Option<&OptionLeg> {
        self.legs.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Append a pre-built leg, keeping its premium.
    pub fn add(&mut self, leg: OptionLeg) -> Result<LegId> {
        leg.validate()?;
        self.check_strike(leg.strike)?;
        if self.get(leg.id).is_some() {
            return Err(Error::InvalidInput(format!(
                "Leg {} is already in the store",
                leg.id
            )));
        }

        let id = leg.id;
        tracing::debug!(
            leg = %id,
            strike = leg.strike,
            option_type = %leg.option_type,
            "Added leg"
        );
        self.legs.push(leg);
        Ok(id)
    }

    /// Create, price and append a new leg.
    pub fn add_priced(
        &mut self,
        strike: f64,
        option_type: OptionType,
        action: Action,
        lots: u32,
    ) -> Result<LegId> {
        self.check_strike(strike)?;
        let premium = self.estimate(strike, option_type)?;
        let leg = OptionLeg::new(
            strike,
            option_type,
            action,
            lots,
            premium,
            self.snapshot.implied_volatility,
        );
        self.add(leg)
    }

    /// Apply a partial edit to a leg.
    ///
    /// Validation happens before anything is written, so a rejected edit
    /// leaves the leg untouched.
    pub fn update(&mut self, id: LegId, update: LegUpdate) -> Result<&OptionLeg> {
        let idx = self.index_of(id)?;
        let current = &self.legs[idx];

        let strike = update.strike.unwrap_or(current.strike);
        let option_type = update.option_type.unwrap_or(current.option_type);
        let structural = strike != current.strike || option_type != current.option_type;

        let mut next = OptionLeg {
            strike,
            option_type,
            action: update.action.unwrap_or(current.action),
            lots: update.lots.unwrap_or(current.lots),
            ..current.clone()
        };

        if structural {
            self.check_strike(strike)?;
            next.premium = self.estimate(strike, option_type)?;
            next.implied_volatility = self.snapshot.implied_volatility;
            tracing::debug!(leg = %id, premium = next.premium, "Re-estimated premium");
        }
        next.validate()?;

        self.legs[idx] = next;
        Ok(&self.legs[idx])
    }

    /// Remove a leg, returning it. Other legs are not affected.
    pub fn remove(&mut self, id: LegId) -> Result<OptionLeg> {
        let idx = self.index_of(id)?;
        tracing::debug!(leg = %id, "Removed leg");
        Ok(self.legs.remove(idx))
    }

    /// Remove every leg.
    pub fn reset(&mut self) {
        tracing::debug!(legs = self.legs.len(), "Reset leg store");
        self.legs.clear();
    }

    /// Replace the contents with a freshly instantiated template at the current ATM strike.
    ///
    /// Every leg must land on the ladder; otherwise the store keeps its
    /// previous legs.
    pub fn load_template(&mut self, template: &StrategyTemplate) -> Result<&[OptionLeg]> {
        let legs = instantiate_template(
            template,
            self.ladder.atm_strike,
            self.strike_gap,
            &self.snapshot,
        )?;
        for leg in &legs {
            self.check_strike(leg.strike)?;
        }

        tracing::debug!(template = %template.id, legs = legs.len(), "Loaded template");
        self.legs = legs;
        Ok(self.legs.as_slice())
    }

    /// Payoff curve and metrics of the current legs.
    pub fn analyze(&self, config: &EngineConfig) -> Result<StrategyAnalysis> {
        compute_payoff_and_metrics_with(&self.legs, &self.snapshot, config)
    }

    fn index_of(&self, id: LegId) -> Result<usize> {
        self.legs
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::LegNotFound(id.to_string()))
    }

    fn check_strike(&self, strike: f64) -> Result<()> {
        if !self.ladder.contains(strike) {
            return Err(Error::InvalidInput(format!(
                "Strike {} is not on the ladder ({:?} to {:?}, gap {})",
                strike,
                self.ladder.min_strike(),
                self.ladder.max_strike(),
                self.strike_gap
            )));
        }
        Ok(())
    }

    fn estimate(&self, strike: f64, option_type: OptionType) -> Result<f64> {
        estimate_premium(
            self.snapshot.spot_price,
            strike,
            option_type,
            self.snapshot.implied_volatility,
            self.snapshot.days_to_expiry,
        )
    }
}
