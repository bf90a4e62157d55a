//! Built-in option strategy templates.

use crate::types::{Action, OptionType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use Action::{Buy, Sell};
use OptionType::{Call, Put};
use StrategyCategory::{Bearish, Bullish, Neutral, Volatile};

/// Market view a strategy expresses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StrategyCategory {
    Bullish,
    Bearish,
    Neutral,
    Volatile,
}

/// One leg of a template, expressed relative to the ATM strike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemplateLeg {
    /// Offset from ATM in strike-gap ticks (e.g. 2 = two strikes above ATM)
    pub strike_offset: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Buy or sell
    pub action: Action,
    /// Number of lots
    pub lots: u32,
}

impl TemplateLeg {
    const fn new(strike_offset: f64, option_type: OptionType, action: Action, lots: u32) -> Self {
        Self {
            strike_offset,
            option_type,
            action,
            lots,
        }
    }
}

/// Named multi-leg strategy definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyTemplate {
    /// Strategy identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Market view
    pub category: StrategyCategory,
    /// Description of how the strategy works
    #[serde(default)]
    pub description: String,
    /// Legs relative to ATM
    pub legs: Vec<TemplateLeg>,
}

impl StrategyTemplate {
    /// Reject templates that cannot be expanded into a complete leg set.
    pub fn validate(&self) -> Result<()> {
        if self.legs.is_empty() {
            return Err(Error::MalformedTemplate(format!(
                "Template '{}' has no legs",
                self.id
            )));
        }

        for (i, leg) in self.legs.iter().enumerate() {
            if !leg.strike_offset.is_finite() || leg.strike_offset.fract() != 0.0 {
                return Err(Error::MalformedTemplate(format!(
                    "Template '{}' leg {} has invalid strike offset {}",
                    self.id,
                    i + 1,
                    leg.strike_offset
                )));
            }
            if leg.lots == 0 {
                return Err(Error::MalformedTemplate(format!(
                    "Template '{}' leg {} has zero lots",
                    self.id,
                    i + 1
                )));
            }
        }

        Ok(())
    }
}

fn template(
    id: &str,
    name: &str,
    category: StrategyCategory,
    description: &str,
    legs: &[TemplateLeg],
) -> (String, StrategyTemplate) {
    (
        id.to_string(),
        StrategyTemplate {
            id: id.to_string(),
            name: name.to_string(),
            category,
            description: description.to_string(),
            legs: legs.to_vec(),
        },
    )
}

/// Built-in strategy templates.
pub static BUILTIN_TEMPLATES: LazyLock<HashMap<String, StrategyTemplate>> = LazyLock::new(|| {
    HashMap::from([
        template(
            "long_call",
            "Long Call",
            Bullish,
            "Buy an ATM call; limited loss, unlimited upside",
            &[TemplateLeg::new(0.0, Call, Buy, 1)],
        ),
        template(
            "long_put",
            "Long Put",
            Bearish,
            "Buy an ATM put; profits as the underlying falls",
            &[TemplateLeg::new(0.0, Put, Buy, 1)],
        ),
        template(
            "short_call",
            "Short Call",
            Bearish,
            "Sell an ATM call; collect premium, unlimited upside risk",
            &[TemplateLeg::new(0.0, Call, Sell, 1)],
        ),
        template(
            "short_put",
            "Short Put",
            Bullish,
            "Sell an ATM put; collect premium, large downside risk",
            &[TemplateLeg::new(0.0, Put, Sell, 1)],
        ),
        template(
            "bull_call_spread",
            "Bull Call Spread",
            Bullish,
            "Buy ATM call, sell a higher call; capped profit and loss",
            &[
                TemplateLeg::new(0.0, Call, Buy, 1),
                TemplateLeg::new(2.0, Call, Sell, 1),
            ],
        ),
        template(
            "bear_put_spread",
            "Bear Put Spread",
            Bearish,
            "Buy ATM put, sell a lower put; capped profit and loss",
            &[
                TemplateLeg::new(0.0, Put, Buy, 1),
                TemplateLeg::new(-2.0, Put, Sell, 1),
            ],
        ),
        template(
            "bull_put_spread",
            "Bull Put Spread",
            Bullish,
            "Sell ATM put, buy a lower put; credit spread",
            &[
                TemplateLeg::new(0.0, Put, Sell, 1),
                TemplateLeg::new(-2.0, Put, Buy, 1),
            ],
        ),
        template(
            "bear_call_spread",
            "Bear Call Spread",
            Bearish,
            "Sell ATM call, buy a higher call; credit spread",
            &[
                TemplateLeg::new(0.0, Call, Sell, 1),
                TemplateLeg::new(2.0, Call, Buy, 1),
            ],
        ),
        template(
            "long_straddle",
            "Long Straddle",
            Volatile,
            "Buy ATM call and put; profits from a large move either way",
            &[
                TemplateLeg::new(0.0, Call, Buy, 1),
                TemplateLeg::new(0.0, Put, Buy, 1),
            ],
        ),
        template(
            "short_straddle",
            "Short Straddle",
            Neutral,
            "Sell ATM call and put; profits if the underlying stays pinned",
            &[
                TemplateLeg::new(0.0, Call, Sell, 1),
                TemplateLeg::new(0.0, Put, Sell, 1),
            ],
        ),
        template(
            "long_strangle",
            "Long Strangle",
            Volatile,
            "Buy OTM call and OTM put; cheaper than a straddle, needs a bigger move",
            &[
                TemplateLeg::new(2.0, Call, Buy, 1),
                TemplateLeg::new(-2.0, Put, Buy, 1),
            ],
        ),
        template(
            "short_strangle",
            "Short Strangle",
            Neutral,
            "Sell OTM call and OTM put; wider profit zone than a short straddle",
            &[
                TemplateLeg::new(2.0, Call, Sell, 1),
                TemplateLeg::new(-2.0, Put, Sell, 1),
            ],
        ),
        template(
            "iron_condor",
            "Iron Condor",
            Neutral,
            "Short strangle protected by further OTM wings; defined risk",
            &[
                TemplateLeg::new(-4.0, Put, Buy, 1),
                TemplateLeg::new(-2.0, Put, Sell, 1),
                TemplateLeg::new(2.0, Call, Sell, 1),
                TemplateLeg::new(4.0, Call, Buy, 1),
            ],
        ),
        template(
            "iron_butterfly",
            "Iron Butterfly",
            Neutral,
            "Short straddle protected by OTM wings; defined risk",
            &[
                TemplateLeg::new(-2.0, Put, Buy, 1),
                TemplateLeg::new(0.0, Put, Sell, 1),
                TemplateLeg::new(0.0, Call, Sell, 1),
                TemplateLeg::new(2.0, Call, Buy, 1),
            ],
        ),
        template(
            "long_call_butterfly",
            "Long Call Butterfly",
            Neutral,
            "Buy one lower and one upper call, sell two ATM calls",
            &[
                TemplateLeg::new(-2.0, Call, Buy, 1),
                TemplateLeg::new(0.0, Call, Sell, 2),
                TemplateLeg::new(2.0, Call, Buy, 1),
            ],
        ),
    ])
});

/// List all built-in templates, ordered by id.
pub fn list_templates() -> Vec<StrategyTemplate> {
    let mut templates: Vec<_> = BUILTIN_TEMPLATES.values().cloned().collect();
    templates.sort_by(|a, b| a.id.cmp(&b.id));
    templates
}

/// Get a specific template by ID.
pub fn get_template(id: &str) -> Option<StrategyTemplate> {
    BUILTIN_TEMPLATES.get(&id.to_lowercase()).cloned()
}

/// Validate that a template exists.
pub fn is_valid_template(id: &str) -> bool {
    BUILTIN_TEMPLATES.contains_key(&id.to_lowercase())
}

/// Get all template IDs.
pub fn template_ids() -> Vec<String> {
    BUILTIN_TEMPLATES.keys().cloned().collect()
}

/// Templates expressing the given market view.
pub fn templates_by_category(category: StrategyCategory) -> Vec<StrategyTemplate> {
    list_templates()
        .into_iter()
        .filter(|t| t.category == category)
        .collect()
}
