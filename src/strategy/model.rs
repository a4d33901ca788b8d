//! Strategies: an underlying plus a list of legs, and their persisted shape.

use crate::strategy::chain::OptionChain;
use crate::strategy::error::{StrategyError, ensure_finite};
use crate::strategy::greeks::{AggregateGreeks, aggregate_greeks};
use crate::strategy::leg::{Leg, LegUpdate};
use crate::strategy::payoff::{PayoffCurve, PayoffSettings, breakevens, payoff_curve};
use crate::strategy::risk::{RiskMetrics, risk_metrics};
use crate::strategy::template::{QuoteWarning, StrategyTemplate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// Everything derived from a strategy snapshot. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StrategyAnalysis {
    /// Sampled expiration payoff.
    pub payoff: PayoffCurve,
    /// Prices where the payoff crosses zero.
    pub breakevens: Vec<f64>,
    /// Position Greeks.
    pub greeks: AggregateGreeks,
    /// Summary risk metrics.
    pub risk: RiskMetrics,
}

/// Runs the payoff engine, Greeks aggregator and risk calculator over `legs`.
#[must_use]
pub fn analyze_legs(
    legs: &[Leg],
    underlying_price: f64,
    settings: &PayoffSettings,
) -> StrategyAnalysis {
    let payoff = payoff_curve(legs, underlying_price, settings);
    let greeks = aggregate_greeks(legs);
    let risk = risk_metrics(legs, underlying_price, settings, &payoff);
    debug!(
        "Analyzed {} legs at {}: {} breakevens, max profit {}, max loss {}",
        legs.len(),
        underlying_price,
        risk.breakevens.len(),
        risk.max_profit,
        risk.max_loss
    );
    StrategyAnalysis {
        breakevens: breakevens(&payoff),
        payoff,
        greeks,
        risk,
    }
}

fn validate_price(price: Option<f64>) -> Result<(), StrategyError> {
    if let Some(p) = price {
        ensure_finite("underlying price", p)?;
        if p < 0.0 {
            return Err(StrategyError::invalid("underlying price must not be negative"));
        }
    }
    Ok(())
}

fn validate_legs(legs: &[Leg]) -> Result<(), StrategyError> {
    let mut seen = HashSet::with_capacity(legs.len());
    for leg in legs {
        leg.validate()?;
        if !seen.insert(leg.id) {
            return Err(StrategyError::invalid(format!("duplicate leg id {}", leg.id)));
        }
    }
    Ok(())
}

/// A multi-leg position on one underlying.
///
/// Every mutation validates first and leaves the strategy unchanged on error.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    name: String,
    underlying_symbol: String,
    underlying_price: Option<f64>,
    legs: Vec<Leg>,
}

impl Strategy {
    /// Creates an empty strategy.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] for a negative or non-finite price.
    pub fn new(
        name: impl Into<String>,
        underlying_symbol: impl Into<String>,
        underlying_price: Option<f64>,
    ) -> Result<Self, StrategyError> {
        validate_price(underlying_price)?;
        Ok(Self {
            name: name.into(),
            underlying_symbol: underlying_symbol.into(),
            underlying_price,
            legs: Vec::new(),
        })
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying symbol.
    #[must_use]
    pub fn underlying_symbol(&self) -> &str {
        &self.underlying_symbol
    }

    /// Latest underlying price, if one has been supplied.
    #[must_use]
    pub fn underlying_price(&self) -> Option<f64> {
        self.underlying_price
    }

    /// Legs in insertion order. Order carries no meaning.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Looks up a leg.
    #[must_use]
    pub fn leg(&self, id: Uuid) -> Option<&Leg> {
        self.legs.iter().find(|l| l.id == id)
    }

    /// Renames the strategy.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Updates the latest underlying price.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] for a negative or non-finite price.
    pub fn set_underlying_price(&mut self, price: f64) -> Result<(), StrategyError> {
        validate_price(Some(price))?;
        self.underlying_price = Some(price);
        Ok(())
    }

    /// Points the strategy at an underlying. Switching to a different symbol
    /// discards the legs, which were built for the old one.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] for a negative or non-finite price.
    pub fn set_underlying(
        &mut self,
        symbol: impl Into<String>,
        price: Option<f64>,
    ) -> Result<(), StrategyError> {
        validate_price(price)?;
        let symbol = symbol.into();
        if symbol != self.underlying_symbol {
            debug!(
                "Underlying changed from {} to {}, clearing {} legs",
                self.underlying_symbol,
                symbol,
                self.legs.len()
            );
            self.legs.clear();
            self.underlying_symbol = symbol;
        }
        self.underlying_price = price;
        Ok(())
    }

    /// Appends a leg.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if the leg is invalid or its id
    /// is already used.
    pub fn add_leg(&mut self, leg: Leg) -> Result<(), StrategyError> {
        leg.validate()?;
        if self.leg(leg.id).is_some() {
            return Err(StrategyError::invalid(format!("duplicate leg id {}", leg.id)));
        }
        self.legs.push(leg);
        Ok(())
    }

    /// Swaps in a new version of an existing leg, matched by id.
    ///
    /// # Errors
    /// Returns [`StrategyError::LegNotFound`] or [`StrategyError::InvalidInput`].
    pub fn replace_leg(&mut self, leg: Leg) -> Result<(), StrategyError> {
        leg.validate()?;
        let slot = self
            .legs
            .iter_mut()
            .find(|l| l.id == leg.id)
            .ok_or(StrategyError::LegNotFound(leg.id))?;
        *slot = leg;
        Ok(())
    }

    /// Applies a partial edit to a leg and returns the new version.
    ///
    /// # Errors
    /// Returns [`StrategyError::LegNotFound`] or [`StrategyError::InvalidInput`].
    pub fn update_leg(&mut self, id: Uuid, update: &LegUpdate) -> Result<&Leg, StrategyError> {
        let index = self
            .legs
            .iter()
            .position(|l| l.id == id)
            .ok_or(StrategyError::LegNotFound(id))?;
        let next = update.apply(&self.legs[index])?;
        self.legs[index] = next;
        Ok(&self.legs[index])
    }

    /// Removes a leg and returns it.
    ///
    /// # Errors
    /// Returns [`StrategyError::LegNotFound`].
    pub fn remove_leg(&mut self, id: Uuid) -> Result<Leg, StrategyError> {
        let index = self
            .legs
            .iter()
            .position(|l| l.id == id)
            .ok_or(StrategyError::LegNotFound(id))?;
        Ok(self.legs.remove(index))
    }

    /// Replaces the whole leg list.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if any leg is invalid or ids repeat.
    pub fn set_legs(&mut self, legs: Vec<Leg>) -> Result<(), StrategyError> {
        validate_legs(&legs)?;
        self.legs = legs;
        Ok(())
    }

    /// Removes every leg.
    pub fn clear(&mut self) {
        self.legs.clear();
    }

    /// Replaces the legs with a template instantiated against `chain` and
    /// renames the strategy after the template.
    ///
    /// # Errors
    /// Propagates instantiation errors; the strategy is untouched on error.
    pub fn apply_template(
        &mut self,
        template: &StrategyTemplate,
        chain: &OptionChain,
        default_premium: f64,
    ) -> Result<Vec<QuoteWarning>, StrategyError> {
        let instance = template.instantiate(self.underlying_price, chain, default_premium)?;
        self.set_legs(instance.legs)?;
        self.name = instance.template_name.to_string();
        Ok(instance.warnings)
    }

    /// Computes payoff, Greeks and risk metrics for the current legs.
    ///
    /// # Errors
    /// Returns [`StrategyError::MissingMarketData`] when there are legs but no
    /// underlying price, or [`StrategyError::InvalidInput`] for bad settings.
    pub fn analyze(&self, settings: &PayoffSettings) -> Result<StrategyAnalysis, StrategyError> {
        settings.validate()?;
        let price = match self.underlying_price {
            Some(p) => p,
            None if self.legs.is_empty() => 0.0,
            None => {
                return Err(StrategyError::MissingMarketData(format!(
                    "no underlying price for {}",
                    self.underlying_symbol
                )));
            }
        };
        Ok(analyze_legs(&self.legs, price, settings))
    }

    /// Persisted form of the strategy.
    #[must_use]
    pub fn to_saved(&self, created_at: DateTime<Utc>) -> SavedStrategy {
        SavedStrategy {
            name: self.name.clone(),
            symbol: self.underlying_symbol.clone(),
            underlying_price: self.underlying_price,
            legs: self.legs.clone(),
            created_at,
        }
    }

    /// Rebuilds a strategy from its persisted form.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if the saved data is invalid.
    pub fn from_saved(saved: SavedStrategy) -> Result<Self, StrategyError> {
        let mut strategy = Self::new(saved.name, saved.symbol, saved.underlying_price)?;
        strategy.set_legs(saved.legs)?;
        Ok(strategy)
    }
}

/// Persisted strategy: `{name, symbol, underlyingPrice, legs, createdAt}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedStrategy {
    /// Display label.
    pub name: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying price when saved.
    pub underlying_price: Option<f64>,
    /// Legs.
    pub legs: Vec<Leg>,
    /// When the strategy was saved.
    pub created_at: DateTime<Utc>,
}
