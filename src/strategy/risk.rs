//! Summary risk metrics derived from the payoff curve and the legs.

use crate::strategy::leg::{InstrumentType, Leg};
use crate::strategy::payoff::{
    PayoffCurve, PayoffSettings, breakevens, ordered_sum, profit_loss_at, stock_entry_price,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A profit or loss extreme that may be unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// A finite dollar amount.
    Finite(f64),
    /// Grows without limit as the underlying rises.
    Unlimited,
}

impl Bound {
    /// The finite value, if any.
    #[must_use]
    pub fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unlimited => None,
        }
    }

    /// True for [`Bound::Unlimited`].
    #[must_use]
    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.2}"),
            Self::Unlimited => write!(f, "Unlimited"),
        }
    }
}

/// Decision-relevant scalars for a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskMetrics {
    /// Highest achievable profit at expiration.
    pub max_profit: Bound,
    /// Lowest achievable profit (largest loss) at expiration, as a signed value.
    pub max_loss: Bound,
    /// Net premium paid to enter. Positive is a debit, negative a credit.
    pub initial_cost: f64,
    /// Fraction of sampled prices with positive P/L.
    ///
    /// This measures coverage of the ±range sweep, not a volatility-weighted
    /// probability, and over- or under-states the true chance of profit
    /// depending on how the sweep compares to the implied price distribution.
    pub probability_of_profit: f64,
    /// `|max_profit / max_loss|` when both are finite and the loss is non-zero.
    pub risk_reward_ratio: Option<f64>,
    /// Breakeven prices from the payoff curve, ascending.
    pub breakevens: Vec<f64>,
}

impl RiskMetrics {
    /// Breakevens rendered to cents.
    #[must_use]
    pub fn breakeven_labels(&self) -> Vec<String> {
        self.breakevens.iter().map(|b| format!("{b:.2}")).collect()
    }

    /// Risk/reward rendered for display, `N/A` when undefined.
    #[must_use]
    pub fn risk_reward_label(&self) -> String {
        self.risk_reward_ratio
            .map_or_else(|| "N/A".to_string(), |r| format!("{r:.2}"))
    }
}

/// Net cost to enter the position.
///
/// Options cost `premium × quantity × contract_multiplier`; stock costs its
/// entry price (the premium, or spot when unset) times share count. Short
/// legs contribute negatively.
#[must_use]
pub fn initial_cost(legs: &[Leg], underlying_price: f64, contract_multiplier: f64) -> f64 {
    ordered_sum(legs.iter().map(|leg| {
        let quantity = f64::from(leg.quantity);
        let gross = match leg.instrument_type {
            InstrumentType::Stock => stock_entry_price(leg, underlying_price) * quantity,
            InstrumentType::Call | InstrumentType::Put => {
                leg.premium * quantity * contract_multiplier
            }
        };
        gross * leg.sign()
    }))
}

/// Slope of the expiration payoff as the underlying price goes to infinity.
///
/// Only calls and stock contribute: positive means uncovered upside,
/// negative means uncovered short exposure.
#[must_use]
pub fn upside_slope(legs: &[Leg], contract_multiplier: f64) -> f64 {
    ordered_sum(legs.iter().map(|leg| {
        let quantity = f64::from(leg.quantity);
        let exposure = match leg.instrument_type {
            InstrumentType::Stock => quantity,
            InstrumentType::Call => quantity * contract_multiplier,
            InstrumentType::Put => 0.0,
        };
        exposure * leg.sign()
    }))
}

/// Prices where the piecewise-linear payoff can reach an extreme on `[0, ∞)`:
/// the price floor and every option strike.
fn kink_prices(legs: &[Leg]) -> impl Iterator<Item = f64> + '_ {
    std::iter::once(0.0).chain(
        legs.iter()
            .filter(|leg| leg.instrument_type.is_option())
            .filter_map(|leg| leg.strike),
    )
}

/// Derives risk metrics from the legs and their sampled payoff curve.
///
/// Max profit and max loss are exact for the expiration payoff. Between kinks
/// the payoff is linear, so its extremes on `[0, ∞)` sit at the zero price
/// floor or at a strike; the upside slope decides whether either side is
/// unlimited. Sampling noise in the curve never leaks into the bounds.
#[must_use]
pub fn risk_metrics(
    legs: &[Leg],
    underlying_price: f64,
    settings: &PayoffSettings,
    curve: &PayoffCurve,
) -> RiskMetrics {
    let multiplier = settings.contract_multiplier;

    let candidates: Vec<f64> = kink_prices(legs)
        .map(|p| profit_loss_at(legs, p, underlying_price, multiplier))
        .collect();
    let highest = candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = candidates.iter().copied().fold(f64::INFINITY, f64::min);

    let slope = upside_slope(legs, multiplier);
    let max_profit = if slope > 0.0 {
        Bound::Unlimited
    } else {
        Bound::Finite(highest)
    };
    let max_loss = if slope < 0.0 {
        Bound::Unlimited
    } else {
        Bound::Finite(lowest)
    };

    let probability_of_profit = if curve.is_empty() {
        0.0
    } else {
        curve.values().filter(|v| *v > 0.0).count() as f64 / curve.len() as f64
    };

    let risk_reward_ratio = match (max_profit, max_loss) {
        (Bound::Finite(profit), Bound::Finite(loss)) if loss != 0.0 => Some((profit / loss).abs()),
        _ => None,
    };

    RiskMetrics {
        max_profit,
        max_loss,
        initial_cost: initial_cost(legs, underlying_price, multiplier),
        probability_of_profit,
        risk_reward_ratio,
        breakevens: breakevens(curve),
    }
}
