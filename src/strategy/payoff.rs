//! Expiration payoff curve and breakeven detection.
//!
//! The payoff ignores time decay: every leg is valued at intrinsic value as if
//! all expirations had been reached at the sampled underlying price.

use crate::strategy::error::StrategyError;
use crate::strategy::leg::{InstrumentType, Leg};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sampling and contract conventions for payoff computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayoffSettings {
    /// Number of steps across the sweep. The curve has `steps + 1` samples.
    pub steps: usize,
    /// Half-width of the sweep as a fraction of the underlying price.
    pub range_fraction: f64,
    /// Shares represented by one option contract.
    pub contract_multiplier: f64,
}

impl Default for PayoffSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            range_fraction: 0.30,
            contract_multiplier: 100.0,
        }
    }
}

impl PayoffSettings {
    /// Checks the settings are usable.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] for fewer than two steps, a
    /// range fraction outside `(0, 1)` or a non-positive multiplier.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.steps < 2 {
            return Err(StrategyError::invalid("payoff steps must be at least 2"));
        }
        if !(self.range_fraction > 0.0 && self.range_fraction < 1.0) {
            return Err(StrategyError::invalid(
                "payoff range fraction must be between 0 and 1",
            ));
        }
        if !(self.contract_multiplier.is_finite() && self.contract_multiplier > 0.0) {
            return Err(StrategyError::invalid(
                "contract multiplier must be positive",
            ));
        }
        Ok(())
    }
}

/// One sample of the payoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayoffPoint {
    /// Underlying price at expiration.
    pub price: f64,
    /// Total strategy profit or loss at that price.
    pub profit_loss: f64,
}

/// Profit/loss samples ordered by ascending price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayoffCurve {
    /// Samples, ascending by price.
    pub points: Vec<PayoffPoint>,
}

impl PayoffCurve {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the curve has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterator over the profit/loss values.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.profit_loss)
    }
}

/// Sums values in a canonical order so the result does not depend on the
/// order they were produced in.
pub(crate) fn ordered_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Entry price of a stock leg: its premium when set, otherwise the spot price.
/// Only the cost basis uses it; expiration P/L is measured from spot.
#[must_use]
pub fn stock_entry_price(leg: &Leg, underlying_price: f64) -> f64 {
    if leg.premium > 0.0 {
        leg.premium
    } else {
        underlying_price
    }
}

/// Intrinsic value per share of an option leg at `price`. Zero for stock.
#[must_use]
pub fn intrinsic_value(leg: &Leg, price: f64) -> f64 {
    let strike = leg.strike.unwrap_or_default();
    match leg.instrument_type {
        InstrumentType::Call => (price - strike).max(0.0),
        InstrumentType::Put => (strike - price).max(0.0),
        InstrumentType::Stock => 0.0,
    }
}

/// Profit or loss of a single leg at expiration price `price`.
#[must_use]
pub fn leg_profit_loss(
    leg: &Leg,
    price: f64,
    underlying_price: f64,
    contract_multiplier: f64,
) -> f64 {
    let quantity = f64::from(leg.quantity);
    let raw = match leg.instrument_type {
        InstrumentType::Stock => (price - underlying_price) * quantity,
        InstrumentType::Call | InstrumentType::Put => {
            (intrinsic_value(leg, price) - leg.premium) * contract_multiplier * quantity
        }
    };
    raw * leg.sign()
}

/// Total strategy profit or loss at expiration price `price`.
#[must_use]
pub fn profit_loss_at(
    legs: &[Leg],
    price: f64,
    underlying_price: f64,
    contract_multiplier: f64,
) -> f64 {
    ordered_sum(
        legs.iter()
            .map(|leg| leg_profit_loss(leg, price, underlying_price, contract_multiplier)),
    )
}

/// Samples the expiration payoff over `[spot × (1 − r), spot × (1 + r)]`.
#[must_use]
pub fn payoff_curve(legs: &[Leg], underlying_price: f64, settings: &PayoffSettings) -> PayoffCurve {
    let low = underlying_price * (1.0 - settings.range_fraction);
    let high = underlying_price * (1.0 + settings.range_fraction);
    let steps = settings.steps.max(1);
    let width = high - low;

    let points = (0..=steps)
        .map(|i| {
            let price = low + width * (i as f64) / (steps as f64);
            PayoffPoint {
                price,
                profit_loss: profit_loss_at(
                    legs,
                    price,
                    underlying_price,
                    settings.contract_multiplier,
                ),
            }
        })
        .collect();

    PayoffCurve { points }
}

/// Prices where the sampled curve changes sign.
///
/// Adjacent samples of opposite sign are linearly interpolated. When zero
/// samples separate the two signs, the first zero sample is reported. A curve
/// that touches zero without changing sign has no breakeven there.
///
/// A zero run at either end of the sweep is where P/L leaves or reaches zero,
/// so its inner edge is reported: the last leading zero and the first
/// trailing zero. An all-zero curve has no breakevens. Accuracy is bounded by
/// the grid: a crossing and re-crossing within one step is missed.
#[must_use]
pub fn breakevens(curve: &PayoffCurve) -> Vec<f64> {
    let points = &curve.points;
    let Some(first) = points.iter().position(|p| p.profit_loss != 0.0) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    if first > 0 {
        found.push(points[first - 1].price);
    }

    let mut last_nonzero: Option<usize> = None;

    for (i, point) in curve.points.iter().enumerate() {
        if point.profit_loss == 0.0 {
            continue;
        }
        if let Some(j) = last_nonzero {
            let prev = curve.points[j];
            if prev.profit_loss.signum() != point.profit_loss.signum() {
                if i == j + 1 {
                    let t = prev.profit_loss / (prev.profit_loss - point.profit_loss);
                    found.push(prev.price + t * (point.price - prev.price));
                } else {
                    found.push(curve.points[j + 1].price);
                }
            }
        }
        last_nonzero = Some(i);
    }

    if let Some(last) = last_nonzero.filter(|last| last + 1 < points.len()) {
        found.push(points[last + 1].price);
    }

    found
}
