//! Position-level Greeks.

use crate::strategy::leg::{InstrumentType, Leg};
use crate::strategy::payoff::ordered_sum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Signed, quantity-weighted sum of leg Greeks, in the same units as the inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregateGreeks {
    /// Net delta.
    pub delta: f64,
    /// Net gamma.
    pub gamma: f64,
    /// Net theta.
    pub theta: f64,
    /// Net vega.
    pub vega: f64,
}

/// Weight applied to a leg's Greeks: side sign times contract count.
/// Stock Greeks are already per position and are only signed.
#[must_use]
pub fn leg_weight(leg: &Leg) -> f64 {
    let multiplier = match leg.instrument_type {
        InstrumentType::Stock => 1.0,
        InstrumentType::Call | InstrumentType::Put => f64::from(leg.quantity),
    };
    leg.sign() * multiplier
}

/// Aggregates leg Greeks into position Greeks.
#[must_use]
pub fn aggregate_greeks(legs: &[Leg]) -> AggregateGreeks {
    let weighted =
        |pick: fn(&Leg) -> f64| ordered_sum(legs.iter().map(|leg| pick(leg) * leg_weight(leg)));

    AggregateGreeks {
        delta: weighted(|leg| leg.greeks.delta),
        gamma: weighted(|leg| leg.greeks.gamma),
        theta: weighted(|leg| leg.greeks.theta),
        vega: weighted(|leg| leg.greeks.vega),
    }
}
