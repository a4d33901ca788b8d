//! Integration tests for the Option Strategy Analytics engine.
//!
//! Shared fixtures for the suites under `tests/`. Everything here goes
//! through the public `option_strategy_analytics::strategy` API only.

use option_strategy_analytics::strategy::{
    ChainQuote, Greeks, InstrumentType, Leg, OptionChain, PositionSide, Strategy,
};

/// Builds a set of Greeks.
#[must_use]
pub fn greeks(delta: f64, gamma: f64, theta: f64, vega: f64) -> Greeks {
    Greeks {
        delta,
        gamma,
        theta,
        vega,
    }
}

/// An uneven iron condor with an extra stock leg. Quantities, premiums and
/// Greeks differ per leg so reordering would show up in the sums.
///
/// # Panics
/// Never: every leg is structurally valid.
#[must_use]
pub fn mixed_legs() -> Vec<Leg> {
    vec![
        Leg::option(InstrumentType::Put, PositionSide::Long, 80.0, 1, 0.5)
            .unwrap()
            .with_greeks(greeks(-0.05, 0.01, -0.01, 0.04)),
        Leg::option(InstrumentType::Put, PositionSide::Short, 90.0, 1, 1.5)
            .unwrap()
            .with_greeks(greeks(-0.2, 0.03, -0.03, 0.09)),
        Leg::option(InstrumentType::Call, PositionSide::Short, 110.0, 1, 1.25)
            .unwrap()
            .with_greeks(greeks(0.22, 0.03, -0.03, 0.09)),
        Leg::option(InstrumentType::Call, PositionSide::Long, 120.0, 2, 0.375)
            .unwrap()
            .with_greeks(greeks(0.06, 0.01, -0.01, 0.04)),
        Leg::stock(PositionSide::Long, 25, 99.5).unwrap(),
    ]
}

/// An SPY strategy at spot 100 holding `legs`.
///
/// # Panics
/// If `legs` repeats an id or holds an invalid leg.
#[must_use]
pub fn strategy_with(legs: Vec<Leg>) -> Strategy {
    let mut strategy = Strategy::new("Props", "SPY", Some(100.0)).unwrap();
    strategy.set_legs(legs).unwrap();
    strategy
}

/// A quote at `strike` in `expiration` with flat Greeks.
#[must_use]
pub fn quote(strike: f64, expiration: &str) -> ChainQuote {
    ChainQuote {
        strike,
        expiration: Some(expiration.to_string()),
        premium: 2.0,
        delta: 0.3,
        gamma: 0.02,
        theta: -0.02,
        vega: 0.08,
        implied_volatility: None,
    }
}

/// A two-month chain with `strikes` quoted for calls and puts in `near`.
#[must_use]
pub fn chain(strikes: &[f64], near: &str, far: &str) -> OptionChain {
    OptionChain {
        expirations: vec![near.to_string(), far.to_string()],
        calls: strikes.iter().map(|&k| quote(k, near)).collect(),
        puts: strikes.iter().map(|&k| quote(k, near)).collect(),
    }
}
