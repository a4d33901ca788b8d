//! Options strategy analytics engine.
//!
//! A strategy is a list of stock and option [`Leg`]s on one underlying. From a
//! snapshot of those legs and the underlying price the engine derives:
//!
//! - an expiration [`PayoffCurve`] and its breakevens ([`payoff`]),
//! - position-level Greeks ([`greeks`]),
//! - max profit / max loss, cost basis, a naive probability of profit and the
//!   risk/reward ratio ([`risk`]).
//!
//! Legs can be entered by hand or synthesized from the [`template`] catalog
//! against an already-fetched [`OptionChain`]. All computations are pure
//! functions of their inputs and hold no state between calls.

mod chain;
mod error;
pub mod greeks;
mod leg;
mod model;
pub mod payoff;
pub mod risk;
pub mod template;

pub use chain::{ChainQuote, OptionChain};
pub use error::StrategyError;
pub use greeks::{AggregateGreeks, aggregate_greeks};
pub use leg::{Greeks, InstrumentType, Leg, LegUpdate, PositionSide};
pub use model::{SavedStrategy, Strategy, StrategyAnalysis, analyze_legs};
pub use payoff::{PayoffCurve, PayoffPoint, PayoffSettings, breakevens, payoff_curve};
pub use risk::{Bound, RiskMetrics, risk_metrics};
pub use template::{
    DegradedQuote, ExpirationChoice, Moneyness, QuoteWarning, StrategyTemplate, TemplateInstance,
    TemplateLeg, catalog, find_template,
};
