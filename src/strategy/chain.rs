//! Option chain snapshot consumed by the template catalog.
//!
//! The chain is already-fetched market data; lookups here never block and
//! never validate freshness.

use crate::strategy::leg::{Greeks, InstrumentType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Strikes closer than this are treated as equal.
const STRIKE_EPSILON: f64 = 1e-9;

/// One quoted contract in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChainQuote {
    /// Strike price.
    pub strike: f64,
    /// Expiration the quote belongs to. `None` matches any expiration.
    #[serde(default)]
    pub expiration: Option<String>,
    /// Premium per contract unit.
    #[serde(alias = "lastPrice", alias = "last_price")]
    pub premium: f64,
    /// Delta.
    #[serde(default)]
    pub delta: f64,
    /// Gamma.
    #[serde(default)]
    pub gamma: f64,
    /// Theta.
    #[serde(default)]
    pub theta: f64,
    /// Vega.
    #[serde(default)]
    pub vega: f64,
    /// Implied volatility.
    #[serde(default, alias = "impliedVolatility")]
    pub implied_volatility: Option<f64>,
}

impl ChainQuote {
    /// Greeks carried by the quote.
    #[must_use]
    pub fn greeks(&self) -> Greeks {
        Greeks {
            delta: self.delta,
            gamma: self.gamma,
            theta: self.theta,
            vega: self.vega,
        }
    }

    fn matches_expiration(&self, expiration: Option<&str>) -> bool {
        match (self.expiration.as_deref(), expiration) {
            (Some(own), Some(wanted)) => own == wanted,
            _ => true,
        }
    }
}

/// Calls and puts for one underlying, plus the available expirations
/// ordered nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptionChain {
    /// Available expirations, nearest first.
    #[serde(default)]
    pub expirations: Vec<String>,
    /// Call quotes.
    #[serde(default)]
    pub calls: Vec<ChainQuote>,
    /// Put quotes.
    #[serde(default)]
    pub puts: Vec<ChainQuote>,
}

impl OptionChain {
    /// Quotes for an instrument type. Stock has none.
    #[must_use]
    pub fn quotes(&self, instrument_type: InstrumentType) -> &[ChainQuote] {
        match instrument_type {
            InstrumentType::Call => &self.calls,
            InstrumentType::Put => &self.puts,
            InstrumentType::Stock => &[],
        }
    }

    /// True when the chain has no quotes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    /// Distinct strikes for an instrument type across all expirations, ascending.
    #[must_use]
    pub fn strikes(&self, instrument_type: InstrumentType) -> Vec<f64> {
        let mut strikes: Vec<f64> = self
            .quotes(instrument_type)
            .iter()
            .map(|q| q.strike)
            .filter(|s| s.is_finite())
            .collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup_by(|a, b| (*a - *b).abs() < STRIKE_EPSILON);
        strikes
    }

    /// Expiration at `index` in the listed order, if listed.
    #[must_use]
    pub fn expiration_at(&self, index: usize) -> Option<&str> {
        self.expirations.get(index).map(String::as_str)
    }

    /// Quote at exactly `strike` for the given expiration.
    #[must_use]
    pub fn quote(
        &self,
        instrument_type: InstrumentType,
        strike: f64,
        expiration: Option<&str>,
    ) -> Option<&ChainQuote> {
        self.quotes(instrument_type)
            .iter()
            .find(|q| (q.strike - strike).abs() < STRIKE_EPSILON && q.matches_expiration(expiration))
    }

    /// Quote with the strike closest to `strike` for the given expiration.
    /// Ties resolve to the lower strike.
    #[must_use]
    pub fn nearest_quote(
        &self,
        instrument_type: InstrumentType,
        strike: f64,
        expiration: Option<&str>,
    ) -> Option<&ChainQuote> {
        self.quotes(instrument_type)
            .iter()
            .filter(|q| q.strike.is_finite() && q.matches_expiration(expiration))
            .min_by(|a, b| {
                let da = (a.strike - strike).abs();
                let db = (b.strike - strike).abs();
                da.total_cmp(&db).then(a.strike.total_cmp(&b.strike))
            })
    }
}
