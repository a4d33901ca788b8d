//! Strategy template catalog.
//!
//! A template lists, per leg, what to trade and where to place the strike
//! relative to the money. Strikes are picked by position in the sorted strike
//! list rather than by distance in dollars, so irregular strike spacing is
//! handled the same way as regular spacing.

use crate::strategy::chain::OptionChain;
use crate::strategy::error::{StrategyError, ensure_finite};
use crate::strategy::leg::{Greeks, InstrumentType, Leg, PositionSide};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Strike selector relative to the at-the-money strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Moneyness {
    /// Two strikes below ATM.
    #[serde(rename = "ITM")]
    Itm,
    /// First strike at or above the underlying price.
    #[serde(rename = "ATM")]
    Atm,
    /// Two strikes above ATM.
    #[serde(rename = "OTM")]
    Otm,
    /// Four strikes above ATM.
    #[serde(rename = "OTM+")]
    OtmPlus,
    /// Four strikes below ATM.
    #[serde(rename = "OTM-")]
    OtmMinus,
}

impl Moneyness {
    /// Offset in strike-list positions from the ATM index.
    #[must_use]
    pub fn offset(self) -> isize {
        match self {
            Self::Itm => -2,
            Self::Atm => 0,
            Self::Otm => 2,
            Self::OtmPlus => 4,
            Self::OtmMinus => -4,
        }
    }
}

/// Which listed expiration a template leg trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationChoice {
    /// First listed expiration.
    Near,
    /// Second listed expiration.
    Far,
}

/// One leg of a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateLeg {
    /// Instrument to trade.
    pub instrument_type: InstrumentType,
    /// Side to take.
    pub position_side: PositionSide,
    /// Contracts for options, shares for stock.
    pub quantity: u32,
    /// Strike selector. Absent for stock.
    pub moneyness: Option<Moneyness>,
    /// Expiration to trade.
    pub expiration: ExpirationChoice,
}

const fn stock(side: PositionSide, shares: u32) -> TemplateLeg {
    TemplateLeg {
        instrument_type: InstrumentType::Stock,
        position_side: side,
        quantity: shares,
        moneyness: None,
        expiration: ExpirationChoice::Near,
    }
}

const fn call(side: PositionSide, quantity: u32, moneyness: Moneyness) -> TemplateLeg {
    TemplateLeg {
        instrument_type: InstrumentType::Call,
        position_side: side,
        quantity,
        moneyness: Some(moneyness),
        expiration: ExpirationChoice::Near,
    }
}

const fn put(side: PositionSide, quantity: u32, moneyness: Moneyness) -> TemplateLeg {
    TemplateLeg {
        instrument_type: InstrumentType::Put,
        position_side: side,
        quantity,
        moneyness: Some(moneyness),
        expiration: ExpirationChoice::Near,
    }
}

const fn far(mut leg: TemplateLeg) -> TemplateLeg {
    leg.expiration = ExpirationChoice::Far;
    leg
}

/// A named leg generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyTemplate {
    /// Stable lookup key, e.g. `iron_condor`.
    pub key: &'static str,
    /// Display name, e.g. `Iron Condor`.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Legs to synthesize.
    pub legs: &'static [TemplateLeg],
}

use Moneyness::{Atm, Itm, Otm, OtmMinus, OtmPlus};
use PositionSide::{Long, Short};

static CATALOG: [StrategyTemplate; 12] = [
    StrategyTemplate {
        key: "long_call",
        name: "Long Call",
        description: "Buy an at-the-money call",
        legs: &[call(Long, 1, Atm)],
    },
    StrategyTemplate {
        key: "long_put",
        name: "Long Put",
        description: "Buy an at-the-money put",
        legs: &[put(Long, 1, Atm)],
    },
    StrategyTemplate {
        key: "covered_call",
        name: "Covered Call",
        description: "Own 100 shares and sell an out-of-the-money call",
        legs: &[stock(Long, 100), call(Short, 1, Otm)],
    },
    StrategyTemplate {
        key: "protective_put",
        name: "Protective Put",
        description: "Own 100 shares and buy a put below the money",
        legs: &[stock(Long, 100), put(Long, 1, Itm)],
    },
    StrategyTemplate {
        key: "collar",
        name: "Collar",
        description: "Own 100 shares, buy a put below and sell a call above the money",
        legs: &[stock(Long, 100), put(Long, 1, Itm), call(Short, 1, Otm)],
    },
    StrategyTemplate {
        key: "bull_call_spread",
        name: "Bull Call Spread",
        description: "Buy an at-the-money call and sell a higher call",
        legs: &[call(Long, 1, Atm), call(Short, 1, Otm)],
    },
    StrategyTemplate {
        key: "bear_put_spread",
        name: "Bear Put Spread",
        description: "Buy an at-the-money put and sell a lower put",
        legs: &[put(Long, 1, Atm), put(Short, 1, Itm)],
    },
    StrategyTemplate {
        key: "long_straddle",
        name: "Long Straddle",
        description: "Buy an at-the-money call and put",
        legs: &[call(Long, 1, Atm), put(Long, 1, Atm)],
    },
    StrategyTemplate {
        key: "long_strangle",
        name: "Long Strangle",
        description: "Buy a call above and a put below the money",
        legs: &[call(Long, 1, Otm), put(Long, 1, Itm)],
    },
    StrategyTemplate {
        key: "iron_condor",
        name: "Iron Condor",
        description: "Sell a put spread below and a call spread above the money",
        legs: &[
            put(Long, 1, OtmMinus),
            put(Short, 1, Itm),
            call(Short, 1, Otm),
            call(Long, 1, OtmPlus),
        ],
    },
    StrategyTemplate {
        key: "butterfly",
        name: "Butterfly",
        description: "Buy the wings and sell two at-the-money calls",
        legs: &[call(Long, 1, Itm), call(Short, 2, Atm), call(Long, 1, Otm)],
    },
    StrategyTemplate {
        key: "calendar_spread",
        name: "Calendar Spread",
        description: "Sell a near call and buy the same strike further out",
        legs: &[call(Short, 1, Atm), far(call(Long, 1, Atm))],
    },
];

/// All templates, in display order.
#[must_use]
pub fn catalog() -> &'static [StrategyTemplate] {
    &CATALOG
}

/// Looks a template up by key or display name, ignoring case, spaces and dashes.
///
/// # Errors
/// Returns [`StrategyError::UnknownTemplate`] when nothing matches.
pub fn find_template(name: &str) -> Result<&'static StrategyTemplate, StrategyError> {
    let normalized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    CATALOG
        .iter()
        .find(|t| t.key == normalized)
        .ok_or_else(|| StrategyError::UnknownTemplate(name.to_string()))
}

/// Why a template leg was built from estimated data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedQuote {
    /// The resolved strike had no quote; the nearest quoted strike was used.
    MissingStrike {
        /// Strike picked by the moneyness selector.
        requested: f64,
        /// Strike actually used.
        substituted: f64,
    },
    /// No quote at all for the expiration; the fallback premium and zero Greeks were used.
    FallbackPremium {
        /// Strike picked by the moneyness selector.
        strike: f64,
        /// Premium used instead of a quote.
        premium: f64,
    },
    /// Only one expiration is listed, so the far leg trades the near expiration.
    MissingFarExpiration,
}

/// A degraded quote attached to the leg it affected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteWarning {
    /// Affected leg.
    pub leg_id: Uuid,
    /// What was degraded.
    pub issue: DegradedQuote,
}

/// Result of applying a template to market data.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInstance {
    /// Key of the template that produced the legs.
    pub template_key: &'static str,
    /// Display name of the template.
    pub template_name: &'static str,
    /// Synthesized legs, in template order.
    pub legs: Vec<Leg>,
    /// Degraded quotes. Legs listed here are marked `estimated`.
    pub warnings: Vec<QuoteWarning>,
}

/// Index of the first strike at or above `price`, clamped to the last strike.
fn atm_index(strikes: &[f64], price: f64) -> usize {
    strikes
        .iter()
        .position(|s| *s >= price)
        .unwrap_or(strikes.len().saturating_sub(1))
}

fn resolve_strike(strikes: &[f64], price: f64, moneyness: Moneyness) -> Option<f64> {
    let last = strikes.len().checked_sub(1)? as isize;
    let index = (atm_index(strikes, price) as isize + moneyness.offset()).clamp(0, last);
    strikes.get(index as usize).copied()
}

impl StrategyTemplate {
    /// Synthesizes the template's legs against a price and a chain.
    ///
    /// Missing quotes degrade the affected leg instead of failing: the
    /// nearest quoted strike in the same expiration is used, or failing that
    /// `default_premium` with zero Greeks.
    ///
    /// # Errors
    /// Returns [`StrategyError::MissingMarketData`] if the price is unset or
    /// the chain has no finite-strike quotes for a needed instrument type, and
    /// [`StrategyError::InvalidInput`] for a non-finite fallback premium. No
    /// legs are produced on error.
    pub fn instantiate(
        &self,
        underlying_price: Option<f64>,
        chain: &OptionChain,
        default_premium: f64,
    ) -> Result<TemplateInstance, StrategyError> {
        let price = underlying_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                StrategyError::MissingMarketData("underlying price is not set".to_string())
            })?;
        ensure_finite("default premium", default_premium)?;

        if chain.is_empty() {
            return Err(StrategyError::MissingMarketData(
                "option chain is empty".to_string(),
            ));
        }
        for leg in self.legs {
            if leg.instrument_type.is_option() && chain.strikes(leg.instrument_type).is_empty() {
                return Err(StrategyError::MissingMarketData(format!(
                    "option chain has no {} quotes",
                    leg.instrument_type
                )));
            }
        }

        debug!(
            "Instantiating template {} at price {} against {} calls / {} puts",
            self.key,
            price,
            chain.calls.len(),
            chain.puts.len()
        );

        let mut legs = Vec::with_capacity(self.legs.len());
        let mut warnings = Vec::new();

        for wanted in self.legs {
            let leg = match wanted.instrument_type {
                InstrumentType::Stock => Leg::stock(wanted.position_side, wanted.quantity, price)?,
                InstrumentType::Call | InstrumentType::Put => self.option_leg(
                    wanted,
                    wanted.moneyness.unwrap_or(Moneyness::Atm),
                    price,
                    chain,
                    default_premium,
                    &mut warnings,
                )?,
            };
            legs.push(leg);
        }

        Ok(TemplateInstance {
            template_key: self.key,
            template_name: self.name,
            legs,
            warnings,
        })
    }

    fn option_leg(
        &self,
        wanted: &TemplateLeg,
        moneyness: Moneyness,
        price: f64,
        chain: &OptionChain,
        default_premium: f64,
        warnings: &mut Vec<QuoteWarning>,
    ) -> Result<Leg, StrategyError> {
        let strikes = chain.strikes(wanted.instrument_type);
        let requested = resolve_strike(&strikes, price, moneyness).ok_or_else(|| {
            StrategyError::MissingMarketData(format!(
                "option chain has no {} quotes",
                wanted.instrument_type
            ))
        })?;

        let mut issues = Vec::new();
        let expiration = match wanted.expiration {
            ExpirationChoice::Near => chain.expiration_at(0),
            ExpirationChoice::Far => match chain.expiration_at(1) {
                Some(exp) => Some(exp),
                None => {
                    if chain.expiration_at(0).is_some() {
                        issues.push(DegradedQuote::MissingFarExpiration);
                    }
                    chain.expiration_at(0)
                }
            },
        };

        let quote = match chain.quote(wanted.instrument_type, requested, expiration) {
            Some(quote) => Some(quote),
            None => {
                let nearest = chain.nearest_quote(wanted.instrument_type, requested, expiration);
                match nearest {
                    Some(q) => issues.push(DegradedQuote::MissingStrike {
                        requested,
                        substituted: q.strike,
                    }),
                    None => issues.push(DegradedQuote::FallbackPremium {
                        strike: requested,
                        premium: default_premium,
                    }),
                }
                nearest
            }
        };

        let mut leg = match quote {
            Some(q) => {
                let leg = Leg::option(
                    wanted.instrument_type,
                    wanted.position_side,
                    q.strike,
                    wanted.quantity,
                    q.premium,
                )?
                .with_greeks(q.greeks());
                match q.implied_volatility {
                    Some(iv) => leg.with_implied_volatility(iv),
                    None => leg,
                }
            }
            None => Leg::option(
                wanted.instrument_type,
                wanted.position_side,
                requested,
                wanted.quantity,
                default_premium,
            )?
            .with_greeks(Greeks::default()),
        };
        if let Some(exp) = expiration {
            leg = leg.with_expiration(exp);
        }

        if !issues.is_empty() {
            leg.estimated = true;
            for issue in issues {
                warn!(
                    "Template {} {} {} leg degraded: {:?}",
                    self.key, wanted.position_side, wanted.instrument_type, issue
                );
                warnings.push(QuoteWarning {
                    leg_id: leg.id,
                    issue,
                });
            }
        }

        Ok(leg)
    }
}
