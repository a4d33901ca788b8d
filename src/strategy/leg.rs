//! The leg model: one stock or option position inside a strategy.

use crate::strategy::error::{StrategyError, ensure_finite};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Instrument held by a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    /// Shares of the underlying.
    Stock,
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl InstrumentType {
    /// Returns true for calls and puts.
    #[must_use]
    pub fn is_option(self) -> bool {
        !matches!(self, Self::Stock)
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stock => write!(f, "stock"),
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Direction of a leg's exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Bought.
    Long,
    /// Sold.
    Short,
}

impl PositionSide {
    /// `+1.0` for long, `-1.0` for short.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    /// The opposite side.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Per-unit sensitivities as supplied by the market data source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Greeks {
    /// Price sensitivity.
    pub delta: f64,
    /// Rate of change of delta.
    pub gamma: f64,
    /// Time decay.
    pub theta: f64,
    /// Volatility sensitivity.
    pub vega: f64,
}

impl Greeks {
    /// Greeks of one share of the underlying.
    #[must_use]
    pub fn stock() -> Self {
        Self {
            delta: 1.0,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), StrategyError> {
        ensure_finite("delta", self.delta)?;
        ensure_finite("gamma", self.gamma)?;
        ensure_finite("theta", self.theta)?;
        ensure_finite("vega", self.vega)
    }
}

/// A single position within a strategy.
///
/// Legs are values: edits produce a new leg (see [`LegUpdate::apply`]) which
/// the owning strategy swaps in after validation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    /// Identifier, unique within a strategy.
    pub id: Uuid,
    /// Stock, call or put.
    pub instrument_type: InstrumentType,
    /// Long or short.
    pub position_side: PositionSide,
    /// Strike price. Required for options, ignored for stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    /// Expiration identifier. Absent for stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// Contract count for options, share count for stock. Always positive.
    pub quantity: u32,
    /// Price per option contract unit, or entry price per share for stock.
    #[serde(default)]
    pub premium: f64,
    /// Per-unit Greeks.
    #[serde(flatten)]
    pub greeks: Greeks,
    /// Informational implied volatility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<f64>,
    /// Set when the premium or Greeks came from a fallback instead of a live quote.
    #[serde(default)]
    pub estimated: bool,
}

/// Serialized leg as read back. Greeks are optional; an absent stock delta
/// takes the stock convention of 1.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegRecord {
    id: Uuid,
    instrument_type: InstrumentType,
    position_side: PositionSide,
    #[serde(default)]
    strike: Option<f64>,
    #[serde(default)]
    expiration: Option<String>,
    quantity: u32,
    #[serde(default)]
    premium: f64,
    #[serde(default)]
    delta: Option<f64>,
    #[serde(default)]
    gamma: f64,
    #[serde(default)]
    theta: f64,
    #[serde(default)]
    vega: f64,
    #[serde(default)]
    implied_volatility: Option<f64>,
    #[serde(default)]
    estimated: bool,
}

impl From<LegRecord> for Leg {
    fn from(record: LegRecord) -> Self {
        let default_delta = match record.instrument_type {
            InstrumentType::Stock => Greeks::stock().delta,
            InstrumentType::Call | InstrumentType::Put => 0.0,
        };
        Self {
            id: record.id,
            instrument_type: record.instrument_type,
            position_side: record.position_side,
            strike: record.strike,
            expiration: record.expiration,
            quantity: record.quantity,
            premium: record.premium,
            greeks: Greeks {
                delta: record.delta.unwrap_or(default_delta),
                gamma: record.gamma,
                theta: record.theta,
                vega: record.vega,
            },
            implied_volatility: record.implied_volatility,
            estimated: record.estimated,
        }
    }
}

impl<'de> Deserialize<'de> for Leg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LegRecord::deserialize(deserializer).map(Self::from)
    }
}

impl Leg {
    /// Creates a stock leg with the conventional stock Greeks.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if the leg is structurally invalid.
    pub fn stock(side: PositionSide, quantity: u32, entry_price: f64) -> Result<Self, StrategyError> {
        let leg = Self {
            id: Uuid::new_v4(),
            instrument_type: InstrumentType::Stock,
            position_side: side,
            strike: None,
            expiration: None,
            quantity,
            premium: entry_price,
            greeks: Greeks::stock(),
            implied_volatility: None,
            estimated: false,
        };
        leg.validate()?;
        Ok(leg)
    }

    /// Creates an option leg with zero Greeks and the nearest expiration.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if `instrument_type` is stock or
    /// the leg is otherwise structurally invalid.
    pub fn option(
        instrument_type: InstrumentType,
        side: PositionSide,
        strike: f64,
        quantity: u32,
        premium: f64,
    ) -> Result<Self, StrategyError> {
        if !instrument_type.is_option() {
            return Err(StrategyError::invalid(
                "option legs must be calls or puts",
            ));
        }
        let leg = Self {
            id: Uuid::new_v4(),
            instrument_type,
            position_side: side,
            strike: Some(strike),
            expiration: None,
            quantity,
            premium,
            greeks: Greeks::default(),
            implied_volatility: None,
            estimated: false,
        };
        leg.validate()?;
        Ok(leg)
    }

    /// Returns the leg with the given expiration.
    #[must_use]
    pub fn with_expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    /// Returns the leg with the given Greeks.
    #[must_use]
    pub fn with_greeks(mut self, greeks: Greeks) -> Self {
        self.greeks = greeks;
        self
    }

    /// Returns the leg with the given implied volatility.
    #[must_use]
    pub fn with_implied_volatility(mut self, iv: f64) -> Self {
        self.implied_volatility = Some(iv);
        self
    }

    /// Returns the leg on the opposite side, keeping its id.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.position_side = self.position_side.flipped();
        self
    }

    /// Signed exposure direction.
    #[must_use]
    pub fn sign(&self) -> f64 {
        self.position_side.sign()
    }

    /// Checks the structural constraints of the leg.
    ///
    /// Economically odd combinations are accepted; only shape and range
    /// violations are rejected.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] describing the first violation.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.quantity == 0 {
            return Err(StrategyError::invalid("quantity must be positive"));
        }
        ensure_finite("premium", self.premium)?;
        self.greeks.validate()?;
        if let Some(iv) = self.implied_volatility {
            ensure_finite("implied volatility", iv)?;
        }
        if self.instrument_type.is_option() {
            let strike = self.strike.ok_or_else(|| {
                StrategyError::invalid(format!("{} leg requires a strike", self.instrument_type))
            })?;
            ensure_finite("strike", strike)?;
            if strike < 0.0 {
                return Err(StrategyError::invalid("strike must not be negative"));
            }
        }
        Ok(())
    }
}

/// A partial edit of a leg. Absent fields keep their current value.
///
/// Fields are camelCase like [`Leg`]; snake_case names are accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegUpdate {
    /// New instrument type.
    #[serde(default, alias = "instrument_type")]
    pub instrument_type: Option<InstrumentType>,
    /// New side.
    #[serde(default, alias = "position_side")]
    pub position_side: Option<PositionSide>,
    /// New strike.
    #[serde(default)]
    pub strike: Option<f64>,
    /// New expiration.
    #[serde(default)]
    pub expiration: Option<String>,
    /// New quantity.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// New premium.
    #[serde(default)]
    pub premium: Option<f64>,
    /// New delta.
    #[serde(default)]
    pub delta: Option<f64>,
    /// New gamma.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// New theta.
    #[serde(default)]
    pub theta: Option<f64>,
    /// New vega.
    #[serde(default)]
    pub vega: Option<f64>,
    /// New implied volatility.
    #[serde(default, alias = "implied_volatility")]
    pub implied_volatility: Option<f64>,
}

impl LegUpdate {
    /// Produces the edited leg, leaving `leg` untouched.
    ///
    /// Switching a leg to stock drops its strike and expiration and resets its
    /// Greeks to the stock convention. A manual edit clears the `estimated` flag.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if the edited leg is invalid.
    pub fn apply(&self, leg: &Leg) -> Result<Leg, StrategyError> {
        let mut next = leg.clone();

        if let Some(instrument_type) = self.instrument_type {
            if instrument_type != next.instrument_type
                && instrument_type == InstrumentType::Stock
            {
                next.strike = None;
                next.expiration = None;
                next.greeks = Greeks::stock();
            }
            next.instrument_type = instrument_type;
        }
        if let Some(side) = self.position_side {
            next.position_side = side;
        }
        if let Some(strike) = self.strike {
            next.strike = Some(strike);
        }
        if let Some(expiration) = &self.expiration {
            next.expiration = Some(expiration.clone());
        }
        if let Some(quantity) = self.quantity {
            next.quantity = quantity;
        }
        if let Some(premium) = self.premium {
            next.premium = premium;
        }
        if let Some(delta) = self.delta {
            next.greeks.delta = delta;
        }
        if let Some(gamma) = self.gamma {
            next.greeks.gamma = gamma;
        }
        if let Some(theta) = self.theta {
            next.greeks.theta = theta;
        }
        if let Some(vega) = self.vega {
            next.greeks.vega = vega;
        }
        if let Some(iv) = self.implied_volatility {
            next.implied_volatility = Some(iv);
        }
        next.estimated = false;

        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_leg_defaults() {
        let leg = Leg::stock(PositionSide::Long, 100, 50.0).unwrap();
        assert_eq!(leg.instrument_type, InstrumentType::Stock);
        assert_eq!(leg.greeks, Greeks::stock());
        assert!(leg.strike.is_none());
        assert!(!leg.estimated);
    }

    #[test]
    fn test_option_leg_requires_option_type() {
        let err = Leg::option(InstrumentType::Stock, PositionSide::Long, 100.0, 1, 5.0);
        assert!(matches!(err, Err(StrategyError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 0, 5.0);
        assert_eq!(
            err,
            Err(StrategyError::InvalidInput("quantity must be positive".to_string()))
        );
    }

    #[test]
    fn test_rejects_negative_strike() {
        let err = Leg::option(InstrumentType::Put, PositionSide::Short, -1.0, 1, 2.0);
        assert!(matches!(err, Err(StrategyError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_missing_strike() {
        let mut leg = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, 5.0).unwrap();
        leg.strike = None;
        assert!(leg.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_premium() {
        let err = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, f64::NAN);
        assert!(err.is_err());
    }

    #[test]
    fn test_accepts_negative_premium() {
        // Nonsensical but structurally valid.
        assert!(Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, -1.0).is_ok());
    }

    #[test]
    fn test_flipped_keeps_id() {
        let leg = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, 5.0).unwrap();
        let flipped = leg.clone().flipped();
        assert_eq!(flipped.id, leg.id);
        assert_eq!(flipped.position_side, PositionSide::Short);
        assert_eq!(flipped.sign(), -1.0);
    }

    #[test]
    fn test_update_produces_new_leg() {
        let leg = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, 5.0).unwrap();
        let update = LegUpdate {
            strike: Some(105.0),
            quantity: Some(3),
            delta: Some(0.4),
            ..LegUpdate::default()
        };
        let next = update.apply(&leg).unwrap();
        assert_eq!(next.id, leg.id);
        assert_eq!(next.strike, Some(105.0));
        assert_eq!(next.quantity, 3);
        assert_eq!(next.greeks.delta, 0.4);
        assert_eq!(leg.strike, Some(100.0));
    }

    #[test]
    fn test_update_rejects_invalid_result() {
        let leg = Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, 5.0).unwrap();
        let update = LegUpdate {
            quantity: Some(0),
            ..LegUpdate::default()
        };
        assert!(update.apply(&leg).is_err());
    }

    #[test]
    fn test_update_to_stock_resets_option_fields() {
        let leg = Leg::option(InstrumentType::Put, PositionSide::Long, 90.0, 1, 2.0)
            .unwrap()
            .with_expiration("2025-06-20")
            .with_greeks(Greeks {
                delta: -0.3,
                gamma: 0.02,
                theta: -0.05,
                vega: 0.1,
            });
        let update = LegUpdate {
            instrument_type: Some(InstrumentType::Stock),
            ..LegUpdate::default()
        };
        let next = update.apply(&leg).unwrap();
        assert!(next.strike.is_none());
        assert!(next.expiration.is_none());
        assert_eq!(next.greeks, Greeks::stock());
    }

    #[test]
    fn test_stock_without_delta_reads_back_as_one() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"id":"{id}","instrumentType":"stock","positionSide":"short","quantity":50,"premium":20.0}}"#
        );
        let leg: Leg = serde_json::from_str(&json).unwrap();
        assert_eq!(leg.id, id);
        assert_eq!(leg.greeks, Greeks::stock());

        let json = format!(
            r#"{{"id":"{id}","instrumentType":"stock","positionSide":"long","quantity":50,"delta":0.0}}"#
        );
        let leg: Leg = serde_json::from_str(&json).unwrap();
        assert_eq!(leg.greeks.delta, 0.0);
    }

    #[test]
    fn test_option_without_greeks_reads_back_as_zero() {
        let json = format!(
            r#"{{"id":"{}","instrumentType":"put","positionSide":"long","strike":95.0,"quantity":1,"premium":2.0}}"#,
            Uuid::new_v4()
        );
        let leg: Leg = serde_json::from_str(&json).unwrap();
        assert_eq!(leg.greeks, Greeks::default());
        assert!(!leg.estimated);
    }

    #[test]
    fn test_update_accepts_both_casings() {
        let camel: LegUpdate =
            serde_json::from_str(r#"{"positionSide":"short","impliedVolatility":0.2}"#).unwrap();
        let snake: LegUpdate =
            serde_json::from_str(r#"{"position_side":"short","implied_volatility":0.2}"#).unwrap();
        assert_eq!(camel.position_side, Some(PositionSide::Short));
        assert_eq!(snake.position_side, Some(PositionSide::Short));
        assert_eq!(camel.implied_volatility, snake.implied_volatility);
    }

    #[test]
    fn test_serializes_camel_case_with_flat_greeks() {
        let leg = Leg::option(InstrumentType::Call, PositionSide::Short, 110.0, 2, 3.0)
            .unwrap()
            .with_implied_volatility(0.25);
        let json = serde_json::to_string(&leg).unwrap();
        assert!(json.contains("\"instrumentType\":\"call\""));
        assert!(json.contains("\"positionSide\":\"short\""));
        assert!(json.contains("\"impliedVolatility\":0.25"));
        assert!(json.contains("\"delta\":0.0"));

        let back: Leg = serde_json::from_str(&json).unwrap();
        assert_eq!(back, leg);
    }
}
