//! Request and response models for the REST API.

use crate::strategy::{
    Greeks, InstrumentType, Leg, OptionChain, PositionSide, QuoteWarning, Strategy,
    StrategyAnalysis, StrategyError, StrategyTemplate, TemplateLeg,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Template catalog entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateSummary {
    /// Lookup key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Leg blueprint.
    pub legs: Vec<TemplateLeg>,
}

impl From<&StrategyTemplate> for TemplateSummary {
    fn from(template: &StrategyTemplate) -> Self {
        Self {
            key: template.key.to_string(),
            name: template.name.to_string(),
            description: template.description.to_string(),
            legs: template.legs.to_vec(),
        }
    }
}

/// Template catalog response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplatesListResponse {
    /// Available templates.
    pub templates: Vec<TemplateSummary>,
}

/// A leg as entered by a caller. The server assigns the id.
///
/// Fields are camelCase like [`Leg`]; snake_case names are accepted too.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegRequest {
    /// Stock, call or put.
    #[serde(alias = "instrument_type")]
    pub instrument_type: InstrumentType,
    /// Long or short.
    #[serde(alias = "position_side")]
    pub position_side: PositionSide,
    /// Strike (options only).
    #[serde(default)]
    pub strike: Option<f64>,
    /// Expiration identifier (options only).
    #[serde(default)]
    pub expiration: Option<String>,
    /// Contracts or shares.
    pub quantity: u32,
    /// Premium per contract unit, or entry price per share for stock.
    #[serde(default)]
    pub premium: f64,
    /// Delta. Stock defaults to 1.
    #[serde(default)]
    pub delta: Option<f64>,
    /// Gamma.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Theta.
    #[serde(default)]
    pub theta: Option<f64>,
    /// Vega.
    #[serde(default)]
    pub vega: Option<f64>,
    /// Implied volatility.
    #[serde(default, alias = "implied_volatility")]
    pub implied_volatility: Option<f64>,
}

impl LegRequest {
    /// Builds and validates a leg with a fresh id.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidInput`] if the leg is invalid.
    pub fn into_leg(self) -> Result<Leg, StrategyError> {
        let base = match self.instrument_type {
            InstrumentType::Stock => Greeks::stock(),
            InstrumentType::Call | InstrumentType::Put => Greeks::default(),
        };
        let greeks = Greeks {
            delta: self.delta.unwrap_or(base.delta),
            gamma: self.gamma.unwrap_or(base.gamma),
            theta: self.theta.unwrap_or(base.theta),
            vega: self.vega.unwrap_or(base.vega),
        };

        let mut leg = match self.instrument_type {
            InstrumentType::Stock => {
                Leg::stock(self.position_side, self.quantity, self.premium)?
            }
            InstrumentType::Call | InstrumentType::Put => {
                let strike = self.strike.ok_or_else(|| {
                    StrategyError::InvalidInput(format!(
                        "{} leg requires a strike",
                        self.instrument_type
                    ))
                })?;
                let leg = Leg::option(
                    self.instrument_type,
                    self.position_side,
                    strike,
                    self.quantity,
                    self.premium,
                )?;
                match self.expiration {
                    Some(exp) => leg.with_expiration(exp),
                    None => leg,
                }
            }
        };
        leg.greeks = greeks;
        leg.implied_volatility = self.implied_volatility;
        leg.validate()?;
        Ok(leg)
    }
}

/// Stateless analysis request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Current underlying price.
    #[serde(alias = "underlying_price")]
    pub underlying_price: f64,
    /// Legs to analyze.
    #[serde(default)]
    pub legs: Vec<LegRequest>,
}

/// Request to create a strategy.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStrategyRequest {
    /// Display label. Defaults to `Custom`.
    #[serde(default)]
    pub name: Option<String>,
    /// Underlying symbol.
    pub symbol: String,
    /// Current underlying price, if known.
    #[serde(default, alias = "underlying_price")]
    pub underlying_price: Option<f64>,
}

/// Request to change the underlying of a strategy.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUnderlyingRequest {
    /// New symbol. A different symbol discards the legs.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Latest price.
    pub price: f64,
}

/// Request to replace a strategy's legs with a template.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplateRequest {
    /// Template key or display name.
    pub template: String,
    /// Already-fetched option chain for the underlying.
    pub chain: OptionChain,
    /// Premium for legs with no quote. Defaults to the configured value.
    #[serde(default, alias = "default_premium")]
    pub default_premium: Option<f64>,
}

/// Strategy list entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct StrategySummary {
    /// Strategy identifier.
    pub id: Uuid,
    /// Display label.
    pub name: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Latest underlying price.
    pub underlying_price: Option<f64>,
    /// Number of legs.
    pub leg_count: usize,
}

impl StrategySummary {
    /// Summarizes a stored strategy.
    #[must_use]
    pub fn new(id: Uuid, strategy: &Strategy) -> Self {
        Self {
            id,
            name: strategy.name().to_string(),
            symbol: strategy.underlying_symbol().to_string(),
            underlying_price: strategy.underlying_price(),
            leg_count: strategy.legs().len(),
        }
    }
}

/// Strategy list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StrategiesListResponse {
    /// Stored strategies.
    pub strategies: Vec<StrategySummary>,
}

/// Risk figures rendered for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct RiskDisplay {
    /// Max profit, or `Unlimited`.
    pub max_profit: String,
    /// Max loss, or `Unlimited`.
    pub max_loss: String,
    /// Breakevens to cents.
    pub breakevens: Vec<String>,
    /// Risk/reward, or `N/A`.
    pub risk_reward: String,
    /// Probability of profit as a percentage of sampled prices.
    pub probability_of_profit: String,
}

impl From<&StrategyAnalysis> for RiskDisplay {
    fn from(analysis: &StrategyAnalysis) -> Self {
        let risk = &analysis.risk;
        Self {
            max_profit: risk.max_profit.to_string(),
            max_loss: risk.max_loss.to_string(),
            breakevens: risk.breakeven_labels(),
            risk_reward: risk.risk_reward_label(),
            probability_of_profit: format!("{:.1}%", risk.probability_of_profit * 100.0),
        }
    }
}

/// Analysis with display strings.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    /// Raw analysis.
    #[serde(flatten)]
    pub analysis: StrategyAnalysis,
    /// Display strings.
    pub display: RiskDisplay,
}

impl From<StrategyAnalysis> for AnalysisResponse {
    fn from(analysis: StrategyAnalysis) -> Self {
        let display = RiskDisplay::from(&analysis);
        Self { analysis, display }
    }
}

/// Full strategy snapshot: legs plus computed outputs.
#[derive(Debug, Serialize, ToSchema)]
pub struct StrategySnapshotResponse {
    /// Strategy identifier.
    pub id: Uuid,
    /// Display label.
    pub name: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Latest underlying price.
    pub underlying_price: Option<f64>,
    /// Legs.
    pub legs: Vec<Leg>,
    /// Computed outputs. Absent until a price is known for a non-empty strategy.
    pub analysis: Option<AnalysisResponse>,
    /// Degraded quotes from the operation that produced this snapshot.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<QuoteWarning>,
}

/// Response for deleting a resource.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Whether the resource was deleted.
    pub success: bool,
    /// Message describing the result.
    pub message: String,
}
