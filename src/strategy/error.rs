//! Error types for the strategy engine.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by strategy construction and analysis.
///
/// Every variant is recoverable: the operation that produced it is rejected
/// and the strategy it was applied to keeps its prior state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// A leg or strategy field violates a structural constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Template instantiation or analysis requested without the market data it needs.
    #[error("missing market data: {0}")]
    MissingMarketData(String),

    /// No leg with the given id exists in the strategy.
    #[error("leg not found: {0}")]
    LegNotFound(Uuid),

    /// No template with the given name exists in the catalog.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

impl StrategyError {
    /// Shorthand for an [`StrategyError::InvalidInput`] error.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Ensures a numeric field is finite.
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<(), StrategyError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StrategyError::invalid(format!("{field} must be a finite number")))
    }
}
