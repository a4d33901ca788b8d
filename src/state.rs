//! Application state management.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{AnalysisResponse, StrategySnapshotResponse, StrategySummary};
use crate::strategy::{PayoffSettings, QuoteWarning, Strategy, StrategyError};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Strategies owned by callers, keyed by id.
    pub strategies: Arc<DashMap<Uuid, Strategy>>,
}

impl AppState {
    /// Creates a new application state with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Creates a new application state from configuration.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        info!(
            "Analytics configured: {} steps, ±{:.0}% sweep, contract multiplier {}",
            config.analytics.price_steps,
            config.analytics.range_fraction * 100.0,
            config.analytics.contract_multiplier
        );
        Self {
            config,
            strategies: Arc::new(DashMap::new()),
        }
    }

    /// Payoff settings derived from configuration.
    #[must_use]
    pub fn payoff_settings(&self) -> PayoffSettings {
        self.config.analytics.payoff_settings()
    }

    /// Stores a strategy under a fresh id.
    pub fn insert(&self, strategy: Strategy) -> Uuid {
        let id = Uuid::new_v4();
        info!(
            "Created strategy {} ({} on {})",
            id,
            strategy.name(),
            strategy.underlying_symbol()
        );
        self.strategies.insert(id, strategy);
        id
    }

    /// Returns a copy of a stored strategy.
    ///
    /// # Errors
    /// Returns [`ApiError::StrategyNotFound`] if the id is unknown.
    pub fn get(&self, id: Uuid) -> Result<Strategy, ApiError> {
        self.strategies
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(ApiError::StrategyNotFound(id))
    }

    /// Edits a stored strategy. The edit runs on a copy that replaces the
    /// stored value only if it succeeds.
    ///
    /// # Errors
    /// Returns [`ApiError::StrategyNotFound`] or the edit's error.
    pub fn update<T>(
        &self,
        id: Uuid,
        edit: impl FnOnce(&mut Strategy) -> Result<T, StrategyError>,
    ) -> Result<(Strategy, T), ApiError> {
        let mut entry = self
            .strategies
            .get_mut(&id)
            .ok_or(ApiError::StrategyNotFound(id))?;
        let mut draft = entry.value().clone();
        let output = edit(&mut draft)?;
        *entry.value_mut() = draft.clone();
        debug!("Updated strategy {}: {} legs", id, draft.legs().len());
        Ok((draft, output))
    }

    /// Discards a stored strategy.
    ///
    /// # Errors
    /// Returns [`ApiError::StrategyNotFound`] if the id is unknown.
    pub fn remove(&self, id: Uuid) -> Result<Strategy, ApiError> {
        let (_, strategy) = self
            .strategies
            .remove(&id)
            .ok_or(ApiError::StrategyNotFound(id))?;
        info!("Deleted strategy {}", id);
        Ok(strategy)
    }

    /// Summaries of every stored strategy, sorted by name then id.
    #[must_use]
    pub fn list(&self) -> Vec<StrategySummary> {
        let mut summaries: Vec<StrategySummary> = self
            .strategies
            .iter()
            .map(|entry| StrategySummary::new(*entry.key(), entry.value()))
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Builds the full snapshot of a strategy.
    ///
    /// A non-empty strategy without a price is returned without analysis.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidInput`] if the configured settings are unusable.
    pub fn snapshot(
        &self,
        id: Uuid,
        strategy: &Strategy,
        warnings: Vec<QuoteWarning>,
    ) -> Result<StrategySnapshotResponse, ApiError> {
        let analysis = match strategy.analyze(&self.payoff_settings()) {
            Ok(analysis) => Some(AnalysisResponse::from(analysis)),
            Err(StrategyError::MissingMarketData(_)) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(StrategySnapshotResponse {
            id,
            name: strategy.name().to_string(),
            symbol: strategy.underlying_symbol().to_string(),
            underlying_price: strategy.underlying_price(),
            legs: strategy.legs().to_vec(),
            analysis,
            warnings,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{InstrumentType, Leg, PositionSide};

    fn call() -> Leg {
        Leg::option(InstrumentType::Call, PositionSide::Long, 100.0, 1, 5.0).unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let state = AppState::new();
        let id = state.insert(Strategy::new("A", "AAPL", Some(100.0)).unwrap());
        assert_eq!(state.get(id).unwrap().name(), "A");
        assert_eq!(state.list().len(), 1);
        state.remove(id).unwrap();
        assert!(matches!(state.get(id), Err(ApiError::StrategyNotFound(_))));
        assert!(matches!(state.remove(id), Err(ApiError::StrategyNotFound(_))));
    }

    #[test]
    fn test_failed_update_keeps_stored_strategy() {
        let state = AppState::new();
        let id = state.insert(Strategy::new("A", "AAPL", Some(100.0)).unwrap());

        let result = state.update(id, |s| {
            s.add_leg(call())?;
            s.set_underlying_price(-1.0)
        });
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert!(state.get(id).unwrap().legs().is_empty());

        let (updated, ()) = state.update(id, |s| s.add_leg(call())).unwrap();
        assert_eq!(updated.legs().len(), 1);
        assert_eq!(state.get(id).unwrap().legs().len(), 1);
    }

    #[test]
    fn test_snapshot_without_price_has_no_analysis() {
        let state = AppState::new();
        let mut strategy = Strategy::new("A", "AAPL", None).unwrap();
        strategy.add_leg(call()).unwrap();
        let id = state.insert(strategy.clone());
        let snapshot = state.snapshot(id, &strategy, Vec::new()).unwrap();
        assert!(snapshot.analysis.is_none());
        assert_eq!(snapshot.legs.len(), 1);
    }

    #[test]
    fn test_list_sorted_by_name() {
        let state = AppState::new();
        state.insert(Strategy::new("Zeta", "AAPL", None).unwrap());
        state.insert(Strategy::new("Alpha", "AAPL", None).unwrap());
        let names: Vec<String> = state.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }
}
