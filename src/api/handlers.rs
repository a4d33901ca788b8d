//! API request handlers.

use crate::error::ApiError;
use crate::models::{
    AnalysisResponse, AnalyzeRequest, ApplyTemplateRequest, CreateStrategyRequest,
    DeleteResponse, HealthResponse, LegRequest, StrategiesListResponse, StrategySnapshotResponse,
    TemplateSummary, TemplatesListResponse, UpdateUnderlyingRequest,
};
use crate::state::AppState;
use crate::strategy::{
    LegUpdate, SavedStrategy, Strategy, StrategyError, catalog, find_template,
};
use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[cfg(test)]
mod tests;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Templates
// ============================================================================

/// List the strategy template catalog.
#[utoipa::path(
    get,
    path = "/api/v1/templates",
    responses(
        (status = 200, description = "Template catalog", body = TemplatesListResponse)
    ),
    tag = "Templates"
)]
pub async fn list_templates() -> Json<TemplatesListResponse> {
    Json(TemplatesListResponse {
        templates: catalog().iter().map(TemplateSummary::from).collect(),
    })
}

// ============================================================================
// Stateless Analysis
// ============================================================================

/// Analyze a list of legs without storing them.
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Payoff, Greeks and risk metrics", body = AnalysisResponse),
        (status = 400, description = "Invalid leg or price")
    ),
    tag = "Analysis"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let legs = request
        .legs
        .into_iter()
        .map(LegRequest::into_leg)
        .collect::<Result<Vec<_>, StrategyError>>()?;

    let mut strategy = Strategy::new("Ad hoc", "", Some(request.underlying_price))?;
    strategy.set_legs(legs)?;
    let analysis = strategy.analyze(&state.payoff_settings())?;

    Ok(Json(AnalysisResponse::from(analysis)))
}

// ============================================================================
// Strategy Management
// ============================================================================

/// List stored strategies.
#[utoipa::path(
    get,
    path = "/api/v1/strategies",
    responses(
        (status = 200, description = "Stored strategies", body = StrategiesListResponse)
    ),
    tag = "Strategies"
)]
pub async fn list_strategies(State(state): State<Arc<AppState>>) -> Json<StrategiesListResponse> {
    Json(StrategiesListResponse {
        strategies: state.list(),
    })
}

/// Create an empty strategy.
#[utoipa::path(
    post,
    path = "/api/v1/strategies",
    request_body = CreateStrategyRequest,
    responses(
        (status = 200, description = "Strategy created", body = StrategySnapshotResponse),
        (status = 400, description = "Invalid price")
    ),
    tag = "Strategies"
)]
pub async fn create_strategy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateStrategyRequest>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let strategy = Strategy::new(
        request.name.unwrap_or_else(|| "Custom".to_string()),
        request.symbol,
        request.underlying_price,
    )?;
    let id = state.insert(strategy.clone());
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Import a previously exported strategy.
#[utoipa::path(
    post,
    path = "/api/v1/strategies/import",
    request_body = SavedStrategy,
    responses(
        (status = 200, description = "Strategy imported", body = StrategySnapshotResponse),
        (status = 400, description = "Invalid saved strategy")
    ),
    tag = "Strategies"
)]
pub async fn import_strategy(
    State(state): State<Arc<AppState>>,
    Json(saved): Json<SavedStrategy>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let strategy = Strategy::from_saved(saved)?;
    let id = state.insert(strategy.clone());
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Get a strategy with its computed outputs.
#[utoipa::path(
    get,
    path = "/api/v1/strategies/{id}",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    responses(
        (status = 200, description = "Strategy snapshot", body = StrategySnapshotResponse),
        (status = 404, description = "Strategy not found")
    ),
    tag = "Strategies"
)]
pub async fn get_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let strategy = state.get(id)?;
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Discard a strategy.
#[utoipa::path(
    delete,
    path = "/api/v1/strategies/{id}",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    responses(
        (status = 200, description = "Strategy deleted", body = DeleteResponse),
        (status = 404, description = "Strategy not found")
    ),
    tag = "Strategies"
)]
pub async fn delete_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let strategy = state.remove(id)?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Strategy {} deleted", strategy.name()),
    }))
}

/// Update the underlying symbol and price.
#[utoipa::path(
    put,
    path = "/api/v1/strategies/{id}/underlying",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    request_body = UpdateUnderlyingRequest,
    responses(
        (status = 200, description = "Underlying updated", body = StrategySnapshotResponse),
        (status = 400, description = "Invalid price"),
        (status = 404, description = "Strategy not found")
    ),
    tag = "Strategies"
)]
pub async fn update_underlying(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUnderlyingRequest>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let (strategy, ()) = state.update(id, |s| {
        let symbol = request
            .symbol
            .unwrap_or_else(|| s.underlying_symbol().to_string());
        s.set_underlying(symbol, Some(request.price))
    })?;
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Export a strategy in its persisted shape.
#[utoipa::path(
    get,
    path = "/api/v1/strategies/{id}/export",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    responses(
        (status = 200, description = "Persisted strategy", body = SavedStrategy),
        (status = 404, description = "Strategy not found")
    ),
    tag = "Strategies"
)]
pub async fn export_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedStrategy>, ApiError> {
    let strategy = state.get(id)?;
    Ok(Json(strategy.to_saved(Utc::now())))
}

// ============================================================================
// Leg Management
// ============================================================================

/// Add a leg to a strategy.
#[utoipa::path(
    post,
    path = "/api/v1/strategies/{id}/legs",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    request_body = LegRequest,
    responses(
        (status = 200, description = "Leg added", body = StrategySnapshotResponse),
        (status = 400, description = "Invalid leg"),
        (status = 404, description = "Strategy not found")
    ),
    tag = "Legs"
)]
pub async fn add_leg(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<LegRequest>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let leg = request.into_leg()?;
    let (strategy, ()) = state.update(id, |s| s.add_leg(leg))?;
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Edit a leg.
#[utoipa::path(
    patch,
    path = "/api/v1/strategies/{id}/legs/{leg_id}",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier"),
        ("leg_id" = Uuid, Path, description = "Leg identifier")
    ),
    request_body = LegUpdate,
    responses(
        (status = 200, description = "Leg updated", body = StrategySnapshotResponse),
        (status = 400, description = "Invalid leg"),
        (status = 404, description = "Strategy or leg not found")
    ),
    tag = "Legs"
)]
pub async fn update_leg(
    State(state): State<Arc<AppState>>,
    Path((id, leg_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<LegUpdate>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let (strategy, ()) = state.update(id, |s| s.update_leg(leg_id, &update).map(|_| ()))?;
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Remove a leg.
#[utoipa::path(
    delete,
    path = "/api/v1/strategies/{id}/legs/{leg_id}",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier"),
        ("leg_id" = Uuid, Path, description = "Leg identifier")
    ),
    responses(
        (status = 200, description = "Leg removed", body = StrategySnapshotResponse),
        (status = 404, description = "Strategy or leg not found")
    ),
    tag = "Legs"
)]
pub async fn delete_leg(
    State(state): State<Arc<AppState>>,
    Path((id, leg_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let (strategy, _) = state.update(id, |s| s.remove_leg(leg_id))?;
    Ok(Json(state.snapshot(id, &strategy, Vec::new())?))
}

/// Replace a strategy's legs with a template built from a supplied chain.
#[utoipa::path(
    post,
    path = "/api/v1/strategies/{id}/template",
    params(
        ("id" = Uuid, Path, description = "Strategy identifier")
    ),
    request_body = ApplyTemplateRequest,
    responses(
        (status = 200, description = "Template applied", body = StrategySnapshotResponse),
        (status = 404, description = "Strategy or template not found"),
        (status = 422, description = "Missing price or option chain")
    ),
    tag = "Templates"
)]
pub async fn apply_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyTemplateRequest>,
) -> Result<Json<StrategySnapshotResponse>, ApiError> {
    let template = find_template(&request.template)?;
    let default_premium = request
        .default_premium
        .unwrap_or(state.config.analytics.default_premium);

    let (strategy, warnings) =
        state.update(id, |s| s.apply_template(template, &request.chain, default_premium))?;
    info!(
        "Applied template {} to strategy {} ({} legs, {} degraded quotes)",
        template.key,
        id,
        strategy.legs().len(),
        warnings.len()
    );
    Ok(Json(state.snapshot(id, &strategy, warnings)?))
}
