//! Unit tests for API handlers.

use super::*;
use crate::strategy::{
    Bound, ChainQuote, DegradedQuote, InstrumentType, OptionChain, PositionSide,
};

fn state() -> Arc<AppState> {
    Arc::new(AppState::new())
}

fn call_request(side: PositionSide, strike: f64, premium: f64) -> LegRequest {
    LegRequest {
        instrument_type: InstrumentType::Call,
        position_side: side,
        strike: Some(strike),
        expiration: None,
        quantity: 1,
        premium,
        delta: Some(0.5),
        gamma: None,
        theta: None,
        vega: None,
        implied_volatility: None,
    }
}

async fn create(state: &Arc<AppState>, price: Option<f64>) -> Uuid {
    let Json(snapshot) = create_strategy(
        State(Arc::clone(state)),
        Json(CreateStrategyRequest {
            name: None,
            symbol: "AAPL".to_string(),
            underlying_price: price,
        }),
    )
    .await
    .unwrap();
    snapshot.id
}

fn chain() -> OptionChain {
    let calls = [90.0, 95.0, 100.0, 105.0, 110.0]
        .iter()
        .map(|&strike| ChainQuote {
            strike,
            expiration: None,
            premium: 3.0,
            delta: 0.4,
            gamma: 0.02,
            theta: -0.03,
            vega: 0.1,
            implied_volatility: Some(0.25),
        })
        .collect();
    OptionChain {
        expirations: vec!["2025-01-17".to_string()],
        calls,
        puts: vec![],
    }
}

// ============================================================================
// Health & Templates
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let Json(health) = health_check().await;
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_list_templates() {
    let Json(response) = list_templates().await;
    assert_eq!(response.templates.len(), 12);
    assert!(response.templates.iter().any(|t| t.key == "iron_condor"));
}

// ============================================================================
// Stateless Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_long_call() {
    let Json(response) = analyze(
        State(state()),
        Json(AnalyzeRequest {
            underlying_price: 100.0,
            legs: vec![call_request(PositionSide::Long, 100.0, 5.0)],
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.analysis.risk.max_loss, Bound::Finite(-500.0));
    assert_eq!(response.analysis.risk.max_profit, Bound::Unlimited);
    assert_eq!(response.display.max_profit, "Unlimited");
    assert_eq!(response.display.breakevens, vec!["105.00".to_string()]);
    assert_eq!(response.analysis.greeks.delta, 0.5);
}

#[tokio::test]
async fn test_analyze_rejects_invalid_leg() {
    let mut leg = call_request(PositionSide::Long, 100.0, 5.0);
    leg.quantity = 0;
    let result = analyze(
        State(state()),
        Json(AnalyzeRequest {
            underlying_price: 100.0,
            legs: vec![leg],
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_analyze_rejects_negative_price() {
    let result = analyze(
        State(state()),
        Json(AnalyzeRequest {
            underlying_price: -5.0,
            legs: vec![],
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

// ============================================================================
// Strategy Lifecycle
// ============================================================================

#[tokio::test]
async fn test_strategy_lifecycle() {
    let state = state();
    let id = create(&state, Some(100.0)).await;

    let Json(snapshot) = add_leg(
        State(Arc::clone(&state)),
        Path(id),
        Json(call_request(PositionSide::Long, 100.0, 5.0)),
    )
    .await
    .unwrap();
    assert_eq!(snapshot.legs.len(), 1);
    let leg_id = snapshot.legs[0].id;
    let analysis = snapshot.analysis.expect("priced strategy has analysis");
    assert_eq!(analysis.analysis.risk.initial_cost, 500.0);

    let Json(snapshot) = update_leg(
        State(Arc::clone(&state)),
        Path((id, leg_id)),
        Json(LegUpdate {
            position_side: Some(PositionSide::Short),
            ..LegUpdate::default()
        }),
    )
    .await
    .unwrap();
    let analysis = snapshot.analysis.unwrap();
    assert_eq!(analysis.analysis.risk.initial_cost, -500.0);
    assert_eq!(analysis.analysis.risk.max_loss, Bound::Unlimited);

    let Json(snapshot) = delete_leg(State(Arc::clone(&state)), Path((id, leg_id)))
        .await
        .unwrap();
    assert!(snapshot.legs.is_empty());

    let Json(list) = list_strategies(State(Arc::clone(&state))).await;
    assert_eq!(list.strategies.len(), 1);

    let Json(deleted) = delete_strategy(State(Arc::clone(&state)), Path(id))
        .await
        .unwrap();
    assert!(deleted.success);

    let result = get_strategy(State(state), Path(id)).await;
    assert!(matches!(result, Err(ApiError::StrategyNotFound(_))));
}

#[tokio::test]
async fn test_update_leg_unknown_leg() {
    let state = state();
    let id = create(&state, Some(100.0)).await;
    let result = update_leg(
        State(state),
        Path((id, Uuid::new_v4())),
        Json(LegUpdate::default()),
    )
    .await;
    assert!(matches!(result, Err(ApiError::LegNotFound(_))));
}

#[tokio::test]
async fn test_invalid_edit_keeps_prior_leg() {
    let state = state();
    let id = create(&state, Some(100.0)).await;
    let Json(snapshot) = add_leg(
        State(Arc::clone(&state)),
        Path(id),
        Json(call_request(PositionSide::Long, 100.0, 5.0)),
    )
    .await
    .unwrap();
    let leg = snapshot.legs[0].clone();

    let result = update_leg(
        State(Arc::clone(&state)),
        Path((id, leg.id)),
        Json(LegUpdate {
            quantity: Some(0),
            ..LegUpdate::default()
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let Json(snapshot) = get_strategy(State(state), Path(id)).await.unwrap();
    assert_eq!(snapshot.legs, vec![leg]);
}

#[tokio::test]
async fn test_changing_symbol_clears_legs() {
    let state = state();
    let id = create(&state, Some(100.0)).await;
    add_leg(
        State(Arc::clone(&state)),
        Path(id),
        Json(call_request(PositionSide::Long, 100.0, 5.0)),
    )
    .await
    .unwrap();

    let Json(snapshot) = update_underlying(
        State(Arc::clone(&state)),
        Path(id),
        Json(UpdateUnderlyingRequest {
            symbol: None,
            price: 102.0,
        }),
    )
    .await
    .unwrap();
    assert_eq!(snapshot.legs.len(), 1);
    assert_eq!(snapshot.underlying_price, Some(102.0));

    let Json(snapshot) = update_underlying(
        State(state),
        Path(id),
        Json(UpdateUnderlyingRequest {
            symbol: Some("MSFT".to_string()),
            price: 400.0,
        }),
    )
    .await
    .unwrap();
    assert!(snapshot.legs.is_empty());
    assert_eq!(snapshot.symbol, "MSFT");
}

// ============================================================================
// Templates
// ============================================================================

#[tokio::test]
async fn test_apply_template_with_degraded_quote() {
    let state = state();
    let id = create(&state, Some(100.0)).await;

    let mut chain = chain();
    chain.calls.retain(|q| q.strike != 110.0);
    chain.calls.push(ChainQuote {
        strike: 110.0,
        expiration: Some("2025-02-21".to_string()),
        premium: 1.0,
        delta: 0.2,
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
        implied_volatility: None,
    });

    let Json(snapshot) = apply_template(
        State(state),
        Path(id),
        Json(ApplyTemplateRequest {
            template: "Covered Call".to_string(),
            chain,
            default_premium: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(snapshot.name, "Covered Call");
    assert_eq!(snapshot.legs.len(), 2);
    assert_eq!(snapshot.warnings.len(), 1);
    assert_eq!(
        snapshot.warnings[0].issue,
        DegradedQuote::MissingStrike {
            requested: 110.0,
            substituted: 105.0,
        }
    );
    assert!(snapshot.legs[1].estimated);
}

#[tokio::test]
async fn test_apply_template_without_price_fails() {
    let state = state();
    let id = create(&state, None).await;
    let result = apply_template(
        State(Arc::clone(&state)),
        Path(id),
        Json(ApplyTemplateRequest {
            template: "long_call".to_string(),
            chain: chain(),
            default_premium: None,
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::MissingMarketData(_))));

    let Json(snapshot) = get_strategy(State(state), Path(id)).await.unwrap();
    assert!(snapshot.legs.is_empty());
}

#[tokio::test]
async fn test_apply_unknown_template() {
    let state = state();
    let id = create(&state, Some(100.0)).await;
    let result = apply_template(
        State(state),
        Path(id),
        Json(ApplyTemplateRequest {
            template: "jade_lizard".to_string(),
            chain: chain(),
            default_premium: None,
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::TemplateNotFound(_))));
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_export_import_round_trip() {
    let state = state();
    let id = create(&state, Some(100.0)).await;
    apply_template(
        State(Arc::clone(&state)),
        Path(id),
        Json(ApplyTemplateRequest {
            template: "bull_call_spread".to_string(),
            chain: chain(),
            default_premium: None,
        }),
    )
    .await
    .unwrap();

    let Json(saved) = export_strategy(State(Arc::clone(&state)), Path(id))
        .await
        .unwrap();
    let json = serde_json::to_string(&saved).unwrap();
    let reloaded: SavedStrategy = serde_json::from_str(&json).unwrap();

    let Json(imported) = import_strategy(State(Arc::clone(&state)), Json(reloaded))
        .await
        .unwrap();
    let Json(original) = get_strategy(State(state), Path(id)).await.unwrap();

    assert_ne!(imported.id, original.id);
    assert_eq!(imported.legs, original.legs);
    assert_eq!(
        imported.analysis.unwrap().analysis,
        original.analysis.unwrap().analysis
    );
}
