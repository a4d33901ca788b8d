//! Unit tests for error module.

use super::*;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Strategy not found".to_string(),
        code: "STRATEGY_NOT_FOUND".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Strategy not found\""));
    assert!(json.contains("\"code\":\"STRATEGY_NOT_FOUND\""));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_strategy_not_found_display() {
    let id = Uuid::nil();
    let error = ApiError::StrategyNotFound(id);
    assert_eq!(
        format!("{}", error),
        "Strategy not found: 00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn test_api_error_template_not_found_display() {
    let error = ApiError::TemplateNotFound("jade_lizard".to_string());
    assert_eq!(format!("{}", error), "Template not found: jade_lizard");
}

#[test]
fn test_api_error_invalid_input_display() {
    let error = ApiError::InvalidInput("quantity must be positive".to_string());
    assert_eq!(
        format!("{}", error),
        "Invalid input: quantity must be positive"
    );
}

#[test]
fn test_api_error_missing_market_data_display() {
    let error = ApiError::MissingMarketData("option chain is empty".to_string());
    assert_eq!(
        format!("{}", error),
        "Missing market data: option chain is empty"
    );
}

// ============================================================================
// IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_status_codes() {
    let cases = [
        (ApiError::StrategyNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
        (ApiError::LegNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
        (
            ApiError::TemplateNotFound("x".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (
            ApiError::InvalidInput("x".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::MissingMarketData("x".to_string()),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.into_response().status(), expected);
    }
}

#[test]
fn test_api_error_codes() {
    assert_eq!(
        ApiError::InvalidInput("x".to_string()).status_and_code().1,
        "INVALID_INPUT"
    );
    assert_eq!(
        ApiError::MissingMarketData("x".to_string())
            .status_and_code()
            .1,
        "MISSING_MARKET_DATA"
    );
}

// ============================================================================
// From<StrategyError> Tests
// ============================================================================

#[test]
fn test_from_strategy_error() {
    let error: ApiError = StrategyError::InvalidInput("bad".to_string()).into();
    assert!(matches!(error, ApiError::InvalidInput(msg) if msg == "bad"));

    let error: ApiError = StrategyError::MissingMarketData("no chain".to_string()).into();
    assert!(matches!(error, ApiError::MissingMarketData(_)));

    let id = Uuid::new_v4();
    let error: ApiError = StrategyError::LegNotFound(id).into();
    assert!(matches!(error, ApiError::LegNotFound(found) if found == id));

    let error: ApiError = StrategyError::UnknownTemplate("x".to_string()).into();
    assert!(matches!(error, ApiError::TemplateNotFound(_)));
}
