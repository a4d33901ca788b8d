//! Option Strategy Analytics Server
//!
//! REST API server for building multi-leg option strategies and computing
//! their payoff, Greeks and risk metrics.

use option_strategy_analytics::api::create_router;
use option_strategy_analytics::config::Config;
use option_strategy_analytics::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use option_strategy_analytics::error::ErrorResponse;
use option_strategy_analytics::models::{
    AnalysisResponse, AnalyzeRequest, ApplyTemplateRequest, CreateStrategyRequest,
    DeleteResponse, HealthResponse, LegRequest, RiskDisplay, StrategiesListResponse,
    StrategySnapshotResponse, StrategySummary, TemplateSummary, TemplatesListResponse,
    UpdateUnderlyingRequest,
};
use option_strategy_analytics::strategy::{
    AggregateGreeks, Bound, ChainQuote, DegradedQuote, ExpirationChoice, Greeks, InstrumentType,
    Leg, LegUpdate, Moneyness, OptionChain, PayoffCurve, PayoffPoint, PositionSide, QuoteWarning,
    RiskMetrics, SavedStrategy, StrategyAnalysis, TemplateLeg,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        option_strategy_analytics::api::handlers::health_check,
        option_strategy_analytics::api::handlers::list_templates,
        option_strategy_analytics::api::handlers::analyze,
        option_strategy_analytics::api::handlers::list_strategies,
        option_strategy_analytics::api::handlers::create_strategy,
        option_strategy_analytics::api::handlers::import_strategy,
        option_strategy_analytics::api::handlers::get_strategy,
        option_strategy_analytics::api::handlers::delete_strategy,
        option_strategy_analytics::api::handlers::update_underlying,
        option_strategy_analytics::api::handlers::export_strategy,
        option_strategy_analytics::api::handlers::add_leg,
        option_strategy_analytics::api::handlers::update_leg,
        option_strategy_analytics::api::handlers::delete_leg,
        option_strategy_analytics::api::handlers::apply_template,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            TemplateSummary,
            TemplatesListResponse,
            TemplateLeg,
            Moneyness,
            ExpirationChoice,
            AnalyzeRequest,
            AnalysisResponse,
            RiskDisplay,
            LegRequest,
            LegUpdate,
            Leg,
            Greeks,
            InstrumentType,
            PositionSide,
            CreateStrategyRequest,
            UpdateUnderlyingRequest,
            ApplyTemplateRequest,
            OptionChain,
            ChainQuote,
            StrategySummary,
            StrategiesListResponse,
            StrategySnapshotResponse,
            StrategyAnalysis,
            PayoffCurve,
            PayoffPoint,
            AggregateGreeks,
            RiskMetrics,
            Bound,
            QuoteWarning,
            DegradedQuote,
            SavedStrategy,
            DeleteResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Templates", description = "Strategy template catalog"),
        (name = "Analysis", description = "Stateless strategy analysis"),
        (name = "Strategies", description = "Strategy management"),
        (name = "Legs", description = "Leg management"),
    ),
    info(
        title = "Option Strategy Analytics API",
        version = "0.1.0",
        description = "Payoff, Greeks and risk metrics for multi-leg option strategies",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load_or_default(&config_path)?;
    info!("Loaded configuration from {}", config_path);

    // Environment overrides the configured host and port
    let host = std::env::var("HOST").unwrap_or_else(|_| config.server.host.clone());
    let port: u16 = match std::env::var("PORT") {
        Ok(value) => value.parse()?,
        Err(_) => config.server.port,
    };

    // Create application state
    let state = Arc::new(AppState::from_config(config));

    info!("Starting Option Strategy Analytics on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
