//! # Option Strategy Analytics - REST API Server
//!
//! Builds multi-leg option strategies and computes their expiration payoff,
//! aggregate Greeks and summary risk metrics. Built with
//! [Axum](https://crates.io/crates/axum) for async HTTP handling and provides
//! OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Payoff Engine**: Expiration profit/loss sampled over a ±30% band around
//!   spot, with breakevens located by sign change.
//!
//! - **Greeks Aggregation**: Signed, contract-weighted Delta/Gamma/Theta/Vega.
//!
//! - **Risk Metrics**: Max profit and max loss with explicit `Unlimited`
//!   detection, net debit/credit, a naive probability of profit and the
//!   risk/reward ratio.
//!
//! - **Template Catalog**: Twelve canonical strategies (covered call, iron
//!   condor, butterfly, calendar spread, ...) synthesized from a supplied
//!   option chain, degrading per leg when a quote is missing.
//!
//! - **Persistence Shape**: Strategies export to and import from
//!   `{name, symbol, underlyingPrice, legs, createdAt}` without loss.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`strategy`] | The analytics engine: legs, templates, payoff, Greeks, risk |
//! | [`api`] | Route handlers and router configuration |
//! | [`config`] | TOML configuration |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/templates` | List templates |
//! | POST | `/api/v1/analyze` | Analyze legs without storing them |
//! | GET | `/api/v1/strategies` | List strategies |
//! | POST | `/api/v1/strategies` | Create strategy |
//! | POST | `/api/v1/strategies/import` | Import a saved strategy |
//! | GET | `/api/v1/strategies/{id}` | Strategy snapshot with analysis |
//! | DELETE | `/api/v1/strategies/{id}` | Discard strategy |
//! | PUT | `/api/v1/strategies/{id}/underlying` | Update symbol and price |
//! | GET | `/api/v1/strategies/{id}/export` | Export saved shape |
//! | POST | `/api/v1/strategies/{id}/legs` | Add leg |
//! | PATCH | `/api/v1/strategies/{id}/legs/{leg_id}` | Edit leg |
//! | DELETE | `/api/v1/strategies/{id}/legs/{leg_id}` | Remove leg |
//! | POST | `/api/v1/strategies/{id}/template` | Apply a template to a chain |
//!
//! ## Example Usage
//!
//! ```bash
//! # Start the server (reads config.toml if present)
//! CONFIG_PATH=config.toml PORT=3000 cargo run
//!
//! # Analyze a long call
//! curl -X POST http://localhost:3000/api/v1/analyze \
//!   -H "Content-Type: application/json" \
//!   -d '{"underlyingPrice": 100, "legs": [{"instrumentType": "call",
//!        "positionSide": "long", "strike": 100, "quantity": 1, "premium": 5}]}'
//! ```
//!
//! ## Dependencies
//!
//! - **axum** (0.8): Async web framework
//! - **tower-http** (0.6): HTTP middleware (CORS, request tracing)
//! - **utoipa** (5.4): OpenAPI documentation generation
//! - **tokio** (1.49): Async runtime
//! - **serde** (1.0): Serialization/deserialization
//! - **tracing** (0.1): Structured logging

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod strategy;
