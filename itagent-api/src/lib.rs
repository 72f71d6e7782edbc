//! iT-Agent API - REST Layer for Multi-Agent Collaboration
//!
//! Exposes sessions, tasks, tools, tool logs, teams and the agent catalog
//! (templates, capabilities, interaction history) over an Axum JSON API.
//! Every response uses the `{success, data | error}` envelope.
//!
//! State is held in memory by the services in [`services`], built once by
//! [`AppState`] and shared across handlers.

#[macro_use]
mod macros;

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use auth::{
    authenticate_bearer, generate_jwt_token, validate_jwt_token, AuthConfig, AuthContext, Claims,
    FixedClock, JwtClock, SystemClock,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode, ErrorEnvelope};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState, OptionalAuth};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use response::ApiResponse;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
