//! Middleware modules for the iT-Agent API
//!
//! - `auth`: bearer-token authentication and the caller extractors
//!
//! Request tracing lives in [`crate::telemetry`].

mod auth;

pub use auth::{
    auth_middleware, AuthExtractor, AuthMiddlewareError, AuthMiddlewareState, OptionalAuth,
};
