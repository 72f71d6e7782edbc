//! Service Layer
//!
//! One service object per resource, built once at startup and shared
//! through `AppState`. Services own their repositories, enforce the
//! entity rules and return `ApiResult`; handlers only validate input shape
//! and map results onto the response envelope.

pub mod builtin_tools;
pub mod permission;

mod agent_config_service;
mod capability_service;
mod interaction_service;
mod session_service;
mod task_service;
mod team_service;
mod template_service;
mod tool_log_service;
mod tool_service;

pub use agent_config_service::*;
pub use capability_service::*;
pub use interaction_service::*;
pub use session_service::*;
pub use task_service::*;
pub use team_service::*;
pub use template_service::*;
pub use tool_log_service::*;
pub use tool_service::*;
