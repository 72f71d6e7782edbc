//! Request and response types for the REST API.
//!
//! Entities themselves (Session, Task, Tool, ...) serialize directly from
//! `itagent-core`; this module holds the request bodies, query filters and
//! composite responses around them.

mod agent_config;
mod catalog;
mod interaction;
mod session;
mod task;
mod team;
mod tool;
mod tool_log;

pub use agent_config::*;
pub use catalog::*;
pub use interaction::*;
pub use session::*;
pub use task::*;
pub use team::*;
pub use tool::*;
pub use tool_log::*;
