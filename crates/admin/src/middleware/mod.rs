//! HTTP middleware for admin.

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, RequireWriter, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
