//! Session-related types for admin authentication.

use serde::Serialize;

use atelier_core::{AdminRole, Identity};

/// A signed-in admin with the role found at `roles/{uid}`.
///
/// Only the identity is kept in the session. The role is read on every
/// request, so a revoked role takes effect immediately.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentAdmin {
    #[serde(flatten)]
    pub identity: Identity,
    pub role: AdminRole,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the signed-in admin identity.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
