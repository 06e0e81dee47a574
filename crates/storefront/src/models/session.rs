//! Session keys.
//!
//! The signed-in [`Identity`](atelier_core::Identity) is the only
//! authentication state kept in the session.

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in identity.
    pub const CURRENT_USER: &str = "current_user";
}
