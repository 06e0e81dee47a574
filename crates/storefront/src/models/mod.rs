//! Session-stored types.

pub mod session;

pub use session::keys as session_keys;
