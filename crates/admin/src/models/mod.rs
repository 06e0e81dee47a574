//! Session-stored types.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
