//! Shopping cart.
//!
//! - [`CartStore`] - reactive view of one user's cart and its mutations
//! - [`PendingWrite`] - handle to a mutation's background write
//! - [`CartRegistry`] - shares one live cart per signed-in user

mod error;
mod pending;
mod registry;
mod store;

pub use error::CartError;
pub use pending::PendingWrite;
pub use registry::CartRegistry;
pub use store::{CartStore, CartWatch, MAX_LINE_QUANTITY};
