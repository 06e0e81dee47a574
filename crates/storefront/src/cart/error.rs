//! Cart error types.

use thiserror::Error;

use atelier_store::StoreError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation needs a signed-in user.
    #[error("must log in")]
    LoginRequired,

    /// A quantity of zero was requested.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The line would hold more than the largest storable quantity. Nothing
    /// was written.
    #[error("quantity may not exceed {max}")]
    QuantityTooLarge {
        /// Largest quantity a line can hold.
        max: u32,
    },

    /// The remote write failed.
    #[error("cart write failed: {0}")]
    Store(#[from] StoreError),

    /// Some deletes of a cart clear failed; the cart is partially cleared.
    #[error("failed to remove {failed} of {total} cart items")]
    PartialClear {
        /// Number of deletes that failed.
        failed: usize,
        /// Number of deletes attempted.
        total: usize,
    },

    /// The background write task panicked or was cancelled.
    #[error("cart write task aborted: {0}")]
    Aborted(String),
}
