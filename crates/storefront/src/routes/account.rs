//! Account route handlers (require auth).

use axum::{Json, extract::State};
use tracing::instrument;

use atelier_core::Order;
use atelier_store::paths;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `GET /account/orders`
///
/// The signed-in user's orders, newest first.
#[instrument(skip_all, fields(uid = %identity.uid))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let mut orders: Vec<Order> = state.store().list(&paths::orders()).await?;
    orders.retain(|order| order.user_id.as_ref() == Some(&identity.uid));
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}
