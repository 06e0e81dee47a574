//! Order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use atelier_core::{Order, OrderId, OrderStatus};
use atelier_store::{Fields, StoreError, paths};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

/// Order listing filters.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
}

/// Body of `PATCH /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// `GET /orders`
///
/// Newest first, optionally filtered by status.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    let mut orders: Vec<Order> = state.store().list(&paths::orders()).await?;
    if let Some(status) = query.status {
        orders.retain(|order| order.status == status);
    }
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

/// `GET /orders/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    load(&state, &OrderId::new(id)).await.map(Json)
}

/// `PATCH /orders/{id}/status`
///
/// Only forward transitions (or cancellation) are accepted; anything else is
/// a 409. The write only lands while the stored status is still the one the
/// transition was checked against, so a concurrent change is also a 409.
#[instrument(skip(state, admin, update), fields(admin = %admin.identity.uid, status = %update.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let id = OrderId::new(id);
    let mut order = load(&state, &id).await?;

    if !order.status.can_transition_to(update.status) {
        return Err(AppError::Conflict(format!(
            "cannot move order from {} to {}",
            order.status, update.status
        )));
    }

    let mut fields = Fields::new();
    fields.insert("status".to_owned(), json!(update.status));
    match state
        .store()
        .update_if(&paths::order(&id)?, "status", &order.status, fields)
        .await
    {
        Ok(()) => {}
        Err(StoreError::Precondition { .. }) => {
            return Err(AppError::Conflict(format!(
                "order {id} changed while moving it from {} to {}",
                order.status, update.status
            )));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(order_id = %id, from = %order.status, to = %update.status, "Order status updated");
    order.status = update.status;
    Ok(Json(order))
}

async fn load(state: &AppState, id: &OrderId) -> Result<Order> {
    state
        .store()
        .get(&paths::order(id)?)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;

    use atelier_core::{AdminRole, Email, Identity, ShippingDetails, UserId};
    use atelier_store::{
        CollectionPath, CollectionWatch, Document, DocumentPath, DocumentStore, MemoryStore,
        Store, to_fields,
    };

    use super::*;
    use std::result::Result;
    use crate::config::AdminConfig;
    use crate::models::CurrentAdmin;

    /// Cancels the order right after it is read, as another admin would.
    struct CancelsAfterRead {
        inner: Arc<MemoryStore>,
    }

    #[async_trait]
    impl DocumentStore for CancelsAfterRead {
        async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
            let doc = self.inner.get(path).await?;
            let mut cancelled = Fields::new();
            cancelled.insert("status".to_owned(), json!(OrderStatus::Cancelled));
            self.inner.update(path, cancelled).await?;
            Ok(doc)
        }
        async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
            self.inner.list(collection).await
        }
        async fn set(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
            self.inner.set(path, data).await
        }
        async fn insert(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
            self.inner.insert(path, data).await
        }
        async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
            self.inner.update(path, fields).await
        }
        async fn update_if(
            &self,
            path: &DocumentPath,
            field: &str,
            expected: &serde_json::Value,
            fields: Fields,
        ) -> Result<(), StoreError> {
            self.inner.update_if(path, field, expected, fields).await
        }
        async fn increment(
            &self,
            path: &DocumentPath,
            field: &str,
            delta: i64,
            max: i64,
            seed: Fields,
        ) -> Result<(), StoreError> {
            self.inner.increment(path, field, delta, max, seed).await
        }
        async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
            self.inner.delete(path).await
        }
        async fn watch(&self, collection: &CollectionPath) -> Result<CollectionWatch, StoreError> {
            self.inner.watch(collection).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    fn order(id: &OrderId) -> Order {
        Order {
            id: id.clone(),
            shipping: ShippingDetails {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "5551234".to_string(),
                address: "12 Analytical Way".to_string(),
                city: "London".to_string(),
                postal_code: "N1 9GU".to_string(),
                country: "UK".to_string(),
            },
            items: Vec::new(),
            total: rust_decimal::Decimal::ZERO,
            created_at: Utc::now(),
            user_id: None,
            status: OrderStatus::Pending,
        }
    }

    fn writer() -> CurrentAdmin {
        CurrentAdmin {
            identity: Identity {
                uid: UserId::new("admin"),
                email: Email::parse("admin@example.com").unwrap(),
            },
            role: AdminRole::Admin,
        }
    }

    #[tokio::test]
    async fn test_status_change_racing_another_admin_conflicts() {
        let memory = Arc::new(MemoryStore::new());
        let id = OrderId::new("ORD-1");
        let path = paths::order(&id).unwrap();
        memory.set(&path, to_fields(&order(&id)).unwrap()).await.unwrap();

        let state = AppState::new(
            AdminConfig::local("http://localhost:3001"),
            Store::new(CancelsAfterRead {
                inner: Arc::clone(&memory),
            }),
        );
        let result = update_status(
            State(state),
            RequireWriter(writer()),
            Path(id.as_str().to_string()),
            Json(StatusUpdate {
                status: OrderStatus::Processing,
            }),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        let stored = memory.get(&path).await.unwrap().unwrap();
        assert_eq!(stored.data["status"], "cancelled");
    }
}
