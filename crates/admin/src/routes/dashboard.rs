//! Dashboard statistics.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use atelier_core::{Order, OrderStatus, Product};
use atelier_store::paths;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub product_count: usize,
    pub order_count: usize,
    pub pending_orders: usize,
    /// Total of all orders that were not cancelled.
    pub revenue: Decimal,
}

impl DashboardStats {
    fn compute(products: &[Product], orders: &[Order]) -> Self {
        Self {
            product_count: products.len(),
            order_count: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            revenue: orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total)
                .sum(),
        }
    }
}

/// `GET /dashboard`
#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let products_path = paths::products();
    let orders_path = paths::orders();
    let (products, orders) = tokio::try_join!(
        state.store().list::<Product>(&products_path),
        state.store().list::<Order>(&orders_path),
    )?;
    Ok(Json(DashboardStats::compute(&products, &orders)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use atelier_core::{OrderId, ShippingDetails};

    use super::*;

    fn order(total: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new("ORD-1-AAAAAA"),
            shipping: ShippingDetails {
                full_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "5551234".to_string(),
                address: "1 Way".to_string(),
                city: "London".to_string(),
                postal_code: "N1".to_string(),
                country: "UK".to_string(),
            },
            items: Vec::new(),
            total: Decimal::from(total),
            created_at: Utc::now(),
            user_id: None,
            status,
        }
    }

    #[test]
    fn test_revenue_skips_cancelled_orders() {
        let orders = vec![
            order(100, OrderStatus::Pending),
            order(50, OrderStatus::Shipped),
            order(999, OrderStatus::Cancelled),
        ];
        let stats = DashboardStats::compute(&[Product::default()], &orders);
        assert_eq!(stats.product_count, 1);
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.revenue, Decimal::from(150));
    }
}
