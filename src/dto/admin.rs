use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Order;

/// Summary counts and sums, computed fresh on every request.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    pub recent_orders: Vec<Order>,
}
