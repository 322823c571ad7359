use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::OrderItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    /// Leaves the stored tracking number untouched when absent.
    pub tracking_number: Option<String>,
}
