use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

fn default_list() -> Vec<String> {
    Vec::new()
}

/// Used for both create and full update; derived rating fields are never
/// client-settable.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub category: String,
    #[serde(default = "default_list")]
    pub images: Vec<String>,
    #[serde(default = "default_list")]
    pub labels: Vec<String>,
    #[serde(default = "default_list")]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}
