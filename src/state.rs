use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, payments::CheckoutProvider};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: AppConfig,
    pub checkout: Arc<dyn CheckoutProvider>,
}
