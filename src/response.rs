use serde::Serialize;
use utoipa::ToSchema;

/// Body for endpoints that acknowledge an action without echoing an entity.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
