//! Health check route.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    status: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}
