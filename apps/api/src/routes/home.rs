use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn welcome_handler() -> Json<Value> {
    Json(json!({ "info": "Bem-vindos(as) à página inicial!" }))
}
