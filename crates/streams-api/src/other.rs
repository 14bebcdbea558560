use axum::{Json, extract::State};
use tracing::info;

use crate::auth::AppState;
use crate::error::ApiResult;

/// Reset the store to its initial shape. Pending timer callbacks observe the
/// epoch change and no-op.
pub async fn clear(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    store.clear();
    info!("store cleared");
    Ok(Json(serde_json::json!({})))
}
