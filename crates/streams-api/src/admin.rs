use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::info;

use streams_core::users;
use streams_types::api::PermissionChangeRequest;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct UserRemoveQuery {
    pub token: String,
    pub u_id: i64,
}

pub async fn user_remove(
    State(state): State<AppState>,
    Query(query): Query<UserRemoveQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let caller = token::resolve(&store, &state.jwt_secret, &query.token)?;
    users::admin_remove(&mut store, caller, query.u_id)?;
    info!(u_id = query.u_id, "removed user from workspace");
    Ok(Json(serde_json::json!({})))
}

pub async fn permission_change(
    State(state): State<AppState>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let caller = token::resolve(&store, &state.jwt_secret, &req.token)?;
    users::change_permission(&mut store, caller, req.u_id, req.permission_id)?;
    Ok(Json(serde_json::json!({})))
}
