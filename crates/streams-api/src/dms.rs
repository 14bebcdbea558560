use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use streams_core::dms;
use streams_types::api::{
    DmCreateRequest, DmCreateResponse, DmDetailsResponse, DmLeaveRequest, DmListResponse,
    MessagesResponse,
};

use crate::auth::AppState;
use crate::channels::TokenQuery;
use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct DmQuery {
    pub token: String,
    pub dm_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DmMessagesQuery {
    pub token: String,
    pub dm_id: i64,
    pub start: i64,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<DmCreateRequest>,
) -> ApiResult<Json<DmCreateResponse>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    let dm_id = dms::dm_create(&mut store, u_id, &req.u_ids)?;
    Ok(Json(DmCreateResponse { dm_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<DmListResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(DmListResponse {
        dms: dms::dm_list(&store, u_id),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<DmQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    dms::dm_remove(&mut store, u_id, query.dm_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn details(
    State(state): State<AppState>,
    Query(query): Query<DmQuery>,
) -> ApiResult<Json<DmDetailsResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(dms::dm_details(&store, u_id, query.dm_id)?))
}

pub async fn leave(
    State(state): State<AppState>,
    Json(req): Json<DmLeaveRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    dms::dm_leave(&mut store, u_id, req.dm_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn messages(
    State(state): State<AppState>,
    Query(query): Query<DmMessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(dms::dm_messages(
        &store,
        u_id,
        query.dm_id,
        query.start,
    )?))
}
