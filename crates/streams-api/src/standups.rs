use axum::{
    Json,
    extract::{Query, State},
};

use streams_core::standup;
use streams_types::api::{
    StandupActiveResponse, StandupSendRequest, StandupStartRequest, StandupStartResponse,
};

use crate::auth::AppState;
use crate::channels::ChannelQuery;
use crate::error::ApiResult;
use crate::token;

pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<Json<StandupStartResponse>> {
    let u_id = {
        let store = state.streams.lock();
        token::resolve(&store, &state.jwt_secret, &req.token)?
    };
    let time_finish = standup::standup_start(&state.streams, u_id, req.channel_id, req.length)?;
    Ok(Json(StandupStartResponse { time_finish }))
}

pub async fn active(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<StandupActiveResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    let (is_active, time_finish) = standup::standup_active(&store, u_id, query.channel_id)?;
    Ok(Json(StandupActiveResponse {
        is_active,
        time_finish,
    }))
}

pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    standup::standup_send(&mut store, u_id, req.channel_id, &req.message)?;
    Ok(Json(serde_json::json!({})))
}
