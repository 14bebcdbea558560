use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use streams_core::channels;
use streams_types::api::{
    ChannelDetailsResponse, ChannelInviteRequest, ChannelJoinRequest, ChannelLeaveRequest,
    ChannelOwnerRequest, ChannelsCreateRequest, ChannelsCreateResponse, ChannelsListResponse,
    MessagesResponse,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub token: String,
    pub channel_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChannelMessagesQuery {
    pub token: String,
    pub channel_id: i64,
    pub start: i64,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ChannelsCreateRequest>,
) -> ApiResult<Json<ChannelsCreateResponse>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    let channel_id = channels::channels_create(&mut store, u_id, &req.name, req.is_public)?;
    Ok(Json(ChannelsCreateResponse { channel_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<ChannelsListResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(ChannelsListResponse {
        channels: channels::channels_list(&store, u_id),
    }))
}

pub async fn listall(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<ChannelsListResponse>> {
    let store = state.streams.lock();
    token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(ChannelsListResponse {
        channels: channels::channels_listall(&store),
    }))
}

pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<ChannelJoinRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    channels::channel_join(&mut store, u_id, req.channel_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn invite(
    State(state): State<AppState>,
    Json(req): Json<ChannelInviteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    channels::channel_invite(&mut store, u_id, req.channel_id, req.u_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn leave(
    State(state): State<AppState>,
    Json(req): Json<ChannelLeaveRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    channels::channel_leave(&mut store, u_id, req.channel_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn addowner(
    State(state): State<AppState>,
    Json(req): Json<ChannelOwnerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    channels::channel_addowner(&mut store, u_id, req.channel_id, req.u_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn removeowner(
    State(state): State<AppState>,
    Json(req): Json<ChannelOwnerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    channels::channel_removeowner(&mut store, u_id, req.channel_id, req.u_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn details(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelDetailsResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(channels::channel_details(
        &store,
        u_id,
        query.channel_id,
    )?))
}

pub async fn messages(
    State(state): State<AppState>,
    Query(query): Query<ChannelMessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(channels::channel_messages(
        &store,
        u_id,
        query.channel_id,
        query.start,
    )?))
}
