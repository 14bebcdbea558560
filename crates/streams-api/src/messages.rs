use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use streams_core::messaging;
use streams_types::api::{
    MessageEditRequest, MessageIdResponse, MessagePinRequest, MessageReactRequest,
    MessageSendDmRequest, MessageSendLaterDmRequest, MessageSendLaterRequest, MessageSendRequest,
    MessageShareRequest, SharedMessageIdResponse,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub token: String,
    pub message_id: i64,
}

pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<MessageSendRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    let message_id = messaging::message_send(&mut store, u_id, req.channel_id, &req.message)?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn senddm(
    State(state): State<AppState>,
    Json(req): Json<MessageSendDmRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    let message_id = messaging::message_senddm(&mut store, u_id, req.dm_id, &req.message)?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn edit(
    State(state): State<AppState>,
    Json(req): Json<MessageEditRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    messaging::message_edit(&mut store, u_id, req.message_id, &req.message)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    messaging::message_remove(&mut store, u_id, query.message_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn react(
    State(state): State<AppState>,
    Json(req): Json<MessageReactRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    messaging::message_react(&mut store, u_id, req.message_id, req.react_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn unreact(
    State(state): State<AppState>,
    Json(req): Json<MessageReactRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    messaging::message_unreact(&mut store, u_id, req.message_id, req.react_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn pin(
    State(state): State<AppState>,
    Json(req): Json<MessagePinRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    messaging::message_pin(&mut store, u_id, req.message_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn unpin(
    State(state): State<AppState>,
    Json(req): Json<MessagePinRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    messaging::message_unpin(&mut store, u_id, req.message_id)?;
    Ok(Json(serde_json::json!({})))
}

pub async fn share(
    State(state): State<AppState>,
    Json(req): Json<MessageShareRequest>,
) -> ApiResult<Json<SharedMessageIdResponse>> {
    let mut store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &req.token)?;
    let shared_message_id = messaging::message_share(
        &mut store,
        u_id,
        req.og_message_id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?;
    Ok(Json(SharedMessageIdResponse { shared_message_id }))
}

pub async fn sendlater(
    State(state): State<AppState>,
    Json(req): Json<MessageSendLaterRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    // Resolve under the lock, then let the messaging layer manage its own
    // lock scope: the timer must be armed with the lock released.
    let u_id = {
        let store = state.streams.lock();
        token::resolve(&store, &state.jwt_secret, &req.token)?
    };
    let message_id = messaging::message_send_later(
        &state.streams,
        u_id,
        req.channel_id,
        req.message,
        req.time_sent,
    )?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn sendlaterdm(
    State(state): State<AppState>,
    Json(req): Json<MessageSendLaterDmRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let u_id = {
        let store = state.streams.lock();
        token::resolve(&store, &state.jwt_secret, &req.token)?
    };
    let message_id = messaging::message_send_later_dm(
        &state.streams,
        u_id,
        req.dm_id,
        req.message,
        req.time_sent,
    )?;
    Ok(Json(MessageIdResponse { message_id }))
}
