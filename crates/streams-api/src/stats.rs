use axum::{
    Json,
    extract::{Query, State},
};

use streams_core::stats;
use streams_types::api::{UserStatsResponse, WorkspaceStatsResponse};

use crate::auth::AppState;
use crate::channels::TokenQuery;
use crate::error::ApiResult;
use crate::token;

pub async fn user_stats(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<UserStatsResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(UserStatsResponse {
        user_stats: stats::user_stats(&store, u_id),
    }))
}

pub async fn workspace_stats(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<WorkspaceStatsResponse>> {
    let store = state.streams.lock();
    token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(WorkspaceStatsResponse {
        workspace_stats: stats::workspace_stats(&store),
    }))
}
