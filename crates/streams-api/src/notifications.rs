use axum::{
    Json,
    extract::{Query, State},
};

use streams_core::notifications;
use streams_types::api::NotificationsResponse;

use crate::auth::AppState;
use crate::channels::TokenQuery;
use crate::error::ApiResult;
use crate::token;

pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<NotificationsResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(NotificationsResponse {
        notifications: notifications::notifications_get(&store, u_id),
    }))
}
