use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use streams_core::messaging;
use streams_types::api::SearchResponse;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub token: String,
    pub query_str: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let store = state.streams.lock();
    let u_id = token::resolve(&store, &state.jwt_secret, &query.token)?;
    Ok(Json(SearchResponse {
        messages: messaging::search(&store, u_id, &query.query_str)?,
    }))
}
