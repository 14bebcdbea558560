use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use tracing::info;

use streams_core::{CoreError, Streams, users};
use streams_types::api::{AuthResponse, LoginRequest, LogoutRequest, RegisterRequest};

use crate::error::ApiResult;
use crate::token;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub streams: Arc<Streams>,
    pub jwt_secret: String,
}

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::invalid("password must be at least 6 characters").into());
    }

    // Hash with Argon2id before taking the store lock.
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| CoreError::invalid("password could not be hashed"))?
        .to_string();

    let mut store = state.streams.lock();
    let auth_user_id = users::create_user(
        &mut store,
        &req.email,
        &password_hash,
        &req.name_first,
        &req.name_last,
    )?;

    let (token, session_id) = token::issue(&state.jwt_secret, auth_user_id)
        .map_err(|_| CoreError::invalid("token could not be issued"))?;
    store.add_session(session_id, auth_user_id);

    info!(auth_user_id, "registered user");
    Ok(Json(AuthResponse {
        token,
        auth_user_id,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut store = state.streams.lock();
    let user = store
        .user_by_email(&req.email)
        .ok_or_else(|| CoreError::invalid("email is not registered"))?;
    let auth_user_id = user.u_id;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| CoreError::invalid("password is incorrect"))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| CoreError::invalid("password is incorrect"))?;

    let (token, session_id) = token::issue(&state.jwt_secret, auth_user_id)
        .map_err(|_| CoreError::invalid("token could not be issued"))?;
    store.add_session(session_id, auth_user_id);

    Ok(Json(AuthResponse {
        token,
        auth_user_id,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let claims = token::claims(&state.jwt_secret, &req.token)?;
    let mut store = state.streams.lock();
    if !store.remove_session(&claims.session_id) {
        return Err(CoreError::forbidden("invalid token").into());
    }
    Ok(Json(serde_json::json!({})))
}
