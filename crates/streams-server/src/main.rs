use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use streams_api::auth::{self, AppState, AppStateInner};
use streams_api::{admin, channels, dms, messages, notifications, other, search, standups, stats};
use streams_core::Streams;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streams=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("STREAMS_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let host = std::env::var("STREAMS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("STREAMS_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Shared state: one in-memory store behind one lock.
    let state: AppState = Arc::new(AppStateInner {
        streams: Arc::new(Streams::new()),
        jwt_secret,
    });

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Streams server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register/v2", post(auth::register))
        .route("/auth/login/v2", post(auth::login))
        .route("/auth/logout/v1", post(auth::logout))
        .route("/channels/create/v2", post(channels::create))
        .route("/channels/list/v2", get(channels::list))
        .route("/channels/listall/v2", get(channels::listall))
        .route("/channel/join/v2", post(channels::join))
        .route("/channel/invite/v2", post(channels::invite))
        .route("/channel/leave/v1", post(channels::leave))
        .route("/channel/addowner/v1", post(channels::addowner))
        .route("/channel/removeowner/v1", post(channels::removeowner))
        .route("/channel/details/v2", get(channels::details))
        .route("/channel/messages/v2", get(channels::messages))
        .route("/dm/create/v1", post(dms::create))
        .route("/dm/list/v1", get(dms::list))
        .route("/dm/remove/v1", delete(dms::remove))
        .route("/dm/details/v1", get(dms::details))
        .route("/dm/leave/v1", post(dms::leave))
        .route("/dm/messages/v1", get(dms::messages))
        .route("/message/send/v1", post(messages::send))
        .route("/message/senddm/v1", post(messages::senddm))
        .route("/message/edit/v1", put(messages::edit))
        .route("/message/remove/v1", delete(messages::remove))
        .route("/message/react/v1", post(messages::react))
        .route("/message/unreact/v1", post(messages::unreact))
        .route("/message/pin/v1", post(messages::pin))
        .route("/message/unpin/v1", post(messages::unpin))
        .route("/message/share/v1", post(messages::share))
        .route("/message/sendlater/v1", post(messages::sendlater))
        .route("/message/sendlaterdm/v1", post(messages::sendlaterdm))
        .route("/standup/start/v1", post(standups::start))
        .route("/standup/active/v1", get(standups::active))
        .route("/standup/send/v1", post(standups::send))
        .route("/notifications/get/v1", get(notifications::get))
        .route("/search/v1", get(search::search))
        .route("/user/stats/v1", get(stats::user_stats))
        .route("/users/stats/v1", get(stats::workspace_stats))
        .route("/admin/user/remove/v1", delete(admin::user_remove))
        .route(
            "/admin/userpermission/change/v1",
            post(admin::permission_change),
        )
        .route("/clear/v1", delete(other::clear))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
