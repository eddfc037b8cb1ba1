//! mindmap-server
//!
//! mindmap-core の HTTP 面（axum）。
//!
//! # ルート
//! - `POST /convert`: インライン変換（生 HTML / JSON エンベロープ）
//! - `POST /convert-and-store`: 変換して保存し、取得 URL を返す
//! - `POST /render`: ツールバー付きページを生 HTML で返す
//! - `GET  /artifact/:filename`: 保存済み HTML の取得
//! - `GET  /health`: 死活確認

pub mod auth;
pub mod handlers;
pub mod response;
pub mod state;
pub mod telemetry;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use self::state::AppState;

/// 受け付けるリクエストボディの最大バイト数
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/convert", post(handlers::convert))
        .route("/convert-and-store", post(handlers::convert_and_store))
        .route("/render", post(handlers::render))
        .route("/artifact/:filename", get(handlers::artifact))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(auth::API_KEY_HEADER),
        ])
}
