//! HTTP ハンドラ
//!
//! 処理順は常に「認証 → ボディ検証 → 変換 → 保存」。認証に失敗したリクエストは
//! ボディの解析にも変換にも到達しない。ボディの読み込み失敗（上限超過など）も
//! 認証の後で `{error}` として返す。

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::http::header::ACCEPT;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use mindmap_core::MindmapError;
use mindmap_core::app::{ConvertRequest, Persistence, Representation};

use crate::auth::require_api_key;
use crate::response::{ApiError, html_response, inline_response};
use crate::state::{AppState, header_str};
use crate::BODY_LIMIT_BYTES;

type RawBody = Result<Bytes, BytesRejection>;

pub async fn convert(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: RawBody,
) -> Result<Response, ApiError> {
    handle_convert(&state, &headers, body, Persistence::Inline).await
}

pub async fn convert_and_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: RawBody,
) -> Result<Response, ApiError> {
    handle_convert(&state, &headers, body, Persistence::Persisted).await
}

async fn handle_convert(
    state: &AppState,
    headers: &HeaderMap,
    body: RawBody,
    persistence: Persistence,
) -> Result<Response, ApiError> {
    require_api_key(&state.app, headers)?;
    let request = ConvertRequest::from_json(&read_body(body)?)?;
    let service = &state.app.service;

    match persistence {
        Persistence::Inline => {
            let representation = Representation::from_headers(
                header_str(headers, ACCEPT.as_str()),
                header_str(headers, "x-expect-json"),
            );
            let negotiated = service.convert_inline(&request, representation)?;
            Ok(inline_response(negotiated))
        }
        Persistence::Persisted => {
            let base_url = state.base_url(headers);
            let stored = service.convert_and_store(&request, &base_url).await?;
            Ok(Json(stored).into_response())
        }
    }
}

/// ツールバー付きページ。常に HTML を返す
pub async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: RawBody,
) -> Result<Response, ApiError> {
    require_api_key(&state.app, &headers)?;
    let request = ConvertRequest::from_json(&read_body(body)?)?;
    let artifact = state.app.service.render_toolbar(&request)?;
    Ok(html_response(artifact.html))
}

fn read_body(body: RawBody) -> Result<Bytes, MindmapError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            MindmapError::PayloadTooLarge(BODY_LIMIT_BYTES)
        } else {
            MindmapError::Validation(rejection.body_text())
        }
    })
}

pub async fn artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let html = state.app.service.fetch(&filename).await?;
    Ok(html_response(html))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "mindmap service is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
