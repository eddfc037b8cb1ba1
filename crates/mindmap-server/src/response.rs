//! MindmapError と交渉済みレスポンスを HTTP に変換する
//!
//! エラーはすべて `{"error": "<message>"}`。

use axum::Json;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use mindmap_core::MindmapError;
use mindmap_core::app::{FILENAME_ALIAS_HEADERS, InlineResponse};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::{error, warn};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// JavaScript の `encodeURIComponent` がエンコードしない文字
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug)]
pub struct ApiError(pub MindmapError);

impl From<MindmapError> for ApiError {
    fn from(err: MindmapError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// HTML の content type を付けたそのままの HTML ボディ
pub fn html_response(html: String) -> Response {
    ([(CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response()
}

pub fn inline_response(negotiated: InlineResponse) -> Response {
    let mut headers = filename_headers(negotiated.filename());
    match negotiated {
        InlineResponse::RawHtml(artifact) => {
            let encoded = encode_uri_component(artifact.filename.as_str());
            insert(
                &mut headers,
                CONTENT_TYPE,
                format!("{HTML_CONTENT_TYPE}; filename={encoded}"),
            );
            insert(
                &mut headers,
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", header_filename(artifact.filename.as_str())),
            );
            (headers, artifact.html).into_response()
        }
        InlineResponse::Envelope(envelope) => (headers, Json(envelope)).into_response(),
    }
}

/// アーティファクトのファイル名を載せる別名ヘッダー
fn filename_headers(filename: &str) -> HeaderMap {
    let value = header_filename(filename);
    let mut headers = HeaderMap::new();
    for name in FILENAME_ALIAS_HEADERS {
        insert(&mut headers, HeaderName::from_static(name), value.clone());
    }
    headers
}

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// ヘッダーにそのまま載せられるならファイル名自体、そうでなければ URI コンポーネントエンコードしたもの
fn header_filename(filename: &str) -> String {
    let plain = filename
        .chars()
        .all(|c| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\');
    if plain {
        filename.to_string()
    } else {
        encode_uri_component(filename)
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: String) {
    match HeaderValue::try_from(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(err) => warn!(header = %name, error = %err, "dropping unrepresentable header"),
    }
}
