//! API キー認証
//!
//! `x-api-key` ヘッダを設定値と完全一致で比較する。本文の解析や変換より先に実行する。

use axum::http::HeaderMap;
use mindmap_core::{App, MindmapError};
use tracing::warn;

use crate::state::header_str;

pub const API_KEY_HEADER: &str = "x-api-key";

pub fn require_api_key(app: &App, headers: &HeaderMap) -> Result<(), MindmapError> {
    let presented = header_str(headers, API_KEY_HEADER);
    if app.authorize(presented) {
        Ok(())
    } else {
        warn!(present = presented.is_some(), "rejected request with invalid API key");
        Err(MindmapError::Auth)
    }
}
