//! Errors - エラー型と分類
//!
//! # 分類
//! - **MindmapError**: リクエスト単位のエラー。HTTP ステータスに 1:1 で対応する
//! - **StoreError**: ストレージバックエンド単位のエラー。Gateway が吸収するか MindmapError に変換する
//!
//! リトライは一切行わない（外部呼び出しはすべて 1 回だけ）。

use std::path::PathBuf;

use thiserror::Error;

/// MindmapError はリクエスト単位のエラー
#[derive(Debug, Error)]
pub enum MindmapError {
    /// API キーがない、または一致しない
    #[error("unauthorized: invalid API key")]
    Auth,

    /// ボディや必須フィールドの不備、拒否されたファイル名
    #[error("{0}")]
    Validation(String),

    /// ボディが上限バイト数を超えた
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// 変換アダプタが入力を拒否した
    #[error("failed to convert markdown: {0}")]
    Transform(String),

    /// 有効なすべてのバックエンドに存在しない
    #[error("file not found: {0}")]
    NotFound(String),

    /// リモートストアが有効だが設定が不完全
    #[error("storage configuration error: {0}")]
    Config(String),

    /// リモート API 呼び出しの失敗
    #[error("remote storage error: {0}")]
    Remote(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MindmapError {
    /// エラー分類に対応する HTTP ステータスコード
    pub fn status_code(&self) -> u16 {
        match self {
            MindmapError::Auth => 401,
            MindmapError::Validation(_) | MindmapError::Transform(_) => 400,
            MindmapError::NotFound(_) => 404,
            MindmapError::PayloadTooLarge(_) => 413,
            MindmapError::Config(_) | MindmapError::Remote(_) | MindmapError::Internal(_) => 500,
        }
    }
}

/// StoreError はバックエンド単位のエラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration incomplete: {0}")]
    Config(String),

    #[error("{0}")]
    Remote(String),
}

impl From<StoreError> for MindmapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => MindmapError::NotFound(name),
            StoreError::Config(msg) => MindmapError::Config(msg),
            StoreError::Remote(msg) => MindmapError::Remote(msg),
            io @ StoreError::Io { .. } => MindmapError::Internal(io.to_string()),
        }
    }
}
