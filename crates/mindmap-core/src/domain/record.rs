//! ストレージ層のレコード

use serde::{Deserialize, Serialize};
use std::fmt;

/// 書き込みを最終的に受け付けたバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Local,
    Github,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Local => "local",
            StorageKind::Github => "github",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// リモート contents API への create-or-update リクエスト
///
/// `prior_hash` は楽観的並行制御のトークン。`None` は新規作成、
/// `Some(sha)` は `sha` のバージョンを置き換える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub path: String,
    pub content_base64: String,
    pub branch: String,
    pub prior_hash: Option<String>,
}

/// リモートストアが現在保持しているオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub sha: String,
    pub content_base64: String,
}
