//! Response Negotiator
//!
//! 2 つの独立した軸でレスポンスの形を決める:
//! - **Persistence**: インライン（`/convert`）か保存（`/convert-and-store`）か
//! - **Representation**: 生 HTML か JSON エンベロープか（リクエストヘッダで選択）
//!
//! 保存モードは表現軸に関係なく常に JSON（`StoredEnvelope`）を返す。

use serde::Serialize;

use crate::domain::{Artifact, ArtifactMetadata, StorageKind};

/// `Content-Disposition` を読めないクライアント向けにファイル名を繰り返すヘッダー
pub const FILENAME_ALIAS_HEADERS: [&str; 4] = [
    "x-filename",
    "x-file-name",
    "x-custom-filename",
    "x-content-filename",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Inline,
    Persisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    RawHtml,
    JsonEnvelope,
}

impl Representation {
    /// `accept` に `application/json` を含むか `x-expect-json` が `true` なら JSON
    pub fn from_headers(accept: Option<&str>, expect_json: Option<&str>) -> Self {
        let wants_json = accept.is_some_and(|v| v.contains("application/json"))
            || expect_json.is_some_and(|v| v.trim() == "true");
        if wants_json {
            Representation::JsonEnvelope
        } else {
            Representation::RawHtml
        }
    }
}

/// インライン変換の JSON ボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineEnvelope {
    pub success: bool,
    pub filename: String,
    pub content: String,
    pub content_type: &'static str,
    pub metadata: ArtifactMetadata,
}

impl InlineEnvelope {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            success: true,
            filename: artifact.filename.to_string(),
            content: artifact.html.clone(),
            content_type: "text/html",
            metadata: artifact.metadata(),
        }
    }
}

/// 保存済み変換の JSON ボディ。内容そのものは含めない
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEnvelope {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub url: String,
    pub storage_type: StorageKind,
}

impl StoredEnvelope {
    pub fn new(filename: impl Into<String>, url: impl Into<String>, storage: StorageKind) -> Self {
        Self {
            success: true,
            message: format!("mindmap stored ({storage})"),
            filename: filename.into(),
            url: url.into(),
            storage_type: storage,
        }
    }
}

/// 交渉済みのインラインレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineResponse {
    RawHtml(Artifact),
    Envelope(InlineEnvelope),
}

impl InlineResponse {
    pub fn negotiate(artifact: Artifact, representation: Representation) -> Self {
        match representation {
            Representation::RawHtml => InlineResponse::RawHtml(artifact),
            Representation::JsonEnvelope => {
                InlineResponse::Envelope(InlineEnvelope::from_artifact(&artifact))
            }
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            InlineResponse::RawHtml(artifact) => artifact.filename.as_str(),
            InlineResponse::Envelope(envelope) => &envelope.filename,
        }
    }
}
