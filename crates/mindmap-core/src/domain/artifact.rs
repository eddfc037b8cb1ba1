//! Artifact - 描画済みの HTML マインドマップとメタデータ

use serde::{Deserialize, Serialize};

use super::filename::ArtifactFilename;

/// リクエストにタイトルがないときのタイトル
pub const DEFAULT_TITLE: &str = "Markdown MindMap";

/// メタデータの `format` フィールドの値
pub const ARTIFACT_FORMAT: &str = "mindmap";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub title: String,
    pub filename: String,
    /// 常に `"html"`
    #[serde(rename = "type")]
    pub kind: String,
    pub format: String,
}

/// マインドマップ 1 つ分の完全な HTML ドキュメント
///
/// 変換リクエストごとに 1 回だけ作り、以後は変更しない。作成時刻は保存時の
/// ファイル名のタイムスタンプにだけ残る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub title: String,
    pub filename: ArtifactFilename,
    pub html: String,
}

impl Artifact {
    pub fn new(title: impl Into<String>, filename: ArtifactFilename, html: String) -> Self {
        Self {
            title: title.into(),
            filename,
            html,
        }
    }

    pub fn metadata(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            title: self.title.clone(),
            filename: self.filename.to_string(),
            kind: "html".to_string(),
            format: ARTIFACT_FORMAT.to_string(),
        }
    }
}
