//! ArtifactFilename - アーティファクトのファイル名解決
//!
//! # ルール
//! - 入力なし（または空文字）→ `mindmap.html`
//! - `.html` で終わる → そのまま
//! - それ以外 → `.html` を付与
//! - 共有名前空間に保存する場合は `.html` を外して `-<epoch-millis>` を付け、再度 `.html` を付与
//!
//! パストラバーサルのチェックはここでは行わない（Retrieval Gateway の責務）。

use serde::{Deserialize, Serialize};
use std::fmt;

pub const HTML_SUFFIX: &str = ".html";

pub const DEFAULT_FILENAME: &str = "mindmap.html";

/// 必ず `.html` で終わるファイル名
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactFilename(String);

impl ArtifactFilename {
    /// ユーザー指定の（任意の）名前を正規化する
    pub fn resolve(input: Option<&str>) -> Self {
        match input {
            None | Some("") => Self(DEFAULT_FILENAME.to_string()),
            Some(name) if name.ends_with(HTML_SUFFIX) => Self(name.to_string()),
            Some(name) => Self(format!("{name}{HTML_SUFFIX}")),
        }
    }

    /// 共有ストレージ向けに `<stem>-<millis>.html` へ一意化する
    ///
    /// 同じミリ秒内の 2 回の呼び出しは同じ名前になる。
    pub fn with_timestamp(&self, epoch_millis: i64) -> Self {
        Self(format!("{}-{epoch_millis}{HTML_SUFFIX}", self.stem()))
    }

    /// `.html` を除いた名前
    pub fn stem(&self) -> &str {
        self.0.strip_suffix(HTML_SUFFIX).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ArtifactFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
