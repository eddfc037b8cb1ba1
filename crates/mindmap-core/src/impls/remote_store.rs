//! RemoteArtifactStore - ContentsApi 上の永続ストア
//!
//! # 書き込みフロー
//! 1. `mindmaps/<filename>` の現在のオブジェクトを取得して sha を得る（存在しなければ新規作成扱い）
//! 2. base64 にした内容と、あれば sha を楽観的並行制御トークンとして 1 回の PUT で送る
//!
//! 同じファイル名への並行書き込みは直列化しない（競合時は後勝ち、またはリモートが拒否）。

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, info};

use crate::domain::{StorageKind, StorageRecord, StoreError};
use crate::ports::{ArtifactStore, ContentsApi};

/// リモートリポジトリ内で全アーティファクトを置くディレクトリ
pub const REMOTE_PREFIX: &str = "mindmaps";

pub struct RemoteArtifactStore {
    api: Arc<dyn ContentsApi>,
    branch: String,
}

impl RemoteArtifactStore {
    pub fn new(api: Arc<dyn ContentsApi>, branch: impl Into<String>) -> Self {
        Self {
            api,
            branch: branch.into(),
        }
    }

    pub fn path_for(filename: &str) -> String {
        format!("{REMOTE_PREFIX}/{filename}")
    }

    /// `path` の現在のバージョンハッシュ
    ///
    /// 取得失敗は「前のバージョンなし」として扱う。設定エラーだけはそのまま返す。
    async fn prior_hash(&self, path: &str) -> Result<Option<String>, StoreError> {
        match self.api.get(path, &self.branch).await {
            Ok(existing) => Ok(existing.map(|file| file.sha)),
            Err(err @ StoreError::Config(_)) => Err(err),
            Err(err) => {
                debug!(path, error = %err, "prior version lookup failed; creating");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl ArtifactStore for RemoteArtifactStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Github
    }

    async fn write(&self, filename: &str, content: &str) -> Result<(), StoreError> {
        let path = Self::path_for(filename);
        let prior_hash = self.prior_hash(&path).await?;
        let updating = prior_hash.is_some();

        let record = StorageRecord {
            path,
            content_base64: BASE64.encode(content.as_bytes()),
            branch: self.branch.clone(),
            prior_hash,
        };
        self.api
            .put(&record, &format!("Add mindmap: {filename}"))
            .await?;

        info!(path = %record.path, branch = %record.branch, updating, "artifact committed to remote store");
        Ok(())
    }

    async fn read(&self, filename: &str) -> Result<String, StoreError> {
        let path = Self::path_for(filename);
        let file = self
            .api
            .get(&path, &self.branch)
            .await?
            .ok_or_else(|| StoreError::NotFound(filename.to_string()))?;
        decode_content(&file.content_base64)
    }
}

/// base64 の内容をデコードする（contents API は改行で折り返す）
pub(crate) fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Remote(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Remote(format!("content is not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubSettings;
    use crate::impls::{GitHubContentsApi, InMemoryContentsApi};

    fn store_with(api: Arc<InMemoryContentsApi>) -> RemoteArtifactStore {
        RemoteArtifactStore::new(api, "main")
    }

    #[tokio::test]
    async fn round_trip_is_byte_identical() {
        let api = Arc::new(InMemoryContentsApi::new());
        let store = store_with(api.clone());
        let html = "<!DOCTYPE html>\n<title>思维导图 ✓</title>\r\n\t<body></body>";

        store.write("m-1.html", html).await.unwrap();
        let back = store.read("m-1.html").await.unwrap();

        assert_eq!(back.as_bytes(), html.as_bytes());
        assert_eq!(store.kind(), StorageKind::Github);
    }

    #[tokio::test]
    async fn objects_live_under_fixed_prefix() {
        let api = Arc::new(InMemoryContentsApi::new());
        let store = store_with(api.clone());

        store.write("a.html", "x").await.unwrap();

        assert!(api.sha_of("mindmaps/a.html", "main").await.is_some());
        assert!(api.sha_of("a.html", "main").await.is_none());
    }

    #[tokio::test]
    async fn rewriting_same_path_passes_prior_hash() {
        let api = Arc::new(InMemoryContentsApi::new());
        let store = store_with(api.clone());

        store.write("a.html", "v1").await.unwrap();
        let first_sha = api.sha_of("mindmaps/a.html", "main").await.unwrap();
        store.write("a.html", "v2").await.unwrap();

        assert_eq!(store.read("a.html").await.unwrap(), "v2");
        assert_ne!(api.sha_of("mindmaps/a.html", "main").await.unwrap(), first_sha);
        assert_eq!(api.put_count(), 2);
    }

    #[tokio::test]
    async fn failed_lookup_is_treated_as_create() {
        let api = Arc::new(InMemoryContentsApi::new());
        api.set_fail_reads(true);
        let store = store_with(api.clone());

        store.write("a.html", "x").await.unwrap();
        api.set_fail_reads(false);

        assert_eq!(store.read("a.html").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn put_failure_is_remote_error() {
        let api = Arc::new(InMemoryContentsApi::new());
        api.set_fail_writes(true);
        let store = store_with(api.clone());

        let err = store.write("a.html", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(_)));
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = store_with(Arc::new(InMemoryContentsApi::new()));
        let err = store.read("none.html").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_credentials_is_config_error() {
        let api = GitHubContentsApi::new(&GitHubSettings::default()).unwrap();
        let store = RemoteArtifactStore::new(Arc::new(api), "main");

        let err = store.write("a.html", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn decode_content_ignores_line_wrapping() {
        let encoded = BASE64.encode("hello mindmap".as_bytes());
        let (head, tail) = encoded.split_at(6);
        let wrapped = format!("{head}\n{tail}\n");

        assert_eq!(decode_content(&wrapped).unwrap(), "hello mindmap");
        assert!(matches!(decode_content("@@@"), Err(StoreError::Remote(_))));
    }
}
