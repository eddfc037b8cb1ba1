//! Retrieval Gateway - 二重書き込みとリモート優先の読み込み
//!
//! # 書き込み
//! ローカル → リモートの順に逐次書き込む。トランザクションではない。
//! どちらかが成功すればリクエストは成功。失敗はログに残して吸収する。
//!
//! # 読み込み
//! 1. `../` / `..\` を含む名前はどのバックエンドにも触れずに拒否
//! 2. リモート（有効時）→ ヒットしたらローカルへベストエフォートで書き戻し
//! 3. リモート失敗・不在ならローカル
//! 4. どこにもなければ NotFound

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{MindmapError, StorageKind};
use crate::ports::ArtifactStore;

/// ストレージ構成。起動時に 1 回だけ決める
#[derive(Clone)]
pub enum StorageBackend {
    /// ローカルのみ。呼び出し間でアーティファクトが消えてもよい
    Ephemeral { local: Arc<dyn ArtifactStore> },
    /// 永続リモートストアの前にローカルキャッシュを置く
    Durable {
        local: Arc<dyn ArtifactStore>,
        remote: Arc<dyn ArtifactStore>,
    },
}

impl StorageBackend {
    pub fn local(&self) -> &Arc<dyn ArtifactStore> {
        match self {
            StorageBackend::Ephemeral { local } | StorageBackend::Durable { local, .. } => local,
        }
    }

    pub fn remote(&self) -> Option<&Arc<dyn ArtifactStore>> {
        match self {
            StorageBackend::Ephemeral { .. } => None,
            StorageBackend::Durable { remote, .. } => Some(remote),
        }
    }
}

#[derive(Clone)]
pub struct ArtifactGateway {
    backend: StorageBackend,
    cache_remote_hits: bool,
}

impl ArtifactGateway {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            cache_remote_hits: true,
        }
    }

    /// リモートで読めたアーティファクトをローカルにも書き戻すか
    pub fn with_cache_remote_hits(mut self, enabled: bool) -> Self {
        self.cache_remote_hits = enabled;
        self
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    /// 有効なすべてのバックエンドに書き込み、受け付けた中で最も永続的なものを返す
    pub async fn persist(&self, filename: &str, html: &str) -> Result<StorageKind, MindmapError> {
        let local_ok = match self.backend.local().write(filename, html).await {
            Ok(()) => true,
            Err(err) => {
                warn!(filename, error = %err, "local write failed");
                false
            }
        };

        let remote_ok = match self.backend.remote() {
            Some(remote) => match remote.write(filename, html).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(filename, error = %err, "remote write failed");
                    false
                }
            },
            None => false,
        };

        match (remote_ok, local_ok) {
            (true, _) => Ok(StorageKind::Github),
            (false, true) => Ok(StorageKind::Local),
            (false, false) => Err(MindmapError::Internal(format!(
                "failed to store {filename} in any backend"
            ))),
        }
    }

    /// リモートを優先してアーティファクトを読む
    pub async fn fetch(&self, filename: &str) -> Result<String, MindmapError> {
        if is_traversal(filename) {
            return Err(MindmapError::Validation("invalid filename".to_string()));
        }

        if let Some(remote) = self.backend.remote() {
            match remote.read(filename).await {
                Ok(html) => {
                    if self.cache_remote_hits {
                        self.cache_locally(filename, &html).await;
                    }
                    return Ok(html);
                }
                Err(err) => {
                    debug!(filename, error = %err, "remote read missed; trying local store");
                }
            }
        }

        self.backend
            .local()
            .read(filename)
            .await
            .map_err(|_| MindmapError::NotFound(filename.to_string()))
    }

    async fn cache_locally(&self, filename: &str, html: &str) {
        if let Err(err) = self.backend.local().write(filename, html).await {
            warn!(filename, error = %err, "failed to cache remote artifact locally");
        }
    }
}

fn is_traversal(filename: &str) -> bool {
    filename.contains("../") || filename.contains("..\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryContentsApi, LocalArtifactStore, RemoteArtifactStore};
    use rstest::rstest;

    struct Fixture {
        _tmp: tempfile::TempDir,
        api: Arc<InMemoryContentsApi>,
        local: Arc<LocalArtifactStore>,
        remote: Arc<RemoteArtifactStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let api = Arc::new(InMemoryContentsApi::new());
            let local = Arc::new(LocalArtifactStore::new(tmp.path().join("mindmaps")));
            let remote = Arc::new(RemoteArtifactStore::new(api.clone(), "main"));
            Self {
                _tmp: tmp,
                api,
                local,
                remote,
            }
        }

        fn durable(&self) -> ArtifactGateway {
            ArtifactGateway::new(StorageBackend::Durable {
                local: self.local.clone(),
                remote: self.remote.clone(),
            })
        }

        fn ephemeral(&self) -> ArtifactGateway {
            ArtifactGateway::new(StorageBackend::Ephemeral {
                local: self.local.clone(),
            })
        }
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../b.html")]
    #[case("..\\windows\\win.ini")]
    #[tokio::test]
    async fn traversal_is_rejected_before_backends(#[case] filename: &str) {
        let fx = Fixture::new();
        let err = fx.durable().fetch(filename).await.unwrap_err();

        assert!(matches!(err, MindmapError::Validation(_)));
        assert_eq!(fx.api.get_count(), 0);
    }

    #[tokio::test]
    async fn persist_writes_both_backends() {
        let fx = Fixture::new();
        let kind = fx.durable().persist("a.html", "<html/>").await.unwrap();

        assert_eq!(kind, StorageKind::Github);
        assert_eq!(fx.local.read("a.html").await.unwrap(), "<html/>");
        assert_eq!(fx.remote.read("a.html").await.unwrap(), "<html/>");
    }

    #[tokio::test]
    async fn remote_write_failure_still_succeeds_locally() {
        let fx = Fixture::new();
        fx.api.set_fail_writes(true);

        let kind = fx.durable().persist("a.html", "<html/>").await.unwrap();

        assert_eq!(kind, StorageKind::Local);
        assert_eq!(fx.local.read("a.html").await.unwrap(), "<html/>");
    }

    #[tokio::test]
    async fn local_write_failure_still_succeeds_remotely() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let api = Arc::new(InMemoryContentsApi::new());
        let gateway = ArtifactGateway::new(StorageBackend::Durable {
            local: Arc::new(LocalArtifactStore::new(&blocker)),
            remote: Arc::new(RemoteArtifactStore::new(api, "main")),
        });

        let kind = gateway.persist("a.html", "<html/>").await.unwrap();
        assert_eq!(kind, StorageKind::Github);
    }

    #[tokio::test]
    async fn every_backend_failing_is_internal_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let gateway = ArtifactGateway::new(StorageBackend::Ephemeral {
            local: Arc::new(LocalArtifactStore::new(&blocker)),
        });

        let err = gateway.persist("a.html", "<html/>").await.unwrap_err();
        assert!(matches!(err, MindmapError::Internal(_)));
    }

    #[tokio::test]
    async fn ephemeral_persist_reports_local() {
        let fx = Fixture::new();
        let kind = fx.ephemeral().persist("a.html", "x").await.unwrap();

        assert_eq!(kind, StorageKind::Local);
        assert_eq!(fx.api.put_count(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_local_when_remote_read_fails() {
        let fx = Fixture::new();
        fx.local.write("a.html", "cached").await.unwrap();
        fx.api.set_fail_reads(true);

        let html = fx.durable().fetch("a.html").await.unwrap();
        assert_eq!(html, "cached");
    }

    #[tokio::test]
    async fn remote_hit_is_written_through_to_local() {
        let fx = Fixture::new();
        fx.remote.write("a.html", "durable").await.unwrap();

        let html = fx.durable().fetch("a.html").await.unwrap();

        assert_eq!(html, "durable");
        assert_eq!(fx.local.read("a.html").await.unwrap(), "durable");
    }

    #[tokio::test]
    async fn write_through_can_be_disabled() {
        let fx = Fixture::new();
        fx.remote.write("a.html", "durable").await.unwrap();

        let gateway = fx.durable().with_cache_remote_hits(false);
        gateway.fetch("a.html").await.unwrap();

        assert!(fx.local.read("a.html").await.is_err());
    }

    #[tokio::test]
    async fn miss_everywhere_is_not_found() {
        let fx = Fixture::new();
        let err = fx.durable().fetch("missing.html").await.unwrap_err();
        assert!(matches!(err, MindmapError::NotFound(name) if name == "missing.html"));
    }
}
