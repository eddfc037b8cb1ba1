//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 設計原則
//! - 設定は `AppConfig` として 1 回だけ受け取る
//! - ストレージ構成（Ephemeral / Durable）は build() 時に 1 回だけ決める
//! - 起動時検証（Fail-fast）: 空の API キーやクライアント構築失敗は BuildError

use std::sync::Arc;

use tracing::info;

use super::gateway::{ArtifactGateway, StorageBackend};
use super::service::MindmapService;
use crate::config::{AppConfig, RemoteMode};
use crate::domain::StoreError;
use crate::impls::{
    GitHubContentsApi, InMemoryContentsApi, LocalArtifactStore, MarkdownTransformer,
    RemoteArtifactStore,
};
use crate::ports::{ArtifactStore, Clock, ContentsApi, SystemClock, Transformer};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let config = AppConfig::from_env()?;
/// let app = AppBuilder::from_config(config).build()?;
/// ```
///
/// テストでは `with_clock` / `with_transformer` / `with_contents_api` で差し替える。
pub struct AppBuilder {
    config: AppConfig,
    clock: Option<Arc<dyn Clock>>,
    transformer: Option<Arc<dyn Transformer>>,
    contents_api: Option<Arc<dyn ContentsApi>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("API key must not be empty")]
    EmptyApiKey,

    #[error("failed to initialise remote store: {0}")]
    RemoteStore(#[source] StoreError),
}

impl AppBuilder {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            clock: None,
            transformer: None,
            contents_api: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// 設定の代わりに `api` をリモートストアの裏に使う
    ///
    /// リモートストアが有効なときだけ効く。
    pub fn with_contents_api(mut self, api: Arc<dyn ContentsApi>) -> Self {
        self.contents_api = Some(api);
        self
    }

    /// AppBuilder を構築して App を生成
    pub fn build(self) -> Result<App, BuildError> {
        if self.config.api_key.trim().is_empty() {
            return Err(BuildError::EmptyApiKey);
        }

        let storage = &self.config.storage;
        let local: Arc<dyn ArtifactStore> =
            Arc::new(LocalArtifactStore::new(storage.local_dir.clone()));

        let backend = if storage.use_remote {
            let api: Arc<dyn ContentsApi> = match (self.contents_api, storage.remote) {
                (Some(api), _) => api,
                (None, RemoteMode::GitHub) => Arc::new(
                    GitHubContentsApi::new(&storage.github).map_err(BuildError::RemoteStore)?,
                ),
                (None, RemoteMode::Memory) => Arc::new(InMemoryContentsApi::new()),
            };
            let remote: Arc<dyn ArtifactStore> =
                Arc::new(RemoteArtifactStore::new(api, storage.github.branch.clone()));
            StorageBackend::Durable { local, remote }
        } else {
            StorageBackend::Ephemeral { local }
        };

        info!(
            local_dir = %storage.local_dir.display(),
            durable = storage.use_remote,
            cache_remote_hits = storage.cache_remote_hits,
            "storage configured"
        );

        let gateway =
            ArtifactGateway::new(backend).with_cache_remote_hits(storage.cache_remote_hits);
        let transformer = self
            .transformer
            .unwrap_or_else(|| Arc::new(MarkdownTransformer::default()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(App {
            service: MindmapService::new(transformer, gateway, clock),
            api_key: self.config.api_key,
            public_base_url: self.config.public_base_url,
        })
    }
}

/// App はアプリケーションのランタイム
///
/// 構築後は不変。サーバーは `Arc<App>` として全リクエストで共有する。
pub struct App {
    pub service: MindmapService,
    pub api_key: String,
    pub public_base_url: Option<String>,
}

impl App {
    /// 設定済みのキーと完全一致で比較
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        presented == Some(self.api_key.as_str())
    }
}
