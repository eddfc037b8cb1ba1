//! MindmapService - 変換・保存・取得のユースケース
//!
//! HTTP には依存しない。認証と表現の選択はサーバー側で行い、ここには検証済みの
//! `ConvertRequest` と選択済みの `Representation` が渡される。

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info};

use super::gateway::ArtifactGateway;
use super::html::{Template, build_artifact_html};
use super::negotiate::{InlineResponse, Representation, StoredEnvelope};
use super::request::ConvertRequest;
use crate::domain::{Artifact, ArtifactFilename, DEFAULT_TITLE, MindmapError};
use crate::ports::{Clock, Transformer};

#[derive(Clone)]
pub struct MindmapService {
    transformer: Arc<dyn Transformer>,
    gateway: ArtifactGateway,
    clock: Arc<dyn Clock>,
}

impl MindmapService {
    pub fn new(
        transformer: Arc<dyn Transformer>,
        gateway: ArtifactGateway,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transformer,
            gateway,
            clock,
        }
    }

    pub fn gateway(&self) -> &ArtifactGateway {
        &self.gateway
    }

    /// 保存せずに変換する
    pub fn convert_inline(
        &self,
        request: &ConvertRequest,
        representation: Representation,
    ) -> Result<InlineResponse, MindmapError> {
        let filename = ArtifactFilename::resolve(request.filename.as_deref());
        let artifact = self.render(request, filename, Template::Standalone)?;
        Ok(InlineResponse::negotiate(artifact, representation))
    }

    /// 変換してタイムスタンプ付きの名前で保存し、取得 URL を返す
    pub async fn convert_and_store(
        &self,
        request: &ConvertRequest,
        base_url: &str,
    ) -> Result<StoredEnvelope, MindmapError> {
        let filename = ArtifactFilename::resolve(request.filename.as_deref())
            .with_timestamp(self.clock.now_millis());
        let artifact = self.render(request, filename, Template::Standalone)?;

        let storage = self
            .gateway
            .persist(artifact.filename.as_str(), &artifact.html)
            .await?;
        let url = retrieval_url(base_url, artifact.filename.as_str())?;
        info!(filename = %artifact.filename, storage = %storage, "mindmap stored");

        Ok(StoredEnvelope::new(artifact.filename.into_string(), url, storage))
    }

    /// ツールバー付きページに変換する
    pub fn render_toolbar(&self, request: &ConvertRequest) -> Result<Artifact, MindmapError> {
        let filename = ArtifactFilename::resolve(request.filename.as_deref());
        self.render(request, filename, Template::Toolbar)
    }

    pub async fn fetch(&self, filename: &str) -> Result<String, MindmapError> {
        self.gateway.fetch(filename).await
    }

    fn render(
        &self,
        request: &ConvertRequest,
        filename: ArtifactFilename,
        template: Template,
    ) -> Result<Artifact, MindmapError> {
        let result = self.transformer.transform(&request.markdown)?;
        debug!(
            nodes = result.root.node_count(),
            depth = result.root.max_depth(),
            "markdown transformed"
        );
        let title = request.title.as_deref().unwrap_or(DEFAULT_TITLE);
        let html = build_artifact_html(&result.root, result.features, title, &filename, template)?;
        Ok(Artifact::new(title, filename, html))
    }
}

/// `<base>/artifact/<filename>` を組み立てる（`filename` は 1 セグメントとしてエンコード）
pub fn retrieval_url(base: &str, filename: &str) -> Result<String, MindmapError> {
    let mut url = Url::parse(base)
        .map_err(|e| MindmapError::Internal(format!("invalid base url {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| MindmapError::Internal(format!("base url {base:?} cannot carry a path")))?
        .pop_if_empty()
        .push("artifact")
        .push(filename);
    Ok(url.to_string())
}
