//! GitHubContentsApi - GitHub REST Contents API クライアント
//!
//! # 実装
//! - GET  `/repos/{owner}/{repo}/contents/{path}?ref={branch}`
//! - PUT  `/repos/{owner}/{repo}/contents/{path}`（`{message, content, branch, sha?}`）
//!
//! 認証情報が欠けている場合は呼び出し時に `StoreError::Config` を返す。
//! ネットワーク呼び出しはリトライしない。

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GitHubSettings;
use crate::domain::{RemoteFile, StorageRecord, StoreError};
use crate::ports::ContentsApi;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("mindmap-core/", env!("CARGO_PKG_VERSION"));

pub struct GitHubContentsApi {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
}

/// 1 回の呼び出しで使う認証情報
struct Target<'a> {
    token: &'a str,
    owner: &'a str,
    repo: &'a str,
}

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl GitHubContentsApi {
    pub fn new(settings: &GitHubSettings) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::Remote(format!("failed to build http client: {e}")))?;
        let api_url = Url::parse(&settings.api_url).map_err(|e| {
            StoreError::Config(format!("invalid GitHub API url {:?}: {e}", settings.api_url))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "GitHub API url {:?} cannot carry a path",
                settings.api_url
            )));
        }

        Ok(Self {
            client,
            api_url,
            token: settings.token.clone(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
        })
    }

    fn target(&self) -> Result<Target<'_>, StoreError> {
        match (
            self.token.as_deref(),
            self.owner.as_deref(),
            self.repo.as_deref(),
        ) {
            (Some(token), Some(owner), Some(repo)) => Ok(Target { token, owner, repo }),
            _ => Err(StoreError::Config(
                "GITHUB_TOKEN, GITHUB_OWNER and GITHUB_REPO must all be set".to_string(),
            )),
        }
    }

    /// `path` の各セグメントは個別にパーセントエンコードする
    fn contents_url(&self, target: &Target<'_>, path: &str) -> Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("GitHub API url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["repos", target.owner, target.repo, "contents"])
            .extend(path.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ContentsApi for GitHubContentsApi {
    async fn get(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, StoreError> {
        let target = self.target()?;
        let url = self.contents_url(&target, path)?;

        let response = self
            .client
            .get(url)
            .query(&[("ref", branch)])
            .bearer_auth(target.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, branch, "remote object absent");
            return Ok(None);
        }
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Remote(format!("GET {path}: unreadable body: {e}")))?;
        if !status.is_success() {
            return Err(StoreError::Remote(format!("GET {path} returned {status}: {body}")));
        }

        parse_contents(&body).map(Some)
    }

    async fn put(&self, record: &StorageRecord, message: &str) -> Result<(), StoreError> {
        let target = self.target()?;
        let url = self.contents_url(&target, &record.path)?;
        let body = put_body(record, message);

        let response = self
            .client
            .put(url)
            .bearer_auth(target.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("PUT {} failed: {e}", record.path)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Remote(format!(
                "PUT {} returned {status}: {text}",
                record.path
            )));
        }
        Ok(())
    }
}

fn put_body<'a>(record: &'a StorageRecord, message: &'a str) -> PutContentsBody<'a> {
    PutContentsBody {
        message,
        content: &record.content_base64,
        branch: &record.branch,
        sha: record.prior_hash.as_deref(),
    }
}

/// contents GET のレスポンスを解釈する
///
/// ディレクトリは配列で、大きなファイルは content なしで返る。どちらもアーティファクトとしては扱えない。
fn parse_contents(body: &str) -> Result<RemoteFile, StoreError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| StoreError::Remote(format!("invalid contents response: {e}")))?;
    if value.is_array() {
        return Err(StoreError::Remote("path is a directory".to_string()));
    }

    let parsed: ContentsResponse = serde_json::from_value(value)
        .map_err(|e| StoreError::Remote(format!("unexpected contents response: {e}")))?;
    match (parsed.content, parsed.encoding.as_deref()) {
        (Some(content), Some("base64") | None) => Ok(RemoteFile {
            sha: parsed.sha,
            content_base64: content,
        }),
        (_, encoding) => Err(StoreError::Remote(format!(
            "content not inlined (encoding {encoding:?})"
        ))),
    }
}
