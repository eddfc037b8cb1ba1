//! Config - 起動時設定
//!
//! # 設計原則
//! - 環境変数は起動時に 1 回だけ読む（`AppConfig::from_env`）
//! - リクエストハンドラは環境を直接読まない
//! - `from_lookup` に任意の参照関数を渡せるので、テストで環境を汚さない

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_API_KEY: &str = "default-api-key-for-development";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const PRODUCTION_STORAGE_DIR: &str = "/tmp/mindmaps";
const DEVELOPMENT_STORAGE_DIR: &str = "./public/mindmaps";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// 永続リモートストアの裏にある contents API の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMode {
    GitHub,
    /// プロセス内のストア。再起動で消える（開発用）
    Memory,
}

#[derive(Clone)]
pub struct GitHubSettings {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub api_url: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            branch: DEFAULT_BRANCH.to_string(),
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

// token は出力しない
impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub local_dir: PathBuf,
    /// ローカルに加えて永続リモートストアを使う
    pub use_remote: bool,
    pub remote: RemoteMode,
    pub github: GitHubSettings,
    /// リモートで読めたものをローカルにも書き戻す
    pub cache_remote_hits: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from(DEVELOPMENT_STORAGE_DIR),
            use_remote: false,
            remote: RemoteMode::GitHub,
            github: GitHubSettings::default(),
            cache_remote_hits: true,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub bind_addr: SocketAddr,
    /// 取得 URL のベース。未設定ならリクエストヘッダーから決める
    pub public_base_url: Option<String>,
    pub storage: StorageConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("public_base_url", &self.public_base_url)
            .field("storage", &self.storage)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            public_base_url: None,
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// プロセスの環境変数から設定を読む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` 経由で設定を読む。空文字は未設定扱い
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_string());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let public_base_url = get("PUBLIC_BASE_URL").map(|v| v.trim_end_matches('/').to_string());

        let production = get("MINDMAP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));
        let local_dir = match get("MINDMAP_STORAGE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None if production => PathBuf::from(PRODUCTION_STORAGE_DIR),
            None => PathBuf::from(DEVELOPMENT_STORAGE_DIR),
        };

        let use_remote = parse_flag("USE_GITHUB_STORAGE", get("USE_GITHUB_STORAGE"), false)?;
        let cache_remote_hits = parse_flag(
            "MINDMAP_CACHE_REMOTE_HITS",
            get("MINDMAP_CACHE_REMOTE_HITS"),
            true,
        )?;

        let remote = match get("MINDMAP_REMOTE") {
            None => RemoteMode::GitHub,
            Some(v) if v.eq_ignore_ascii_case("github") => RemoteMode::GitHub,
            Some(v) if v.eq_ignore_ascii_case("memory") => RemoteMode::Memory,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "MINDMAP_REMOTE",
                    value: v,
                    reason: "expected `github` or `memory`".to_string(),
                });
            }
        };

        let github = GitHubSettings {
            token: get("GITHUB_TOKEN"),
            owner: get("GITHUB_OWNER"),
            repo: get("GITHUB_REPO"),
            branch: get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        };

        Ok(Self {
            api_key,
            bind_addr,
            public_base_url,
            storage: StorageConfig {
                local_dir,
                use_remote,
                remote,
                github,
                cache_remote_hits,
            },
        })
    }
}

fn parse_flag(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
