//! ContentsApi port - バージョン管理されたリモートリポジトリの Contents API
//!
//! # 実装
//! - **GitHubContentsApi**: GitHub REST API（本番用）
//! - **InMemoryContentsApi**: プロセス内（テスト・ローカル開発用）

use async_trait::async_trait;

use crate::domain::{RemoteFile, StorageRecord, StoreError};

/// ContentsApi はパス単位で base64 のファイルを読み書きする
///
/// # 設計原則
/// - `get` で存在しない場合は `Ok(None)`（エラーではない）
/// - `put` は create-or-update を 1 回の呼び出しで行う
/// - `prior_hash` が現在のハッシュと一致しない場合はリモート側が拒否する
/// - バージョン履歴はリモートシステムが所有する
#[async_trait]
pub trait ContentsApi: Send + Sync {
    async fn get(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, StoreError>;

    async fn put(&self, record: &StorageRecord, message: &str) -> Result<(), StoreError>;
}
