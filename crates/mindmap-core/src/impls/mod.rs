//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **MarkdownTransformer**: pulldown-cmark による Transformer
//! - **LocalArtifactStore**: ローカルディレクトリ（揮発性キャッシュ）
//! - **RemoteArtifactStore**: ContentsApi 上の永続ストア
//! - **GitHubContentsApi**: GitHub REST Contents API（本番用）
//! - **InMemoryContentsApi**: プロセス内 ContentsApi（テスト・開発用）

pub mod markdown_transformer;
pub mod local_store;
pub mod remote_store;
pub mod github_api;
pub mod inmem_contents;

// 主要な型を再エクスポート
pub use self::markdown_transformer::{MarkdownTransformer, MAX_TREE_DEPTH};
pub use self::local_store::LocalArtifactStore;
pub use self::remote_store::{RemoteArtifactStore, REMOTE_PREFIX};
pub use self::github_api::GitHubContentsApi;
pub use self::inmem_contents::InMemoryContentsApi;
