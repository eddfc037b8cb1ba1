//! ArtifactStore port - HTML アーティファクトの保存先
//!
//! # 実装
//! - **LocalArtifactStore**: 作業ディレクトリ（揮発性、再起動で消えてよい）
//! - **RemoteArtifactStore**: GitHub リポジトリ（Contents API 経由、永続）

use async_trait::async_trait;

use crate::domain::{StorageKind, StoreError};

/// ArtifactStore はファイル名をキーに HTML を保存・取得する
///
/// # 設計原則
/// - 2 つのバックエンド間でトランザクションは張らない
/// - 書き込み順序・フォールバックは Gateway が決める
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    fn kind(&self) -> StorageKind;

    async fn write(&self, filename: &str, content: &str) -> Result<(), StoreError>;

    async fn read(&self, filename: &str) -> Result<String, StoreError>;
}
