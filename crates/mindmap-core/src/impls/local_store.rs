//! LocalArtifactStore - 作業ディレクトリへの保存
//!
//! 本番（サーバーレス）では `/tmp` 配下になり、呼び出し間で消えることがある。
//! 書き込みは一時ファイル + rename ではないため、並行読み込みが書き込み途中の内容を
//! 見る可能性がある（ベストエフォートのキャッシュなので許容）。

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{StorageKind, StoreError};
use crate::ports::ArtifactStore;

#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 単一の通常ファイル名だけを解決する（区切り文字や `..` を含むものは不可）
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.dir.join(name)),
            _ => None,
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn write(&self, filename: &str, content: &str) -> Result<(), StoreError> {
        let Some(path) = self.resolve(filename) else {
            return Err(StoreError::Io {
                path: self.dir.join(filename),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "filename must be a single path component",
                ),
            });
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = content.len(), "artifact written locally");
        Ok(())
    }

    async fn read(&self, filename: &str) -> Result<String, StoreError> {
        let Some(path) = self.resolve(filename) else {
            return Err(StoreError::NotFound(filename.to_string()));
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "local artifact missing or unreadable");
                Err(StoreError::NotFound(filename.to_string()))
            }
        }
    }
}
