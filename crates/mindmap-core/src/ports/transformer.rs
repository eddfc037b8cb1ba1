//! Transformer port - Markdown → マインドマップ木
//!
//! 変換ライブラリは不透明な関数として扱う: `transform(markdown) -> (tree, features)`。
//! 失敗は MindmapError::Transform（HTTP 400）として返す。

use crate::domain::{MindmapError, TransformResult};

/// Transformer は Markdown を木構造に変換する
///
/// # 設計原則
/// - 純粋関数（副作用なし、同じ入力には同じ木）
/// - `Send + Sync`（リクエスト間で共有する）
pub trait Transformer: Send + Sync {
    fn transform(&self, markdown: &str) -> Result<TransformResult, MindmapError>;
}
