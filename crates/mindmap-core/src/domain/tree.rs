//! MindmapNode - マインドマップの木構造
//!
//! 形はクライアント側レンダラーが受け取るものに合わせる。各ノードは
//! `{type, depth, payload?, content, children?}`。木はリクエストごとに 1 回作り、以後は変更しない。

use serde::{Deserialize, Serialize};

/// ノードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Heading,
    ListItem,
    Paragraph,
    Fence,
    Table,
    Html,
}

/// ノードの付加情報。`lines` はソースの 0 始まり `[start, end)` 行範囲
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePayload {
    pub lines: [usize; 2],
}

/// マインドマップの木のノード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub depth: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<NodePayload>,

    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MindmapNode>,
}

impl MindmapNode {
    pub fn new(kind: NodeKind, depth: usize, content: impl Into<String>) -> Self {
        Self {
            kind,
            depth,
            payload: None,
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MindmapNode>) -> Self {
        self.children = children;
        self
    }

    /// `self` を含む部分木のノード数
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MindmapNode::node_count).sum::<usize>()
    }

    /// 部分木の中で最大の `depth`
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(MindmapNode::max_depth)
            .max()
            .unwrap_or(self.depth)
            .max(self.depth)
    }
}

/// ソースから検出したレンダラーの追加機能
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub linkify: bool,
    pub katex: bool,
}

/// 変換アダプタの出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub root: MindmapNode,
    pub features: Features,
}
