//! mindmap-core
//!
//! Markdown からマインドマップ HTML を生成し、保存・取得するためのコア部品。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（tree, artifact, filename, storage record, errors）
//! - **ports**: 抽象化レイヤー（Transformer, ArtifactStore, ContentsApi, Clock）
//! - **impls**: ports の実装（MarkdownTransformer, LocalArtifactStore, RemoteArtifactStore, GitHubContentsApi など）
//! - **app**: アプリケーションロジック（html, gateway, negotiate, service, builder）
//! - **config**: 環境変数から読み込む不変の設定

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;
pub mod config;

pub use self::app::{App, AppBuilder, BuildError};
pub use self::config::AppConfig;
pub use self::domain::MindmapError;
