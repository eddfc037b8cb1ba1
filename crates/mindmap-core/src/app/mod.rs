//! App - アプリケーションロジック
//!
//! # 含まれるもの
//! - **html**: HTML Artifact Builder（純粋関数）
//! - **gateway**: 二重書き込みとリモート優先の読み込み
//! - **negotiate**: レスポンス形状の選択
//! - **request**: 変換リクエストの検証
//! - **service**: ユースケース（変換・保存・取得）
//! - **builder**: 設定からのワイヤリング

pub mod html;
pub mod gateway;
pub mod negotiate;
pub mod request;
pub mod service;
pub mod builder;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::gateway::{ArtifactGateway, StorageBackend};
pub use self::html::{Template, build_artifact_html};
pub use self::negotiate::{
    FILENAME_ALIAS_HEADERS, InlineEnvelope, InlineResponse, Persistence, Representation,
    StoredEnvelope,
};
pub use self::request::ConvertRequest;
pub use self::service::{MindmapService, retrieval_url};
