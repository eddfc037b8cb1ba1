//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（ファイルシステム、GitHub Contents API、Markdown 変換ライブラリ、時計）
//! へのインターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ローカルストアは揮発性キャッシュ（再起動で消えてよい）
//! - リモートストアが永続化の保証（有効な場合）
//! - 時刻は Clock 経由で取得し、テストでは FixedClock に差し替える

pub mod artifact_store;
pub mod clock;
pub mod contents_api;
pub mod transformer;

// 主要な trait を再エクスポート
pub use self::artifact_store::ArtifactStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::contents_api::ContentsApi;
pub use self::transformer::Transformer;
