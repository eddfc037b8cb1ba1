//! ログ初期化
//!
//! `MINDMAP_LOG`（EnvFilter 構文）でレベルを指定する。未指定なら `info`。

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub const LOG_ENV: &str = "MINDMAP_LOG";

pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    // 二重初期化は無視する
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
