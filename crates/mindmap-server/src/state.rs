//! 共有状態
//!
//! `App` は起動時に 1 回だけ構築され、以降は読み取り専用で全リクエストに共有される。

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::HOST;
use mindmap_core::App;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    /// 取得 URL のベース。設定された公開 URL、なければリクエストのスキームとホスト
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.app.public_base_url {
            return base.clone();
        }

        let proto = header_str(headers, "x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        format!("{proto}://{host}")
    }
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use mindmap_core::{AppBuilder, AppConfig};

    fn state(public_base_url: Option<&str>) -> AppState {
        let mut config = AppConfig::default();
        config.public_base_url = public_base_url.map(str::to_string);
        AppState::new(AppBuilder::from_config(config).build().unwrap())
    }

    #[test]
    fn configured_base_url_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("internal:3000"));

        let base = state(Some("https://maps.example.com")).base_url(&headers);
        assert_eq!(base, "https://maps.example.com");
    }

    #[test]
    fn base_url_is_derived_from_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("maps.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        assert_eq!(state(None).base_url(&headers), "https://maps.example.com");
    }

    #[test]
    fn base_url_defaults_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:3000"));

        assert_eq!(state(None).base_url(&headers), "http://localhost:3000");
    }
}
