//! HTML Artifact Builder
//!
//! ツリー・タイトル・ファイル名から自己完結した HTML を生成する純粋関数。
//! 描画は外部ホストの d3 / markmap-view スクリプトが行う。
//!
//! ファイル名は 3 つの経路で埋め込む（どれも正とはしない）:
//! 1. `<meta name="mindmap-filename">`
//! 2. `<script type="application/json" id="mindmap-metadata">`
//! 3. `window.MINDMAP_FILENAME`
//!
//! `title` は HTML エスケープしない。

use std::fmt::Write as _;

use serde_json::json;

use crate::domain::{ARTIFACT_FORMAT, ArtifactFilename, Features, MindmapError, MindmapNode};

pub const D3_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/d3@7";
pub const MARKMAP_VIEW_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/markmap-view@0.15.3";
pub const MARKMAP_TOOLBAR_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/markmap-toolbar@0.15.3";
pub const MARKMAP_TOOLBAR_CSS: &str =
    "https://cdn.jsdelivr.net/npm/markmap-toolbar@0.15.3/dist/style.css";
pub const KATEX_CSS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css";

/// 描画するマインドマップのページレイアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    /// 全画面のマップ。リサイズ時に再フィットする
    #[default]
    Standalone,
    /// 全画面のマップにツールバー（ズーム・フィット・全画面・スクリーンショット）を付ける
    Toolbar,
}

const STANDALONE_STYLE: &str = r#"  <style>
    body {
      margin: 0;
      padding: 0;
      font-family: sans-serif;
    }
    .markmap-container {
      width: 100%;
      height: 100vh;
      overflow: hidden;
    }
    svg {
      width: 100%;
      height: 100%;
    }
  </style>
"#;

const TOOLBAR_STYLE: &str = r#"  <style>
    * {
      margin: 0;
      padding: 0;
    }
    #markmap {
      display: block;
      width: 100vw;
      height: 100vh;
    }
  </style>
"#;

const STANDALONE_MOUNT: &str = r#"    const mm = Markmap.create(svg, undefined, data);
    window.addEventListener('resize', () => mm.fit());
    setTimeout(() => mm.fit(), 100);
"#;

const TOOLBAR_MOUNT: &str = r#"    const mm = Markmap.create(svg, null, data);
    if (window.markmapToolbar) {
      const { Toolbar } = window.markmapToolbar;
      const toolbar = new Toolbar();
      toolbar.attach(mm);
      toolbar.setItems(['zoomIn', 'zoomOut', 'fit', 'toggleFullscreen', { type: 'separator' }, 'screenshot']);
      const el = toolbar.render();
      el.style.position = 'absolute';
      el.style.bottom = '20px';
      el.style.right = '20px';
      document.body.append(el);
    }
"#;

/// `root` から完全な HTML ドキュメントを組み立てる
pub fn build_artifact_html(
    root: &MindmapNode,
    features: Features,
    title: &str,
    filename: &ArtifactFilename,
    template: Template,
) -> Result<String, MindmapError> {
    let data = to_json(root)?;
    let filename_literal = to_json(filename.as_str())?;
    let metadata = to_json(&json!({
        "filename": filename.as_str(),
        "title": title,
        "format": ARTIFACT_FORMAT,
    }))?;

    let mut html = String::with_capacity(data.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    // 文字列への書き込みは失敗しない
    let _ = writeln!(
        html,
        "  <meta name=\"mindmap-filename\" content=\"{}\">",
        attribute_escape(filename.as_str())
    );
    let _ = writeln!(html, "  <title>{title}</title>");
    match template {
        Template::Standalone => html.push_str(STANDALONE_STYLE),
        Template::Toolbar => {
            html.push_str(TOOLBAR_STYLE);
            let _ = writeln!(html, "  <link rel=\"stylesheet\" href=\"{MARKMAP_TOOLBAR_CSS}\">");
        }
    }
    if features.katex {
        let _ = writeln!(html, "  <link rel=\"stylesheet\" href=\"{KATEX_CSS}\">");
    }
    let _ = writeln!(
        html,
        "  <script type=\"application/json\" id=\"mindmap-metadata\">{metadata}</script>"
    );
    html.push_str("</head>\n<body>\n");

    match template {
        Template::Standalone => {
            html.push_str("  <div class=\"markmap-container\">\n    <svg id=\"markmap\"></svg>\n  </div>\n")
        }
        Template::Toolbar => html.push_str("  <svg id=\"markmap\"></svg>\n"),
    }

    let _ = writeln!(html, "  <script src=\"{D3_SCRIPT}\"></script>");
    let _ = writeln!(html, "  <script src=\"{MARKMAP_VIEW_SCRIPT}\"></script>");
    if template == Template::Toolbar {
        let _ = writeln!(html, "  <script src=\"{MARKMAP_TOOLBAR_SCRIPT}\"></script>");
    }

    html.push_str("  <script>\n");
    let _ = writeln!(html, "  window.MINDMAP_FILENAME = {filename_literal};");
    html.push_str("  (function () {\n");
    html.push_str("    const { Markmap } = window.markmap;\n");
    html.push_str("    const svg = document.getElementById('markmap');\n");
    let _ = writeln!(html, "    const data = {data};");
    html.push_str(match template {
        Template::Standalone => STANDALONE_MOUNT,
        Template::Toolbar => TOOLBAR_MOUNT,
    });
    html.push_str("  })();\n  </script>\n</body>\n</html>\n");

    Ok(html)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, MindmapError> {
    serde_json::to_string(value).map_err(|e| MindmapError::Internal(format!("serialize: {e}")))
}

fn attribute_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeKind;
    use rstest::rstest;

    fn sample_tree() -> MindmapNode {
        MindmapNode::new(NodeKind::Heading, 1, "Plan").with_children(vec![
            MindmapNode::new(NodeKind::ListItem, 2, "<strong>ship</strong> it"),
            MindmapNode::new(NodeKind::ListItem, 2, "quote \" and 中文"),
        ])
    }

    #[rstest]
    #[case(Template::Standalone)]
    #[case(Template::Toolbar)]
    fn tree_json_is_embedded_verbatim(#[case] template: Template) {
        let tree = sample_tree();
        let name = ArtifactFilename::resolve(Some("plan"));

        let html =
            build_artifact_html(&tree, Features::default(), "Plan", &name, template).unwrap();

        let expected = serde_json::to_string(&tree).unwrap();
        assert!(html.contains(&format!("const data = {expected};")));
        assert!(html.contains(D3_SCRIPT));
        assert!(html.contains(MARKMAP_VIEW_SCRIPT));
    }

    #[test]
    fn filename_is_exposed_three_ways() {
        let name = ArtifactFilename::resolve(Some("report-1704110400000"));
        let html = build_artifact_html(
            &sample_tree(),
            Features::default(),
            "Report",
            &name,
            Template::Standalone,
        )
        .unwrap();

        assert!(html.contains(
            r#"<meta name="mindmap-filename" content="report-1704110400000.html">"#
        ));
        assert!(html.contains(
            r#"<script type="application/json" id="mindmap-metadata">{"filename":"report-1704110400000.html","format":"mindmap","title":"Report"}</script>"#
        ));
        assert!(html.contains(r#"window.MINDMAP_FILENAME = "report-1704110400000.html";"#));
    }

    #[test]
    fn title_is_not_escaped() {
        let name = ArtifactFilename::resolve(None);
        let html = build_artifact_html(
            &sample_tree(),
            Features::default(),
            "A & <b>B</b>",
            &name,
            Template::Standalone,
        )
        .unwrap();

        assert!(html.contains("<title>A & <b>B</b></title>"));
    }

    #[test]
    fn katex_stylesheet_follows_feature_flag() {
        let name = ArtifactFilename::resolve(None);
        let tree = sample_tree();
        let plain =
            build_artifact_html(&tree, Features::default(), "t", &name, Template::Standalone)
                .unwrap();
        let math = build_artifact_html(
            &tree,
            Features { katex: true, linkify: false },
            "t",
            &name,
            Template::Standalone,
        )
        .unwrap();

        assert!(!plain.contains(KATEX_CSS));
        assert!(math.contains(KATEX_CSS));
    }

    #[test]
    fn toolbar_template_loads_toolbar_assets() {
        let name = ArtifactFilename::resolve(None);
        let standalone = build_artifact_html(
            &sample_tree(),
            Features::default(),
            "t",
            &name,
            Template::Standalone,
        )
        .unwrap();
        let toolbar =
            build_artifact_html(&sample_tree(), Features::default(), "t", &name, Template::Toolbar)
                .unwrap();

        assert!(!standalone.contains(MARKMAP_TOOLBAR_SCRIPT));
        assert!(toolbar.contains(MARKMAP_TOOLBAR_SCRIPT));
        assert!(toolbar.contains(MARKMAP_TOOLBAR_CSS));
        assert!(toolbar.contains("toolbar.attach(mm)"));
    }
}
