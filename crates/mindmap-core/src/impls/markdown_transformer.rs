//! MarkdownTransformer - pulldown-cmark による Transformer 実装
//!
//! # 木の組み立て
//! - 仮想ルート（depth 0）の下に見出しを階層化する（直前のより浅い見出しの子になる）
//! - リスト項目は外側の項目、なければ現在の見出しの子になる
//! - 項目の 2 つ目以降の段落は `paragraph` ノードになる
//! - コードブロック・テーブル・HTML ブロックはブロックごと 1 ノードにする
//! - ルートに子が 1 つだけで内容が空なら、その子をルートに昇格する

use std::ops::Range;

use pulldown_cmark::{html, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::domain::{Features, MindmapError, MindmapNode, NodeKind, NodePayload, TransformResult};
use crate::ports::Transformer;

/// 受け付ける最大のノード深さ。超えると入力を拒否する
pub const MAX_TREE_DEPTH: usize = 64;

const ROOT: usize = 0;

#[derive(Debug, Clone, Copy)]
pub struct MarkdownTransformer {
    options: Options,
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_MATH,
        }
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for MarkdownTransformer {
    fn transform(&self, markdown: &str) -> Result<TransformResult, MindmapError> {
        let mut builder = TreeBuilder::new(markdown);
        for (event, range) in Parser::new_ext(markdown, self.options).into_offset_iter() {
            builder.feed(event, range);
        }
        builder.finish()
    }
}

/// バイトオフセット → 0 始まりの行番号
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }
}

struct Slot {
    kind: NodeKind,
    depth: usize,
    lines: Option<[usize; 2]>,
    content: String,
    children: Vec<usize>,
}

struct Capture<'a> {
    node: usize,
    events: Vec<Event<'a>>,
}

struct TreeBuilder<'a> {
    lines: LineIndex,
    slots: Vec<Slot>,
    /// (見出しレベル, スロット)。ルートはレベル 0 で取り除かれない
    headings: Vec<(usize, usize)>,
    items: Vec<usize>,
    inline: Option<Capture<'a>>,
    block: Option<Capture<'a>>,
    features: Features,
    deepest: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(markdown: &str) -> Self {
        Self {
            lines: LineIndex::new(markdown),
            slots: vec![Slot {
                kind: NodeKind::Root,
                depth: 0,
                lines: None,
                content: String::new(),
                children: Vec::new(),
            }],
            headings: vec![(0, ROOT)],
            items: Vec::new(),
            inline: None,
            block: None,
            features: Features::default(),
            deepest: 0,
        }
    }

    fn feed(&mut self, event: Event<'a>, range: Range<usize>) {
        if let Some(block) = self.block.as_mut() {
            let closes = matches!(
                event,
                Event::End(TagEnd::CodeBlock | TagEnd::Table | TagEnd::HtmlBlock)
            );
            block.events.push(event);
            if closes {
                self.finish_block();
            }
            return;
        }

        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_inline();
                let level = level as usize;
                let node = match self.items.last() {
                    Some(&item) => self.push_node(NodeKind::Heading, item, &range),
                    None => {
                        while self.headings.last().is_some_and(|&(l, _)| l >= level) {
                            self.headings.pop();
                        }
                        let parent = self.headings.last().map_or(ROOT, |&(_, slot)| slot);
                        let node = self.push_node(NodeKind::Heading, parent, &range);
                        self.headings.push((level, node));
                        node
                    }
                };
                self.begin_inline(node);
            }
            Event::Start(Tag::Item) => {
                self.flush_inline();
                let parent = self.container();
                let node = self.push_node(NodeKind::ListItem, parent, &range);
                self.items.push(node);
                self.begin_inline(node);
            }
            Event::End(TagEnd::Item) => {
                self.flush_inline();
                self.items.pop();
            }
            Event::Start(Tag::Paragraph) => {
                // the first paragraph of a list item is the item's own text
                if self.inline.is_none() {
                    let parent = self.container();
                    let node = self.push_node(NodeKind::Paragraph, parent, &range);
                    self.begin_inline(node);
                }
            }
            Event::Start(tag @ (Tag::CodeBlock(_) | Tag::Table(_) | Tag::HtmlBlock)) => {
                self.flush_inline();
                let kind = match tag {
                    Tag::CodeBlock(_) => NodeKind::Fence,
                    Tag::Table(_) => NodeKind::Table,
                    _ => NodeKind::Html,
                };
                let parent = self.container();
                let node = self.push_node(kind, parent, &range);
                self.block = Some(Capture {
                    node,
                    events: vec![Event::Start(tag)],
                });
            }
            Event::Start(tag) if is_inline_tag(&tag) => {
                if matches!(
                    tag,
                    Tag::Link {
                        link_type: LinkType::Autolink | LinkType::Email,
                        ..
                    }
                ) {
                    self.features.linkify = true;
                }
                self.push_inline(Event::Start(tag));
            }
            Event::End(tag) if is_inline_tag_end(&tag) => self.push_inline(Event::End(tag)),
            // remaining block boundaries (lists, quotes, footnotes, ...) close the open text
            Event::Start(_) | Event::End(_) => self.flush_inline(),
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                self.features.katex = true;
                self.push_inline(event);
            }
            Event::Rule => {}
            other => self.push_inline(other),
        }
    }

    fn container(&self) -> usize {
        match self.items.last() {
            Some(&item) => item,
            None => self.headings.last().map_or(ROOT, |&(_, slot)| slot),
        }
    }

    fn push_node(&mut self, kind: NodeKind, parent: usize, range: &Range<usize>) -> usize {
        let depth = self.slots[parent].depth + 1;
        self.deepest = self.deepest.max(depth);
        let lines = [self.lines.line_of(range.start), self.lines.line_of(range.end)];
        let node = self.slots.len();
        self.slots.push(Slot {
            kind,
            depth,
            lines: Some(lines),
            content: String::new(),
            children: Vec::new(),
        });
        self.slots[parent].children.push(node);
        node
    }

    fn begin_inline(&mut self, node: usize) {
        self.inline = Some(Capture {
            node,
            events: Vec::new(),
        });
    }

    fn push_inline(&mut self, event: Event<'a>) {
        if let Some(capture) = self.inline.as_mut() {
            capture.events.push(event);
        }
    }

    fn flush_inline(&mut self) {
        if let Some(capture) = self.inline.take() {
            self.slots[capture.node].content = render(capture.events);
        }
    }

    fn finish_block(&mut self) {
        if let Some(capture) = self.block.take() {
            self.slots[capture.node].content = render(capture.events);
        }
    }

    fn finish(mut self) -> Result<TransformResult, MindmapError> {
        self.flush_inline();
        self.finish_block();

        if self.deepest > MAX_TREE_DEPTH {
            return Err(MindmapError::Transform(format!(
                "document nests {} levels deep; at most {MAX_TREE_DEPTH} are supported",
                self.deepest
            )));
        }

        let mut root = assemble(&mut self.slots, ROOT);
        if root.content.is_empty() && root.children.len() == 1 {
            root = root.children.remove(0);
        }

        Ok(TransformResult {
            root,
            features: self.features,
        })
    }
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_tag_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

fn render(events: Vec<Event<'_>>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out.trim_end().to_string()
}

fn assemble(slots: &mut [Slot], index: usize) -> MindmapNode {
    let children: Vec<usize> = std::mem::take(&mut slots[index].children);
    let children = children
        .into_iter()
        .map(|child| assemble(slots, child))
        .collect();
    let slot = &mut slots[index];
    MindmapNode {
        kind: slot.kind,
        depth: slot.depth,
        payload: slot.lines.map(|lines| NodePayload { lines }),
        content: std::mem::take(&mut slot.content),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(markdown: &str) -> TransformResult {
        MarkdownTransformer::new().transform(markdown).unwrap()
    }

    fn contents(node: &MindmapNode) -> Vec<&str> {
        node.children.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn headings_and_lists_nest_under_nearest_heading() {
        let result = transform("# A\n## B\n- c\n- d\n## E\n");
        let root = &result.root;

        // single top-level heading is hoisted to the root
        assert_eq!(root.kind, NodeKind::Heading);
        assert_eq!(root.content, "A");
        assert_eq!(root.depth, 1);
        assert_eq!(contents(root), vec!["B", "E"]);

        let b = &root.children[0];
        assert_eq!(b.depth, 2);
        assert_eq!(contents(b), vec!["c", "d"]);
        assert!(b.children.iter().all(|c| c.kind == NodeKind::ListItem && c.depth == 3));
    }

    #[test]
    fn several_top_level_headings_keep_virtual_root() {
        let result = transform("# One\n# Two\n");
        assert_eq!(result.root.kind, NodeKind::Root);
        assert_eq!(result.root.content, "");
        assert_eq!(contents(&result.root), vec!["One", "Two"]);
    }

    #[test]
    fn nested_lists_follow_indentation() {
        let result = transform("# T\n- a\n  - b\n    - c\n- d\n");
        let root = &result.root;
        assert_eq!(contents(root), vec!["a", "d"]);
        assert_eq!(contents(&root.children[0]), vec!["b"]);
        assert_eq!(contents(&root.children[0].children[0]), vec!["c"]);
    }

    #[test]
    fn inline_markup_is_rendered_to_html() {
        let result = transform("# **Bold** and `code`\n");
        assert_eq!(result.root.content, "<strong>Bold</strong> and <code>code</code>");
    }

    #[test]
    fn paragraphs_and_code_blocks_become_nodes() {
        let result = transform("# T\n\nSome text.\n\n```rust\nfn main() {}\n```\n");
        let root = &result.root;
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].kind, NodeKind::Paragraph);
        assert_eq!(root.children[0].content, "Some text.");
        assert_eq!(root.children[1].kind, NodeKind::Fence);
        assert!(root.children[1].content.starts_with("<pre><code"));
        assert!(root.children[1].content.contains("fn main() {}"));
    }

    #[test]
    fn second_paragraph_of_loose_item_is_a_child() {
        let result = transform("# T\n- first\n\n  second\n\n- other\n");
        let item = &result.root.children[0];
        assert_eq!(item.content, "first");
        assert_eq!(item.children.len(), 1);
        assert_eq!(item.children[0].kind, NodeKind::Paragraph);
        assert_eq!(item.children[0].content, "second");
    }

    #[test]
    fn payload_records_source_lines() {
        let result = transform("# One\n\n# Two\n");
        let two = &result.root.children[1];
        assert_eq!(two.payload.as_ref().unwrap().lines[0], 2);
        assert!(result.root.payload.is_none());
    }

    #[test]
    fn math_and_autolinks_set_features() {
        let plain = transform("# T\n- a\n");
        assert_eq!(plain.features, Features::default());

        let math = transform("# T\n- $x^2$\n");
        assert!(math.features.katex);
        assert!(!math.features.linkify);

        let link = transform("# T\n- <https://example.com>\n");
        assert!(link.features.linkify);
    }

    #[test]
    fn empty_input_yields_empty_root() {
        let result = transform("");
        assert_eq!(result.root.kind, NodeKind::Root);
        assert!(result.root.children.is_empty());
    }

    #[test]
    fn overly_deep_nesting_is_rejected() {
        let markdown: String = (0..MAX_TREE_DEPTH + 6)
            .map(|level| format!("{}- item{level}\n", "  ".repeat(level)))
            .collect();

        let err = MarkdownTransformer::new().transform(&markdown).unwrap_err();
        assert!(matches!(err, MindmapError::Transform(_)));
    }
}
