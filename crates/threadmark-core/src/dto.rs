//! Flat, tagged views of formatted output for JSON and JavaScript consumers.

use serde::Serialize;

use crate::ast::{Block, BlockKind, Inline, InlineKind};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub start: usize,
    pub end: usize,
    pub blank: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<SegmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&Inline> for SegmentView {
    fn from(inline: &Inline) -> Self {
        let mut view = SegmentView {
            kind: "text",
            start: inline.span.start,
            end: inline.span.end,
            text: inline.visible_text().to_string(),
            user_id: None,
            url: None,
            plain: None,
        };
        match &inline.kind {
            InlineKind::Text(_) => {}
            InlineKind::Mention { user_id, .. } => {
                view.kind = "mention";
                view.user_id = Some(user_id.clone());
            }
            InlineKind::Link { url, plain, .. } => {
                view.kind = "link";
                view.url = Some(url.clone());
                view.plain = Some(*plain);
            }
            InlineKind::Bold(_) => view.kind = "bold",
            InlineKind::Italic(_) => view.kind = "italic",
            InlineKind::Strike(_) => view.kind = "strike",
            InlineKind::Code(_) => view.kind = "code",
        }
        view
    }
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        let (kind, text) = match &block.kind {
            BlockKind::Paragraph { .. } => ("paragraph", None),
            BlockKind::Quote { .. } => ("quote", None),
            BlockKind::CodeBlock { text } => ("codeBlock", Some(text.clone())),
        };
        BlockView {
            kind,
            start: block.span.start,
            end: block.span.end,
            blank: block.is_blank_line(),
            content: block.inlines().iter().map(SegmentView::from).collect(),
            text,
        }
    }
}

pub fn segment_views(inlines: &[Inline]) -> Vec<SegmentView> {
    inlines.iter().map(SegmentView::from).collect()
}

pub fn block_views(blocks: &[Block]) -> Vec<BlockView> {
    blocks.iter().map(BlockView::from).collect()
}
