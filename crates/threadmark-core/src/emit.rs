use crate::ast::{Block, BlockKind, Inline, InlineKind};
use ammonia::Builder;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HtmlEmitOptions {
    /// Prepended to a mention's display name.
    pub mention_prefix: String,
    /// Adds `target="_blank"` and `rel="noopener noreferrer"` to links.
    pub open_links_in_new_tab: bool,
}

impl Default for HtmlEmitOptions {
    fn default() -> Self {
        Self {
            mention_prefix: "@".to_string(),
            open_links_in_new_tab: true,
        }
    }
}

/// Emits raw, un-sanitized HTML from a slice of blocks.
pub fn emit_html(blocks: &[Block]) -> String {
    emit_html_with_options(blocks, &HtmlEmitOptions::default())
}

pub fn emit_html_with_options(blocks: &[Block], options: &HtmlEmitOptions) -> String {
    // Deterministic formatting: one block per line, LF newlines.
    let mut writer = HtmlWriter::new(options);
    for block in blocks {
        writer.block(block);
    }
    writer.finish()
}

/// Emits HTML from a slice of blocks and sanitizes it according to a safe allow-list.
pub fn emit_html_sanitized(blocks: &[Block]) -> String {
    emit_html_sanitized_with_options(blocks, &HtmlEmitOptions::default())
}

pub fn emit_html_sanitized_with_options(blocks: &[Block], options: &HtmlEmitOptions) -> String {
    let raw_html = emit_html_with_options(blocks, options);

    let tags: HashSet<&'static str> = [
        "a",
        "blockquote",
        "code",
        "del",
        "em",
        "p",
        "pre",
        "span",
        "strong",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");

    // `rel` is managed by ammonia itself and must stay off this list.
    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "target"].iter().copied().collect());

    let url_schemes: HashSet<&'static str> = ["http", "https", "mailto"].iter().copied().collect();

    let mut builder = Builder::new();
    builder
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .url_schemes(url_schemes);
    if !options.open_links_in_new_tab {
        builder.link_rel(None);
    }
    builder.clean(&raw_html).to_string()
}

struct HtmlWriter<'a> {
    out: String,
    options: &'a HtmlEmitOptions,
}

impl<'a> HtmlWriter<'a> {
    fn new(options: &'a HtmlEmitOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn block(&mut self, block: &Block) {
        match &block.kind {
            BlockKind::Paragraph { .. } if block.is_blank_line() => {
                self.line("<p>&nbsp;</p>");
            }
            BlockKind::Paragraph { content } => {
                let html = format!("<p>{}</p>", self.inlines(content));
                self.line(&html);
            }
            BlockKind::Quote { content } => {
                let html = format!(
                    "<blockquote class=\"slack-quote\">{}</blockquote>",
                    self.inlines(content)
                );
                self.line(&html);
            }
            BlockKind::CodeBlock { text } => {
                let html = format!(
                    "<pre class=\"slack-code-block\"><code>{}</code></pre>",
                    escape_html(text)
                );
                self.line(&html);
            }
        }
    }

    fn inlines(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            match &inline.kind {
                InlineKind::Text(text) => out.push_str(&escape_html(text)),
                InlineKind::Mention { display_name, .. } => {
                    out.push_str("<span class=\"slack-mention\">");
                    out.push_str(&escape_html(&self.options.mention_prefix));
                    out.push_str(&escape_html(display_name));
                    out.push_str("</span>");
                }
                InlineKind::Link { url, text, .. } => {
                    out.push_str("<a href=\"");
                    out.push_str(&escape_url_attr(url));
                    out.push('"');
                    if self.options.open_links_in_new_tab {
                        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                    }
                    out.push_str(" class=\"slack-link\">");
                    out.push_str(&escape_html(text));
                    out.push_str("</a>");
                }
                InlineKind::Bold(text) => wrap(&mut out, "strong", text),
                InlineKind::Italic(text) => wrap(&mut out, "em", text),
                InlineKind::Strike(text) => wrap(&mut out, "del", text),
                InlineKind::Code(text) => wrap(&mut out, "code", text),
            }
        }
        out
    }

    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

fn wrap(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_html(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_html(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_url_attr(text: &str) -> String {
    let mut encoded = String::new();
    for &byte in text.as_bytes() {
        match byte {
            b' ' => encoded.push_str("%20"),
            b'\\' => encoded.push_str("%5C"),
            0x00..=0x1F | 0x7F => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
            0x80..=0xFF => encoded.push_str(&format!("%{:02X}", byte)),
            _ => encoded.push(byte as char),
        }
    }
    escape_attr(&encoded)
}
