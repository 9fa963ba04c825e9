use crate::ast::{BLANK_LINE, Block, BlockKind, Inline, InlineKind};
use crate::directory::UserDirectory;
use crate::entities::decode_entities;
use crate::inline::format_decoded;
use crate::span::Span;
use tracing::debug;

const FENCE: &str = "```";

/// Formats a whole message into paragraphs, quote lines and code blocks.
///
/// Entities are decoded once up front. A fenced code block needs both its
/// opening and closing fence; an unmatched fence is ordinary text. Every
/// other physical line becomes a quote (leading `>`), a blank-line
/// placeholder, or a paragraph. Spans index into the decoded text.
pub fn format_message(text: &str, users: Option<&UserDirectory>) -> Vec<Block> {
    let decoded = decode_entities(text);
    let decoded = decoded.as_ref();

    let mut blocks = Vec::new();
    let mut region_start = 0usize;
    let mut after_fence = false;
    for fence in find_code_blocks(decoded) {
        push_region(&mut blocks, decoded, region_start, fence.span.start, after_fence, true, users);
        blocks.push(Block {
            span: fence.span,
            kind: BlockKind::CodeBlock {
                text: decoded[fence.content.start..fence.content.end].to_string(),
            },
        });
        region_start = fence.span.end;
        after_fence = true;
    }
    push_region(&mut blocks, decoded, region_start, decoded.len(), after_fence, false, users);

    debug!(
        blocks = blocks.len(),
        bytes = decoded.len(),
        "formatted message"
    );
    blocks
}

struct CodeFence {
    span: Span,
    content: Span,
}

// Pairs fences left to right; the closing fence is the nearest one after the opener.
fn find_code_blocks(decoded: &str) -> Vec<CodeFence> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(open) = decoded[pos..].find(FENCE).map(|idx| pos + idx) {
        let content_start = open + FENCE.len();
        let Some(close) = decoded[content_start..]
            .find(FENCE)
            .map(|idx| content_start + idx)
        else {
            break;
        };
        let end = close + FENCE.len();
        out.push(CodeFence {
            span: Span { start: open, end },
            content: Span {
                start: content_start,
                end: close,
            },
        });
        pos = end;
    }
    out
}

fn push_region(
    blocks: &mut Vec<Block>,
    decoded: &str,
    mut start: usize,
    end: usize,
    after_fence: bool,
    before_fence: bool,
    users: Option<&UserDirectory>,
) {
    if start >= end {
        return;
    }
    // A fence ends its own line: the newline after it is not an empty line.
    if after_fence && decoded[start..end].starts_with('\n') {
        start += 1;
    }

    let mut lines: Vec<&str> = decoded[start..end].split('\n').collect();
    // A fence that opens its own line leaves nothing after the last newline.
    if before_fence && lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut line_start = start;
    for line in lines {
        let line_end = line_start + line.len();
        let content = line.strip_suffix('\r').unwrap_or(line);
        blocks.push(format_line(content, line_start, users));
        line_start = line_end + 1;
    }
}

fn format_line(line: &str, base: usize, users: Option<&UserDirectory>) -> Block {
    let span = Span {
        start: base,
        end: base + line.len(),
    };

    if let Some(marker_len) = quote_marker_len(line) {
        let rest = &line[marker_len..];
        let body = rest.trim_start();
        let offset = base + marker_len + (rest.len() - body.len());
        return Block {
            span,
            kind: BlockKind::Quote {
                content: format_decoded(body, offset, users),
            },
        };
    }

    if line.is_empty() {
        return Block {
            span,
            kind: BlockKind::Paragraph {
                content: vec![Inline {
                    span,
                    kind: InlineKind::Text(BLANK_LINE.to_string()),
                }],
            },
        };
    }

    Block {
        span,
        kind: BlockKind::Paragraph {
            content: format_decoded(line, base, users),
        },
    }
}

/// Length of the leading quote marker, accepting the still-escaped form too.
fn quote_marker_len(line: &str) -> Option<usize> {
    if line.starts_with('>') {
        Some(1)
    } else if line.starts_with("&gt;") {
        Some("&gt;".len())
    } else {
        None
    }
}
