use crate::ast::{Inline, InlineKind, InlineSeq};
use crate::directory::UserDirectory;
use crate::entities::decode_entities;
use crate::scanner::{scan_structural, scan_styles};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Formats a single run of message text: entities, mentions, links and
/// style spans. Quote markers and code fences are left as literal text.
///
/// Spans index into the entity-decoded text. Empty input gives an empty
/// sequence; anything else gives at least one segment.
pub fn format_inline(text: &str, users: Option<&UserDirectory>) -> InlineSeq {
    let decoded = decode_entities(text);
    format_decoded(&decoded, 0, users)
}

/// Inline formatting of text that has already been entity-decoded, with spans
/// offset by `base`.
pub(crate) fn format_decoded(decoded: &str, base: usize, users: Option<&UserDirectory>) -> InlineSeq {
    let tokens = scan_structural(decoded);
    let mut inlines = assemble(decoded, &tokens, users);
    if base > 0 {
        for inline in &mut inlines {
            inline.span = inline.span.shifted(base);
        }
    }
    inlines
}

/// Turns sorted, non-overlapping tokens into inline segments.
///
/// Every stretch of text between tokens is scanned for style markers on its
/// own and the resulting styled and literal pieces are spliced in place, so
/// passing only structural tokens still yields bold/italic/strike/code.
pub fn assemble(decoded: &str, tokens: &[Token], users: Option<&UserDirectory>) -> InlineSeq {
    let mut out = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut last = 0usize;
    for token in tokens {
        if token.span.start < last {
            // Overlapping input; the earlier token already covered this text.
            continue;
        }
        push_gap(&mut out, decoded, last, token.span.start);
        out.push(Inline {
            span: token.span,
            kind: inline_kind(&token.kind, users),
        });
        last = token.span.end;
    }
    push_gap(&mut out, decoded, last, decoded.len());
    out
}

fn push_gap(out: &mut InlineSeq, decoded: &str, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let gap = &decoded[start..end];
    let mut last = 0usize;
    for token in scan_styles(gap) {
        push_text(out, gap, last, token.span.start, start);
        out.push(Inline {
            span: token.span.shifted(start),
            kind: inline_kind(&token.kind, None),
        });
        last = token.span.end;
    }
    push_text(out, gap, last, gap.len(), start);
}

fn push_text(out: &mut InlineSeq, text: &str, start: usize, end: usize, base: usize) {
    if start < end {
        out.push(Inline {
            span: Span { start, end }.shifted(base),
            kind: InlineKind::Text(text[start..end].to_string()),
        });
    }
}

fn inline_kind(kind: &TokenKind, users: Option<&UserDirectory>) -> InlineKind {
    match kind {
        TokenKind::Mention { user_id } => InlineKind::Mention {
            user_id: user_id.clone(),
            display_name: resolve_display_name(user_id, users).to_string(),
        },
        TokenKind::Link { url, display } => InlineKind::Link {
            url: url.clone(),
            text: display.clone(),
            plain: false,
        },
        TokenKind::PlainUrl { url } => InlineKind::Link {
            url: url.clone(),
            text: url.clone(),
            plain: true,
        },
        TokenKind::Bold { content } => InlineKind::Bold(content.clone()),
        TokenKind::Italic { content } => InlineKind::Italic(content.clone()),
        TokenKind::Strike { content } => InlineKind::Strike(content.clone()),
        TokenKind::Code { content } => InlineKind::Code(content.clone()),
    }
}

fn resolve_display_name<'a>(user_id: &'a str, users: Option<&'a UserDirectory>) -> &'a str {
    users
        .and_then(|users| users.get(user_id))
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(user_id)
}
