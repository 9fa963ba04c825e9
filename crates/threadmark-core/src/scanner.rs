use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::span::Span;
use crate::token::{Token, TokenKind};

type Finder = fn(&str) -> Vec<Token>;

// Precedence order: a candidate overlapping an earlier pattern's match is dropped.
const STRUCTURAL: &[Finder] = &[find_mentions, find_keyed_links, find_bare_links, find_plain_urls];
const STYLES: &[Finder] = &[find_bold, find_italic, find_strike, find_code];

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"<@([A-Z0-9]+)>"));
// The target may not contain `@`, `|` or `>`.
static KEYED_LINK_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"<([^@|>]+)\|([^>]+)>"));
static BARE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"<(https?://[^|>]+)>"));
static PLAIN_URL_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"https?://[^\s<>]+"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
}

/// Finds every token in `decoded`, sorted by start offset and non-overlapping.
///
/// Mentions and links are located on the whole text first. Style markers are
/// then searched for independently inside each gap the structural pass left
/// uncovered, so a style span can never straddle a link.
pub fn scan(decoded: &str) -> Vec<Token> {
    let structural = scan_structural(decoded);
    let mut tokens = Vec::with_capacity(structural.len());
    let mut last = 0usize;
    for token in structural {
        if token.span.start > last {
            tokens.extend(scan_gap(decoded, last, token.span.start));
        }
        last = token.span.end;
        tokens.push(token);
    }
    if last < decoded.len() {
        tokens.extend(scan_gap(decoded, last, decoded.len()));
    }
    tokens
}

/// Mentions, keyed links, bare links and plain URLs over the whole text.
pub fn scan_structural(decoded: &str) -> Vec<Token> {
    let tokens = scan_with(decoded, STRUCTURAL);
    trace!(count = tokens.len(), "structural tokens");
    tokens
}

/// Bold, italic, strikethrough and inline code inside one run of plain text.
pub fn scan_styles(text: &str) -> Vec<Token> {
    scan_with(text, STYLES)
}

fn scan_gap(decoded: &str, start: usize, end: usize) -> impl Iterator<Item = Token> {
    scan_styles(&decoded[start..end])
        .into_iter()
        .map(move |token| token.shifted(start))
}

fn scan_with(text: &str, finders: &[Finder]) -> Vec<Token> {
    // Kept sorted; claimed spans are disjoint, so their ends are sorted too.
    let mut claimed: Vec<Token> = Vec::new();
    for finder in finders {
        for candidate in finder(text) {
            let idx = claimed.partition_point(|token| token.span.end <= candidate.span.start);
            if claimed
                .get(idx)
                .is_some_and(|token| token.span.overlaps(candidate.span))
            {
                continue;
            }
            claimed.insert(idx, candidate);
        }
    }
    claimed
}

fn token(start: usize, end: usize, kind: TokenKind) -> Token {
    Token {
        span: Span { start, end },
        kind,
    }
}

fn capture_token(caps: &Captures<'_>, kind: impl FnOnce(&Captures<'_>) -> Option<TokenKind>) -> Option<Token> {
    let whole = caps.get(0)?;
    Some(token(whole.start(), whole.end(), kind(caps)?))
}

/// `<@ID>` with an id of upper-case letters and digits.
fn find_mentions(text: &str) -> Vec<Token> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            capture_token(&caps, |caps| {
                Some(TokenKind::Mention {
                    user_id: caps.get(1)?.as_str().to_string(),
                })
            })
        })
        .collect()
}

/// `<target|label>`.
fn find_keyed_links(text: &str) -> Vec<Token> {
    KEYED_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            capture_token(&caps, |caps| {
                Some(TokenKind::Link {
                    url: caps.get(1)?.as_str().to_string(),
                    display: caps.get(2)?.as_str().to_string(),
                })
            })
        })
        .collect()
}

/// `<http://...>` without a label.
fn find_bare_links(text: &str) -> Vec<Token> {
    BARE_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            capture_token(&caps, |caps| {
                let url = caps.get(1)?.as_str().to_string();
                Some(TokenKind::Link {
                    display: url.clone(),
                    url,
                })
            })
        })
        .collect()
}

/// URLs in running text, not directly preceded by `<`.
fn find_plain_urls(text: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(found) = PLAIN_URL_RE.find_at(text, pos) {
        if text[..found.start()].ends_with('<') {
            // Retry from the next character, as a look-behind would.
            pos = found.start() + 1;
            continue;
        }
        out.push(token(
            found.start(),
            found.end(),
            TokenKind::PlainUrl {
                url: found.as_str().to_string(),
            },
        ));
        pos = found.end();
    }
    out
}

fn find_bold(text: &str) -> Vec<Token> {
    find_delimited(text, '*', true, |content| TokenKind::Bold { content })
}

fn find_italic(text: &str) -> Vec<Token> {
    find_delimited(text, '_', true, |content| TokenKind::Italic { content })
}

fn find_strike(text: &str) -> Vec<Token> {
    find_delimited(text, '~', true, |content| TokenKind::Strike { content })
}

fn find_code(text: &str) -> Vec<Token> {
    find_delimited(text, '`', false, |content| TokenKind::Code { content })
}

// Leftmost-first, resuming after each match; only marker positions are tried.
fn find_delimited(text: &str, marker: char, guarded: bool, kind: fn(String) -> TokenKind) -> Vec<Token> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = text[pos..].find(marker).map(|idx| pos + idx) {
        match match_delimited(text, start, marker, guarded) {
            Some((end, content)) => {
                out.push(token(start, end, kind(content)));
                pos = end;
            }
            None => pos = start + marker.len_utf8(),
        }
    }
    out
}

/// `marker content marker` on a single line. With `guarded`, neither delimiter
/// may touch an alphanumeric character or another marker from the outside,
/// which keeps `3*4*5` and `snake_case_name` literal.
fn match_delimited(text: &str, start: usize, marker: char, guarded: bool) -> Option<(usize, String)> {
    let blocks = |ch: Option<char>| ch.is_some_and(|ch| ch == marker || ch.is_alphanumeric());
    if guarded && blocks(text[..start].chars().next_back()) {
        return None;
    }
    let content_start = start + marker.len_utf8();
    let content_len = text[content_start..]
        .find(|ch: char| ch == marker || ch == '\n')
        .filter(|len| *len > 0)?;
    let close = content_start + content_len;
    if !text[close..].starts_with(marker) {
        return None;
    }
    let end = close + marker.len_utf8();
    if guarded && blocks(text[end..].chars().next()) {
        return None;
    }
    Some((end, text[content_start..close].to_string()))
}
