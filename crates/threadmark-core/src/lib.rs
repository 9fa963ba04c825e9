//! Formatting engine for chat-platform message text.
//!
//! Raw messages arrive HTML-escaped with in-band markup: `<@U123>` mentions,
//! `<url|label>` links, bare URLs, `*bold*`, `_italic_`, `~strike~`,
//! `` `code` ``, `>` quote lines and fenced code blocks. [`format_message`]
//! turns them into blocks of typed inline segments for a rendering layer;
//! [`format_inline`] handles a single run without block structure.

mod ast;
mod block;
mod cache;
mod directory;
#[cfg(feature = "serde")]
pub mod dto;
mod emit;
mod entities;
mod inline;
mod scanner;
mod span;
mod token;

pub use ast::{BLANK_LINE, Block, BlockKind, Inline, InlineKind, InlineSeq};
pub use block::format_message;
pub use cache::MessageFormatter;
pub use directory::{DirectoryError, UserDirectory, is_valid_user_id, parse_user_directory};
pub use emit::{
    HtmlEmitOptions, emit_html, emit_html_sanitized, emit_html_sanitized_with_options,
    emit_html_with_options,
};
pub use entities::{decode_entities, lookup_entity};
pub use inline::{assemble, format_inline};
pub use scanner::{scan, scan_structural, scan_styles};
pub use span::Span;
pub use token::{Token, TokenKind};
