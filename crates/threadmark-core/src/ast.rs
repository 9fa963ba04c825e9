use crate::span::Span;

pub type InlineSeq = Vec<Inline>;

/// Placeholder content of a paragraph produced by an empty line.
pub const BLANK_LINE: &str = "\u{a0}";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Inline {
    pub span: Span,
    pub kind: InlineKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InlineKind {
    Text(String),
    Mention {
        user_id: String,
        display_name: String,
    },
    Link {
        url: String,
        text: String,
        // Found as a bare URL in running text rather than inside `<...>`.
        plain: bool,
    },
    Bold(String),
    Italic(String),
    Strike(String),
    Code(String),
}

impl Inline {
    /// The text a reader sees once markup delimiters are gone.
    pub fn visible_text(&self) -> &str {
        match &self.kind {
            InlineKind::Text(text)
            | InlineKind::Bold(text)
            | InlineKind::Italic(text)
            | InlineKind::Strike(text)
            | InlineKind::Code(text) => text,
            InlineKind::Mention { display_name, .. } => display_name,
            InlineKind::Link { text, .. } => text,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub span: Span,
    pub kind: BlockKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlockKind {
    Paragraph { content: InlineSeq },
    Quote { content: InlineSeq },
    CodeBlock { text: String },
}

impl Block {
    pub fn is_blank_line(&self) -> bool {
        match &self.kind {
            BlockKind::Paragraph { content } => {
                matches!(content.as_slice(), [Inline { kind: InlineKind::Text(text), .. }] if text == BLANK_LINE)
            }
            _ => false,
        }
    }

    /// Inline content of paragraphs and quotes; code blocks have none.
    pub fn inlines(&self) -> &[Inline] {
        match &self.kind {
            BlockKind::Paragraph { content } | BlockKind::Quote { content } => content,
            BlockKind::CodeBlock { .. } => &[],
        }
    }
}
