use crate::span::Span;

/// One matched in-band construct, positioned in the decoded text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Mention { user_id: String },
    Link { url: String, display: String },
    PlainUrl { url: String },
    Bold { content: String },
    Italic { content: String },
    Strike { content: String },
    Code { content: String },
}

impl Token {
    pub(crate) fn shifted(self, base: usize) -> Token {
        Token {
            span: self.span.shifted(base),
            kind: self.kind,
        }
    }
}
