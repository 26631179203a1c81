//! Token types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::span::{Position, Span};

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Words: keywords, names, numbers, field symbols `<fs>`, namespaced `/ns/name`
    Identifier,

    // Literals
    /// `'text'` or `` `text` ``
    StringLiteral,
    /// `|text|` without embedded expressions
    StringTemplate,
    /// `|text {`
    StringTemplateBegin,
    /// `} text {`
    StringTemplateMiddle,
    /// `} text|`
    StringTemplateEnd,

    // Trivia kept in the stream
    Comment,
    /// `##NAME`
    Pragma,

    // Delimiters
    Period,
    Comma,
    Colon,
    ParenLeft,
    ParenRight,
    BracketLeft,
    BracketRight,

    // Operators
    /// `->`
    InstanceArrow,
    /// `=>`
    StaticArrow,
    Dash,
    Plus,
    Star,
    Slash,
    /// `**`
    Power,
    Equals,
    /// `<>`, `<`, `>`, `<=`, `>=`, `><`, `=<`
    Compare,
    /// `?=`
    CastEquals,
    /// `+=`, `-=`, `*=`, `/=`
    CompoundAssign,
    /// `&&`
    Concat,
    Ampersand,
    Tilde,
    At,
    Hash,

    // Special
    Error,
}

impl TokenKind {
    /// Comments and pragmas never take part in grammar matching
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Pragma)
    }

    /// Tokens that open a nesting level for statement splitting
    pub fn opens_nesting(&self) -> bool {
        matches!(
            self,
            TokenKind::ParenLeft | TokenKind::BracketLeft | TokenKind::StringTemplateBegin
        )
    }

    pub fn closes_nesting(&self) -> bool {
        matches!(
            self,
            TokenKind::ParenRight | TokenKind::BracketRight | TokenKind::StringTemplateEnd
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Index of a token inside one file's token vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenIdx(pub u32);

impl TokenIdx {
    #[inline]
    pub fn new(index: usize) -> Self {
        TokenIdx(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text, original casing
    pub text: String,
    pub span: Span,
    /// Whitespace (or start of file) directly before the token
    pub ws_before: bool,
    /// Whitespace (or end of file) directly after the token
    pub ws_after: bool,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            ws_before: true,
            ws_after: true,
        }
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.span.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.span.end
    }

    /// Case-insensitive text comparison, used for keyword matching
    #[inline]
    pub fn is(
        &self,
        text: &str,
    ) -> bool {
        self.text.eq_ignore_ascii_case(text)
    }

    /// Upper-cased text
    pub fn upper(&self) -> String {
        self.text.to_ascii_uppercase()
    }

    /// Whether the token is a plain word (identifier, keyword or number)
    #[inline]
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
