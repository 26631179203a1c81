//! Tokenizer implementation
//! Main lexer structure and token generation logic

use super::literals::{
    is_identifier_char, is_identifier_start, scan_backtick_literal, scan_character_literal,
    scan_pragma, scan_template,
};
use super::state::LexerState;
use crate::frontend::core::lexer::tokens::*;
use crate::frontend::version::Version;
use crate::util::diagnostic::{DiagnosticCode, DiagnosticCollector};
use crate::util::span::{Position, Span};

/// Main lexer structure
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    start_offset: usize,
    start_line: usize,
    start_column: usize,
    pub(crate) state: LexerState,
    pub(crate) diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source
    pub fn new(
        filename: &str,
        source: &'a str,
        version: Version,
    ) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            start_offset: 0,
            start_line: 1,
            start_column: 1,
            state: LexerState::new(version),
            diagnostics: DiagnosticCollector::new(filename),
        }
    }

    /// Get current position
    pub fn position(&self) -> Position {
        Position::with_offset(self.line, self.column, self.offset)
    }

    /// Get start position of current token
    pub fn start_position(&self) -> Position {
        Position::with_offset(self.start_line, self.start_column, self.start_offset)
    }

    /// Get span of current token
    pub fn span(&self) -> Span {
        Span::new(self.start_position(), self.position())
    }

    /// Advance to next character
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Peek at next character
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    /// Peek `n` characters ahead (0 is the next character)
    pub fn peek_nth(
        &self,
        n: usize,
    ) -> Option<char> {
        self.source[self.offset..].chars().nth(n)
    }

    /// Remaining source text
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// Whether the current token starts in column 1
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.start_column == 1
    }

    /// Consume characters up to (not including) the end of the line
    pub fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance();
        }
    }

    /// Skip whitespace, returns whether anything was skipped
    fn skip_whitespace(&mut self) -> bool {
        let before = self.offset;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        self.offset > before || self.offset == 0
    }

    /// Generate next token
    pub fn next_token(&mut self) -> Option<Token> {
        let ws_before = self.skip_whitespace();

        let c = self.peek()?;

        self.start_offset = self.offset;
        self.start_line = self.line;
        self.start_column = self.column;

        let mut token = if c == '}' && self.state.in_template() {
            self.state.leave_template();
            self.advance();
            scan_template(self, false)
        } else {
            self.scan_token(c, ws_before)
        };

        token.ws_before = ws_before;
        token.ws_after = self.peek().map_or(true, char::is_whitespace);
        tracing::trace!("token {:?} {:?} at {}", token.kind, token.text, token.span.start);
        Some(token)
    }

    fn scan_token(
        &mut self,
        c: char,
        ws_before: bool,
    ) -> Token {
        let prefix = match c {
            '<' => self.field_symbol_len(),
            '/' => self.namespace_len(),
            '!' if self.peek_nth(1).is_some_and(is_identifier_start) => Some(1),
            _ => None,
        };
        if let Some(len) = prefix {
            for _ in 0..len {
                self.advance();
            }
            return self.scan_identifier();
        }

        match c {
            '*' if self.at_line_start() => self.scan_comment(),
            '"' => self.scan_comment(),
            '\'' => scan_character_literal(self),
            '`' => scan_backtick_literal(self),
            '|' => {
                self.advance();
                scan_template(self, true)
            }
            '#' if self.peek_nth(1) == Some('#') => scan_pragma(self),
            c if is_identifier_start(c) => self.scan_identifier(),
            _ => self.scan_operator(c, ws_before),
        }
    }

    /// `"` comment, or `*` comment in column 1
    fn scan_comment(&mut self) -> Token {
        self.skip_to_line_end();
        self.make_token(TokenKind::Comment)
    }

    /// Scan identifier token, `lr_/ns/name` included
    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if is_identifier_char(c) {
                self.advance();
            } else if let Some(len) = self.namespace_len().filter(|_| c == '/') {
                for _ in 0..len {
                    self.advance();
                }
            } else {
                break;
            }
        }
        self.make_token(TokenKind::Identifier)
    }

    /// Character length of a field symbol name `<name>` at the cursor
    fn field_symbol_len(&self) -> Option<usize> {
        let mut chars = self.rest().chars();
        chars.next().filter(|&c| c == '<')?;
        chars.next().filter(|&c| is_identifier_start(c))?;
        let mut len = 2;
        for c in chars {
            len += 1;
            if c == '>' {
                return Some(len);
            }
            if !is_identifier_char(c) {
                return None;
            }
        }
        None
    }

    /// Character length of a namespace prefix `/ns/` at the cursor
    fn namespace_len(&self) -> Option<usize> {
        let mut chars = self.rest().chars();
        chars.next().filter(|&c| c == '/')?;
        chars.next().filter(|&c| is_identifier_start(c))?;
        let mut len = 2;
        for c in chars {
            len += 1;
            if c == '/' {
                return Some(len);
            }
            if !is_identifier_char(c) {
                return None;
            }
        }
        None
    }

    /// `x= ` style compound assignment needs whitespace on both sides
    fn compound_follows(
        &self,
        ws_before: bool,
    ) -> bool {
        ws_before
            && self.peek_nth(1) == Some('=')
            && self.peek_nth(2).map_or(true, char::is_whitespace)
    }

    fn scan_operator(
        &mut self,
        c: char,
        ws_before: bool,
    ) -> Token {
        if matches!(c, '+' | '-' | '*' | '/') && self.compound_follows(ws_before) {
            self.advance();
            self.advance();
            return self.make_token(TokenKind::CompoundAssign);
        }

        self.advance();
        let next = self.peek();
        let kind = match (c, next) {
            ('.', _) => TokenKind::Period,
            (',', _) => TokenKind::Comma,
            (':', _) => TokenKind::Colon,
            ('(', _) => TokenKind::ParenLeft,
            (')', _) => TokenKind::ParenRight,
            ('[', _) => TokenKind::BracketLeft,
            (']', _) => TokenKind::BracketRight,
            ('-', Some('>')) => self.two(TokenKind::InstanceArrow),
            ('-', _) => TokenKind::Dash,
            ('+', _) => TokenKind::Plus,
            ('*', Some('*')) => self.two(TokenKind::Power),
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('=', Some('>')) => self.two(TokenKind::StaticArrow),
            ('=', Some('<')) => self.two(TokenKind::Compare),
            ('=', _) => TokenKind::Equals,
            ('?', Some('=')) => self.two(TokenKind::CastEquals),
            ('<', Some('>' | '=')) => self.two(TokenKind::Compare),
            ('<', _) => TokenKind::Compare,
            ('>', Some('=' | '<')) => self.two(TokenKind::Compare),
            ('>', _) => TokenKind::Compare,
            ('&', Some('&')) => self.two(TokenKind::Concat),
            ('&', _) => TokenKind::Ampersand,
            ('~', _) => TokenKind::Tilde,
            ('@', _) => TokenKind::At,
            ('#', _) => TokenKind::Hash,
            (c, _) => {
                let span = self.span();
                self.diagnostics.error(
                    DiagnosticCode::UnexpectedCharacter,
                    format!("Unexpected character '{}'", c),
                    span,
                );
                TokenKind::Error
            }
        };
        self.make_token(kind)
    }

    /// Consume the second character of a two-character operator
    fn two(
        &mut self,
        kind: TokenKind,
    ) -> TokenKind {
        self.advance();
        kind
    }

    /// Create token with current span and source text
    pub fn make_token(
        &self,
        kind: TokenKind,
    ) -> Token {
        Token::new(
            kind,
            &self.source[self.start_offset..self.offset],
            self.span(),
        )
    }

    /// Run the lexer to completion
    pub fn tokenize_all(mut self) -> (Vec<Token>, DiagnosticCollector) {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        (tokens, self.diagnostics)
    }
}
