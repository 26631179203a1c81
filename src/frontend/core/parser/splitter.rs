//! Statement splitting
//!
//! Cuts the token stream into statements before any grammar runs.
//! `.` ends a statement, `,` ends one chain element after a `:`. Commas and
//! colons inside parentheses, brackets and string templates do not split.

use smallvec::SmallVec;

use crate::frontend::core::lexer::{Token, TokenIdx, TokenKind};

/// What the splitter found, before recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Normal,
    Comment,
    /// Terminator without content
    Empty,
}

/// Token range of one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub kind: RawKind,
    /// Tokens to match, chain prefix included; comments and pragmas excluded
    pub tokens: Vec<TokenIdx>,
    /// `.` or chain `,`; `None` when the file ends first
    pub terminator: Option<TokenIdx>,
    pub colon: Option<TokenIdx>,
    pub pragmas: SmallVec<[TokenIdx; 2]>,
}

impl RawStatement {
    fn comment(idx: TokenIdx) -> Self {
        Self {
            kind: RawKind::Comment,
            tokens: vec![idx],
            terminator: None,
            colon: None,
            pragmas: SmallVec::new(),
        }
    }
}

#[derive(Default)]
struct Splitter {
    out: Vec<RawStatement>,
    /// Chain prefix, tokens before the colon
    prefix: Vec<TokenIdx>,
    colon: Option<TokenIdx>,
    current: Vec<TokenIdx>,
    pragmas: SmallVec<[TokenIdx; 2]>,
    /// Comments met inside an unfinished statement
    deferred: Vec<TokenIdx>,
    depth: usize,
}

impl Splitter {
    fn emit(
        &mut self,
        terminator: Option<TokenIdx>,
    ) {
        let mut tokens = self.prefix.clone();
        tokens.append(&mut self.current);
        let kind = if tokens.is_empty() {
            RawKind::Empty
        } else {
            RawKind::Normal
        };
        self.out.push(RawStatement {
            kind,
            tokens,
            terminator,
            colon: self.colon,
            pragmas: std::mem::take(&mut self.pragmas),
        });
        for idx in std::mem::take(&mut self.deferred) {
            self.out.push(RawStatement::comment(idx));
        }
    }

    fn end_chain(&mut self) {
        self.prefix.clear();
        self.colon = None;
        self.depth = 0;
    }
}

/// Split `tokens` into statements, in source order
pub fn split_statements(tokens: &[Token]) -> Vec<RawStatement> {
    let mut s = Splitter::default();

    for (i, token) in tokens.iter().enumerate() {
        let idx = TokenIdx::new(i);
        match token.kind {
            TokenKind::Comment => {
                if s.current.is_empty() {
                    s.out.push(RawStatement::comment(idx));
                } else {
                    s.deferred.push(idx);
                }
            }
            TokenKind::Pragma => s.pragmas.push(idx),
            // an unbalanced parenthesis must not swallow the rest of the file
            TokenKind::Period if s.depth == 0 || token.ws_after => {
                s.emit(Some(idx));
                s.end_chain();
            }
            TokenKind::Colon if s.depth == 0 && s.colon.is_none() => {
                s.prefix = std::mem::take(&mut s.current);
                s.colon = Some(idx);
            }
            // further colons in a chain are dropped
            TokenKind::Colon if s.depth == 0 => {}
            TokenKind::Comma if s.depth == 0 && s.colon.is_some() => {
                s.emit(Some(idx));
            }
            kind => {
                if kind.opens_nesting() {
                    s.depth += 1;
                } else if kind.closes_nesting() {
                    s.depth = s.depth.saturating_sub(1);
                }
                s.current.push(idx);
            }
        }
    }

    if !s.current.is_empty() || !s.prefix.is_empty() {
        s.emit(None);
    } else {
        let comments = std::mem::take(&mut s.deferred);
        s.out.extend(comments.into_iter().map(RawStatement::comment));
    }

    tracing::trace!("split {} tokens into {} statements", tokens.len(), s.out.len());
    s.out
}
