//! Grammar combinators
//!
//! Statement and expression grammars are plain data: a tree of [`Combinator`]
//! values built once per language version. [`matcher::Matcher`] walks that tree
//! over one statement's tokens.
//!
//! Ordering is significant everywhere: when two alternatives reach the same
//! token position, the one listed first wins.
//!
//! ```ignore
//! use crate::frontend::core::combi::*;
//!
//! let clear = seq!["CLEAR", ExprKind::Target, opt(seq!["WITH", ExprKind::Source])];
//! ```

pub mod matcher;

use std::collections::BTreeSet;

use regex::Regex;

use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::kinds::ExprKind;
use crate::frontend::version::Version;

pub use matcher::{ExprGrammar, MatchNode, Matcher};

/// One grammar element
#[derive(Debug, Clone)]
pub enum Combinator {
    /// Single keyword, compared case-insensitively against the token text
    Word(Box<str>),
    /// Token kind with optional whitespace constraints
    Token {
        kind: TokenKind,
        ws_before: Option<bool>,
        ws_after: Option<bool>,
    },
    /// Identifier token whose whole text matches
    Regex(Box<Regex>),
    Seq(Vec<Combinator>),
    /// All alternatives are explored
    Alt(Vec<Combinator>),
    /// First alternative that matches anything commits
    AltPrio(Vec<Combinator>),
    Opt(Box<Combinator>),
    /// Skips only when the inner grammar does not match
    OptPrio(Box<Combinator>),
    Star(Box<Combinator>),
    Plus(Box<Combinator>),
    /// Every non-optional element exactly once, in any order
    Per(Vec<Combinator>),
    Expr(ExprKind),
    /// Inner grammar, unless the next token is one of the words
    Except {
        words: Box<[Box<str>]>,
        inner: Box<Combinator>,
    },
    /// Version gate, removed by [`Combinator::resolve`]
    Ver {
        since: Version,
        negate: bool,
        inner: Box<Combinator>,
    },
    Fail,
}

impl From<&str> for Combinator {
    fn from(text: &str) -> Self {
        word(text)
    }
}

impl From<ExprKind> for Combinator {
    fn from(kind: ExprKind) -> Self {
        Combinator::Expr(kind)
    }
}

impl From<TokenKind> for Combinator {
    fn from(kind: TokenKind) -> Self {
        tok(kind)
    }
}

/// Keyword text. `"OF STRUCTURE"` becomes two words, `"FIELD-SYMBOLS"` becomes
/// `FIELD`, a tight dash, and `SYMBOLS`.
pub fn word(text: &str) -> Combinator {
    let mut parts = Vec::new();
    for w in text.split_whitespace() {
        let mut first = true;
        for piece in w.split('-') {
            if !first {
                parts.push(tok_ws(TokenKind::Dash, Some(false), Some(false)));
            }
            first = false;
            parts.push(Combinator::Word(piece.to_ascii_uppercase().into_boxed_str()));
        }
    }
    if parts.len() == 1 {
        parts.pop().unwrap_or(Combinator::Fail)
    } else {
        Combinator::Seq(parts)
    }
}

pub fn tok(kind: TokenKind) -> Combinator {
    Combinator::Token {
        kind,
        ws_before: None,
        ws_after: None,
    }
}

/// Token with whitespace requirements; `None` means either
pub fn tok_ws(
    kind: TokenKind,
    ws_before: Option<bool>,
    ws_after: Option<bool>,
) -> Combinator {
    Combinator::Token {
        kind,
        ws_before,
        ws_after,
    }
}

/// Case-insensitive regex anchored to the whole token text.
///
/// Patterns are compile-time literals of the grammar; an invalid one is a bug.
pub fn regex(pattern: &str) -> Combinator {
    let anchored = format!("(?i)^(?:{})$", pattern);
    let re = Regex::new(&anchored)
        .unwrap_or_else(|e| panic!("invalid grammar pattern {:?}: {}", pattern, e));
    Combinator::Regex(Box::new(re))
}

pub fn expr(kind: ExprKind) -> Combinator {
    Combinator::Expr(kind)
}

pub fn opt(inner: impl Into<Combinator>) -> Combinator {
    Combinator::Opt(Box::new(inner.into()))
}

pub fn opt_prio(inner: impl Into<Combinator>) -> Combinator {
    Combinator::OptPrio(Box::new(inner.into()))
}

pub fn star(inner: impl Into<Combinator>) -> Combinator {
    Combinator::Star(Box::new(inner.into()))
}

pub fn plus(inner: impl Into<Combinator>) -> Combinator {
    Combinator::Plus(Box::new(inner.into()))
}

/// Available from `since` onwards
pub fn ver(
    since: Version,
    inner: impl Into<Combinator>,
) -> Combinator {
    Combinator::Ver {
        since,
        negate: false,
        inner: Box::new(inner.into()),
    }
}

/// Available only before `since`
pub fn ver_not(
    since: Version,
    inner: impl Into<Combinator>,
) -> Combinator {
    Combinator::Ver {
        since,
        negate: true,
        inner: Box::new(inner.into()),
    }
}

/// `inner`, refusing to start at one of `words`.
/// Keeps list grammars such as `USING a b` from swallowing the next keyword.
pub fn except(
    words: &[&str],
    inner: impl Into<Combinator>,
) -> Combinator {
    Combinator::Except {
        words: words
            .iter()
            .map(|w| w.to_ascii_uppercase().into_boxed_str())
            .collect(),
        inner: Box::new(inner.into()),
    }
}

pub fn fail() -> Combinator {
    Combinator::Fail
}

/// `seq!["DATA", ExprKind::DataDefinition]`
#[macro_export]
macro_rules! seq {
    ($($e:expr),* $(,)?) => {
        $crate::frontend::core::combi::Combinator::Seq(vec![$(::core::convert::Into::into($e)),*])
    };
}

#[macro_export]
macro_rules! alt {
    ($($e:expr),* $(,)?) => {
        $crate::frontend::core::combi::Combinator::Alt(vec![$(::core::convert::Into::into($e)),*])
    };
}

#[macro_export]
macro_rules! alt_prio {
    ($($e:expr),* $(,)?) => {
        $crate::frontend::core::combi::Combinator::AltPrio(vec![$(::core::convert::Into::into($e)),*])
    };
}

#[macro_export]
macro_rules! per {
    ($($e:expr),* $(,)?) => {
        $crate::frontend::core::combi::Combinator::Per(vec![$(::core::convert::Into::into($e)),*])
    };
}

pub use crate::{alt, alt_prio, per, seq};

/// Words that can start a grammar, used to index statements by first keyword
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub words: BTreeSet<String>,
    /// Can start with a non-keyword token
    pub any: bool,
    /// Can match without consuming
    pub nullable: bool,
}

impl FirstSet {
    fn merge(
        &mut self,
        other: FirstSet,
    ) {
        self.words.extend(other.words);
        self.any |= other.any;
    }
}

impl Combinator {
    /// Replace version gates by their content or by `Fail`
    pub fn resolve(
        self,
        version: Version,
    ) -> Combinator {
        let list = |items: Vec<Combinator>| -> Vec<Combinator> {
            items.into_iter().map(|c| c.resolve(version)).collect()
        };
        let boxed = |inner: Box<Combinator>| Box::new(inner.resolve(version));
        match self {
            Combinator::Ver {
                since,
                negate,
                inner,
            } => {
                if version.supports(since) != negate {
                    inner.resolve(version)
                } else {
                    Combinator::Fail
                }
            }
            Combinator::Seq(items) => {
                let items = list(items);
                if items.iter().any(|c| matches!(c, Combinator::Fail)) {
                    Combinator::Fail
                } else {
                    Combinator::Seq(items)
                }
            }
            Combinator::Alt(items) => Self::prune(list(items), Combinator::Alt),
            Combinator::AltPrio(items) => Self::prune(list(items), Combinator::AltPrio),
            Combinator::Per(items) => Self::prune(list(items), Combinator::Per),
            Combinator::Opt(inner) => Combinator::Opt(boxed(inner)),
            Combinator::OptPrio(inner) => Combinator::OptPrio(boxed(inner)),
            Combinator::Star(inner) => Combinator::Star(boxed(inner)),
            Combinator::Except { words, inner } => match inner.resolve(version) {
                Combinator::Fail => Combinator::Fail,
                inner => Combinator::Except {
                    words,
                    inner: Box::new(inner),
                },
            },
            Combinator::Plus(inner) => match inner.resolve(version) {
                Combinator::Fail => Combinator::Fail,
                inner => Combinator::Plus(Box::new(inner)),
            },
            other => other,
        }
    }

    fn prune(
        items: Vec<Combinator>,
        make: fn(Vec<Combinator>) -> Combinator,
    ) -> Combinator {
        let items: Vec<Combinator> = items
            .into_iter()
            .filter(|c| !matches!(c, Combinator::Fail))
            .collect();
        if items.is_empty() {
            Combinator::Fail
        } else {
            make(items)
        }
    }

    /// Keywords this grammar can start with
    pub fn first_set(&self) -> FirstSet {
        match self {
            Combinator::Word(w) => FirstSet {
                words: BTreeSet::from([w.to_string()]),
                ..Default::default()
            },
            Combinator::Token { .. } | Combinator::Regex(_) | Combinator::Expr(_) => FirstSet {
                any: true,
                ..Default::default()
            },
            Combinator::Seq(items) => {
                let mut set = FirstSet {
                    nullable: true,
                    ..Default::default()
                };
                for item in items {
                    let first = item.first_set();
                    let nullable = first.nullable;
                    set.merge(first);
                    if !nullable {
                        set.nullable = false;
                        break;
                    }
                }
                set
            }
            Combinator::Alt(items) | Combinator::AltPrio(items) => {
                let mut set = FirstSet::default();
                for item in items {
                    let first = item.first_set();
                    set.nullable |= first.nullable;
                    set.merge(first);
                }
                set
            }
            Combinator::Per(items) => {
                let mut set = FirstSet::default();
                for item in items {
                    set.merge(item.first_set());
                }
                set
            }
            Combinator::Opt(inner) | Combinator::OptPrio(inner) | Combinator::Star(inner) => {
                FirstSet {
                    nullable: true,
                    ..inner.first_set()
                }
            }
            Combinator::Plus(inner) => inner.first_set(),
            Combinator::Except { inner, .. } | Combinator::Ver { inner, .. } => inner.first_set(),
            Combinator::Fail => FirstSet::default(),
        }
    }

    /// Whether this element may be skipped inside [`Combinator::Per`]
    pub(crate) fn is_optional(&self) -> bool {
        matches!(self, Combinator::Opt(_) | Combinator::OptPrio(_))
    }
}

#[cfg(test)]
mod tests;
