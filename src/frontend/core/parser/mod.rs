//! Statement recognizer
//!
//! Splits the token stream into statements and matches each against the
//! grammar table of the target version. A statement that no grammar accepts
//! becomes an `Unknown` node covering all of its tokens, so one bad line never
//! stops the rest of the file from being parsed.

pub mod expressions;
pub mod grammar;
pub mod kinds;
pub mod nodes;
pub mod splitter;
pub mod statements;
#[cfg(test)]
mod tests;

pub use grammar::GrammarTable;
pub use kinds::{ExprKind, StatementKind};
pub use nodes::{Child, ChildRef, Node, NodeArena, NodeId, NodeKind, NodeRef, Statement};
pub use splitter::{split_statements, RawKind, RawStatement};

use smallvec::SmallVec;

use crate::frontend::core::combi::MatchNode;
use crate::frontend::core::lexer::{Token, TokenIdx};
use crate::frontend::version::Version;
use crate::util::diagnostic::{DiagnosticCode, DiagnosticCollector};
use crate::util::span::Span;

/// Recognized statements of one file
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub arena: NodeArena,
    pub statements: Vec<Statement>,
    pub diagnostics: DiagnosticCollector,
}

/// Recognize every statement in `tokens`
pub fn parse_statements(
    filename: &str,
    tokens: &[Token],
    version: Version,
) -> ParseOutput {
    let table = GrammarTable::for_version(version);
    let mut output = ParseOutput {
        arena: NodeArena::new(),
        statements: Vec::new(),
        diagnostics: DiagnosticCollector::new(filename),
    };

    for raw in split_statements(tokens) {
        let statement = recognize(table, tokens, &raw, &mut output.arena);
        match statement.kind {
            StatementKind::Unknown => {
                tracing::debug!("unknown statement at {}", statement.span.start);
                output.diagnostics.error(
                    DiagnosticCode::ParserError,
                    format!(
                        "Statement does not exist in ABAP {}, or a parser error",
                        version
                    ),
                    statement.span,
                );
            }
            _ if raw.kind == RawKind::Normal && raw.terminator.is_none() => {
                output.diagnostics.error(
                    DiagnosticCode::MissingPeriod,
                    "Statement is not terminated by a period",
                    statement.span,
                );
            }
            _ => {}
        }
        output.statements.push(statement);
    }

    tracing::debug!(
        "recognized {} statements in {}",
        output.statements.len(),
        filename
    );
    output
}

/// Build the statement node for one split statement
pub fn recognize(
    table: &GrammarTable,
    tokens: &[Token],
    raw: &RawStatement,
    arena: &mut NodeArena,
) -> Statement {
    let (kind, mut children): (StatementKind, SmallVec<[Child; 4]>) = match raw.kind {
        RawKind::Comment => (
            StatementKind::Comment,
            raw.tokens.iter().map(|idx| Child::Token(*idx)).collect(),
        ),
        RawKind::Empty => (StatementKind::Empty, SmallVec::new()),
        RawKind::Normal => match table.recognize(tokens, &raw.tokens) {
            Some((kind, matched)) => (kind, build_children(arena, tokens, &matched)),
            None => (
                StatementKind::Unknown,
                raw.tokens.iter().map(|idx| Child::Token(*idx)).collect(),
            ),
        },
    };
    if let Some(terminator) = raw.terminator {
        children.push(Child::Token(terminator));
    }

    let span = children_span(arena, tokens, &children);
    let node = arena.alloc(Node {
        kind: NodeKind::Statement(kind),
        children,
        span,
    });
    Statement {
        kind,
        node,
        colon: raw.colon,
        pragmas: raw.pragmas.clone(),
        span,
    }
}

fn build_children(
    arena: &mut NodeArena,
    tokens: &[Token],
    matched: &[MatchNode],
) -> SmallVec<[Child; 4]> {
    matched
        .iter()
        .map(|node| match node {
            MatchNode::Token(idx) => Child::Token(*idx),
            MatchNode::Expr(kind, inner) => {
                let children = build_children(arena, tokens, inner);
                let span = children_span(arena, tokens, &children);
                Child::Node(arena.alloc(Node {
                    kind: NodeKind::Expression(*kind),
                    children,
                    span,
                }))
            }
        })
        .collect()
}

fn children_span(
    arena: &NodeArena,
    tokens: &[Token],
    children: &[Child],
) -> Span {
    let edge = |child: Option<&Child>| -> Option<Span> {
        match child? {
            Child::Token(idx) => Some(tokens[idx.index()].span),
            Child::Node(id) => Some(arena.get(*id).span),
        }
    };
    match (edge(children.first()), edge(children.last())) {
        (Some(first), Some(last)) => first.merge(&last),
        _ => Span::dummy(),
    }
}

/// Token index of the first token of a statement, if any
pub fn first_token_of(
    arena: &NodeArena,
    statement: &Statement,
) -> Option<TokenIdx> {
    let mut id = statement.node;
    loop {
        match *arena.get(id).children.first()? {
            Child::Token(idx) => return Some(idx),
            Child::Node(next) => id = next,
        }
    }
}
