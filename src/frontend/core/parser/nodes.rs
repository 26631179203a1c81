//! Statement and expression nodes
//!
//! Nodes live in a per-file [`NodeArena`] and refer to each other and to
//! tokens by index, so statements, expressions and the tokens they cover form
//! a tree without shared ownership. Trees are never modified after the
//! recognizer builds them; [`NodeRef`] offers read-only traversals.

use la_arena::{Arena, Idx};
use smallvec::SmallVec;

use super::kinds::{ExprKind, StatementKind};
use crate::frontend::core::lexer::{Token, TokenIdx};
use crate::util::span::Span;

pub type NodeId = Idx<Node>;

/// Node tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Statement(StatementKind),
    Expression(ExprKind),
}

/// Child of a node: a raw token or a nested expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Token(TokenIdx),
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: SmallVec<[Child; 4]>,
    pub span: Span,
}

/// Arena holding every node of one file
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Arena<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(
        &mut self,
        node: Node,
    ) -> NodeId {
        self.nodes.alloc(node)
    }

    pub fn get(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Navigable view of `id`
    pub fn view<'a>(
        &'a self,
        tokens: &'a [Token],
        id: NodeId,
    ) -> NodeRef<'a> {
        NodeRef {
            arena: self,
            tokens,
            id,
        }
    }
}

/// A recognized statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub node: NodeId,
    /// Chain colon shared with sibling statements, excluded from the node
    pub colon: Option<TokenIdx>,
    /// `##PRAGMA` tokens attached to this statement
    pub pragmas: SmallVec<[TokenIdx; 2]>,
    pub span: Span,
}

/// Child as seen through a [`NodeRef`]
#[derive(Debug, Clone, Copy)]
pub enum ChildRef<'a> {
    Token(TokenIdx, &'a Token),
    Node(NodeRef<'a>),
}

/// Borrowed view of a node with access to its tokens
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    tokens: &'a [Token],
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'a Node {
        self.arena.get(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    pub fn span(&self) -> Span {
        self.node().span
    }

    pub fn expr_kind(&self) -> Option<ExprKind> {
        match self.kind() {
            NodeKind::Expression(kind) => Some(kind),
            NodeKind::Statement(_) => None,
        }
    }

    pub fn is(
        &self,
        kind: ExprKind,
    ) -> bool {
        self.expr_kind() == Some(kind)
    }

    pub fn children(&self) -> impl Iterator<Item = ChildRef<'a>> + 'a {
        let arena = self.arena;
        let tokens = self.tokens;
        self.node().children.iter().map(move |child| match *child {
            Child::Token(idx) => ChildRef::Token(idx, &tokens[idx.index()]),
            Child::Node(id) => ChildRef::Node(NodeRef { arena, tokens, id }),
        })
    }

    /// Direct child expressions
    pub fn expressions(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter_map(|child| match child {
            ChildRef::Node(node) => Some(node),
            ChildRef::Token(..) => None,
        })
    }

    /// Direct child tokens
    pub fn direct_tokens(&self) -> impl Iterator<Item = &'a Token> + 'a {
        self.children().filter_map(|child| match child {
            ChildRef::Token(_, token) => Some(token),
            ChildRef::Node(_) => None,
        })
    }

    pub fn find_direct_expression(
        &self,
        kind: ExprKind,
    ) -> Option<NodeRef<'a>> {
        self.expressions().find(|e| e.is(kind))
    }

    pub fn find_direct_expressions(
        &self,
        kind: ExprKind,
    ) -> Vec<NodeRef<'a>> {
        self.expressions().filter(|e| e.is(kind)).collect()
    }

    /// First descendant of `kind` in pre-order
    pub fn find_first_expression(
        &self,
        kind: ExprKind,
    ) -> Option<NodeRef<'a>> {
        for child in self.expressions() {
            if child.is(kind) {
                return Some(child);
            }
            if let Some(found) = child.find_first_expression(kind) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant of `kind`, nested ones included, in pre-order
    pub fn find_all_expressions(
        &self,
        kind: ExprKind,
    ) -> Vec<NodeRef<'a>> {
        let mut found = Vec::new();
        self.collect_expressions(kind, &mut found);
        found
    }

    fn collect_expressions(
        &self,
        kind: ExprKind,
        found: &mut Vec<NodeRef<'a>>,
    ) {
        for child in self.expressions() {
            if child.is(kind) {
                found.push(child);
            }
            child.collect_expressions(kind, found);
        }
    }

    /// Direct token with the given text, case-insensitive
    pub fn find_direct_token_by_text(
        &self,
        text: &str,
    ) -> Option<&'a Token> {
        self.direct_tokens().find(|t| t.is(text))
    }

    /// All tokens below this node, in source order
    pub fn tokens(&self) -> Vec<&'a Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(
        &self,
        out: &mut Vec<&'a Token>,
    ) {
        for child in self.children() {
            match child {
                ChildRef::Token(_, token) => out.push(token),
                ChildRef::Node(node) => node.collect_tokens(out),
            }
        }
    }

    pub fn first_token(&self) -> Option<&'a Token> {
        match self.children().next()? {
            ChildRef::Token(_, token) => Some(token),
            ChildRef::Node(node) => node.first_token(),
        }
    }

    pub fn last_token(&self) -> Option<&'a Token> {
        let last = *self.node().children.last()?;
        match last {
            Child::Token(idx) => Some(&self.tokens[idx.index()]),
            Child::Node(id) => self.arena.view(self.tokens, id).last_token(),
        }
    }

    /// Token texts joined with the spacing they had in the source.
    /// Tokens on different lines are separated by one space.
    pub fn concat_tokens(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&Token> = None;
        for token in self.tokens() {
            if let Some(prev) = prev {
                if prev.end().line == token.start().line {
                    let gap = token.start().column.saturating_sub(prev.end().column);
                    out.extend(std::iter::repeat(' ').take(gap));
                } else {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
            prev = Some(token);
        }
        out
    }

    /// Upper-cased text of the tokens without spacing, handy for names such as `zcl_foo=>bar`
    pub fn concat_upper(&self) -> String {
        self.tokens()
            .iter()
            .map(|t| t.text.to_ascii_uppercase())
            .collect()
    }
}
