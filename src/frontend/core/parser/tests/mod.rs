//! Parser tests module
//!
//! - splitter: 语句切分（链式、注释、pragma、缺失句号）
//! - statements: 各类语句的识别
//! - ambiguity: 空白与顺序决定的歧义
//! - nodes: 节点导航与 token 还原
//! - versions: 版本门控

mod splitter;
mod statements;

use crate::frontend::core::lexer::{tokenize, Token};
use crate::frontend::core::parser::{parse_statements, NodeRef, ParseOutput, StatementKind};
use crate::frontend::version::Version;

pub(crate) struct Parsed {
    pub tokens: Vec<Token>,
    pub output: ParseOutput,
}

impl Parsed {
    pub fn kinds(&self) -> Vec<StatementKind> {
        self.output.statements.iter().map(|s| s.kind).collect()
    }

    /// Node of the `index`-th statement
    pub fn node(
        &self,
        index: usize,
    ) -> NodeRef<'_> {
        self.output
            .arena
            .view(&self.tokens, self.output.statements[index].node)
    }
}

pub(crate) fn parse_version(
    source: &str,
    version: Version,
) -> Parsed {
    let tokens = tokenize("test.abap", source, version).tokens;
    let output = parse_statements("test.abap", &tokens, version);
    Parsed { tokens, output }
}

pub(crate) fn parse(source: &str) -> Parsed {
    parse_version(source, Version::V757)
}

pub(crate) fn kinds(source: &str) -> Vec<StatementKind> {
    parse(source).kinds()
}

/// Source must be exactly one statement of `kind`
pub(crate) fn assert_kind(
    source: &str,
    kind: StatementKind,
) {
    let found = kinds(source);
    assert_eq!(found, vec![kind], "source: {}", source);
}
