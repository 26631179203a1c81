//! Structure builder
//!
//! Groups the flat statement list into nested blocks (`IF … ENDIF`,
//! `LOOP … ENDLOOP`, `CLASS … ENDCLASS`, …). Malformed nesting never aborts the
//! build: stray closers and misplaced intermediates stay in the tree as plain
//! statements, open blocks at end of file are closed implicitly, and each case
//! is reported as a structural diagnostic.

mod builder;
#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::build_structure;

use crate::frontend::core::parser::{Statement, StatementKind};
use crate::util::diagnostic::DiagnosticCollector;
use crate::util::span::Span;

/// Block kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Root of every file
    Program,
    If,
    Case,
    Do,
    While,
    Loop,
    Try,
    ClassDefinition,
    ClassImplementation,
    Interface,
    Method,
    Form,
    TypesBegin,
    DataBegin,
    ConstantsBegin,
}

impl BlockKind {
    /// Block opened by a statement of `kind`
    pub fn opened_by(kind: StatementKind) -> Option<BlockKind> {
        use StatementKind as S;
        let block = match kind {
            S::If => BlockKind::If,
            S::Case => BlockKind::Case,
            S::Do => BlockKind::Do,
            S::While => BlockKind::While,
            S::Loop => BlockKind::Loop,
            S::Try => BlockKind::Try,
            S::ClassDefinition => BlockKind::ClassDefinition,
            S::ClassImplementation => BlockKind::ClassImplementation,
            S::Interface => BlockKind::Interface,
            S::MethodImplementation => BlockKind::Method,
            S::Form => BlockKind::Form,
            S::TypeBegin => BlockKind::TypesBegin,
            S::DataBegin => BlockKind::DataBegin,
            S::ConstantBegin => BlockKind::ConstantsBegin,
            _ => return None,
        };
        Some(block)
    }

    /// Statement kind that closes this block
    pub fn closer(self) -> Option<StatementKind> {
        use StatementKind as S;
        match self {
            BlockKind::Program => None,
            BlockKind::If => Some(S::EndIf),
            BlockKind::Case => Some(S::EndCase),
            BlockKind::Do => Some(S::EndDo),
            BlockKind::While => Some(S::EndWhile),
            BlockKind::Loop => Some(S::EndLoop),
            BlockKind::Try => Some(S::EndTry),
            BlockKind::ClassDefinition | BlockKind::ClassImplementation => Some(S::EndClass),
            BlockKind::Interface => Some(S::EndInterface),
            BlockKind::Method => Some(S::EndMethod),
            BlockKind::Form => Some(S::EndForm),
            BlockKind::TypesBegin => Some(S::TypeEnd),
            BlockKind::DataBegin => Some(S::DataEnd),
            BlockKind::ConstantsBegin => Some(S::ConstantEnd),
        }
    }

    /// Keyword expected to end the block, for messages
    pub fn closing_keyword(self) -> &'static str {
        match self {
            BlockKind::Program => "end of file",
            BlockKind::If => "ENDIF",
            BlockKind::Case => "ENDCASE",
            BlockKind::Do => "ENDDO",
            BlockKind::While => "ENDWHILE",
            BlockKind::Loop => "ENDLOOP",
            BlockKind::Try => "ENDTRY",
            BlockKind::ClassDefinition | BlockKind::ClassImplementation => "ENDCLASS",
            BlockKind::Interface => "ENDINTERFACE",
            BlockKind::Method => "ENDMETHOD",
            BlockKind::Form => "ENDFORM",
            BlockKind::TypesBegin => "TYPES END OF",
            BlockKind::DataBegin => "DATA END OF",
            BlockKind::ConstantsBegin => "CONSTANTS END OF",
        }
    }

    /// Whether `kind` is an intermediate statement allowed directly in this block
    pub fn accepts_intermediate(
        self,
        kind: StatementKind,
    ) -> bool {
        use StatementKind as S;
        matches!(
            (self, kind),
            (BlockKind::If, S::ElseIf | S::Else)
                | (BlockKind::Case, S::When)
                | (BlockKind::Try, S::Catch | S::Cleanup)
        )
    }
}

/// `ELSEIF`, `ELSE`, `WHEN`, `CATCH`, `CLEANUP`
pub fn is_intermediate(kind: StatementKind) -> bool {
    use StatementKind as S;
    matches!(kind, S::ElseIf | S::Else | S::When | S::Catch | S::Cleanup)
}

/// Statement kinds that close some block
pub fn is_closer(kind: StatementKind) -> bool {
    use StatementKind as S;
    matches!(
        kind,
        S::EndIf
            | S::EndCase
            | S::EndDo
            | S::EndWhile
            | S::EndLoop
            | S::EndTry
            | S::EndClass
            | S::EndInterface
            | S::EndMethod
            | S::EndForm
            | S::TypeEnd
            | S::DataEnd
            | S::ConstantEnd
    )
}

impl fmt::Display for BlockKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            BlockKind::Program => "program",
            BlockKind::If => "IF",
            BlockKind::Case => "CASE",
            BlockKind::Do => "DO",
            BlockKind::While => "WHILE",
            BlockKind::Loop => "LOOP",
            BlockKind::Try => "TRY",
            BlockKind::ClassDefinition => "CLASS DEFINITION",
            BlockKind::ClassImplementation => "CLASS IMPLEMENTATION",
            BlockKind::Interface => "INTERFACE",
            BlockKind::Method => "METHOD",
            BlockKind::Form => "FORM",
            BlockKind::TypesBegin => "TYPES BEGIN OF",
            BlockKind::DataBegin => "DATA BEGIN OF",
            BlockKind::ConstantsBegin => "CONSTANTS BEGIN OF",
        };
        write!(f, "{}", name)
    }
}

/// Child of a structure: a statement (index into the file's statement list) or a nested block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureChild {
    Statement(usize),
    Structure(StructureNode),
}

/// A block of statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    kind: BlockKind,
    opener: Option<usize>,
    closer: Option<usize>,
    children: Vec<StructureChild>,
    span: Span,
}

impl StructureNode {
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Index of the opening statement; `None` for the program root
    pub fn opener(&self) -> Option<usize> {
        self.opener
    }

    /// Index of the closing statement; `None` when the block is unterminated
    pub fn closer(&self) -> Option<usize> {
        self.closer
    }

    /// Body between opener and closer
    pub fn children(&self) -> &[StructureChild] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_terminated(&self) -> bool {
        self.kind == BlockKind::Program || self.closer.is_some()
    }

    /// Number of statements between opener and closer, nested blocks included
    pub fn statement_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                StructureChild::Statement(_) => 1,
                StructureChild::Structure(node) => node.statements().len(),
            })
            .sum()
    }

    /// Every statement index of this block in source order, opener and closer included
    pub fn statements(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_statements(&mut out);
        out
    }

    fn collect_statements(
        &self,
        out: &mut Vec<usize>,
    ) {
        out.extend(self.opener);
        for child in &self.children {
            match child {
                StructureChild::Statement(index) => out.push(*index),
                StructureChild::Structure(node) => node.collect_statements(out),
            }
        }
        out.extend(self.closer);
    }

    /// Directly nested blocks
    pub fn structures(&self) -> impl Iterator<Item = &StructureNode> {
        self.children.iter().filter_map(|child| match child {
            StructureChild::Structure(node) => Some(node),
            StructureChild::Statement(_) => None,
        })
    }

    /// Every nested block of `kind` in pre-order, not including `self`
    pub fn find_all_structures(
        &self,
        kind: BlockKind,
    ) -> Vec<&StructureNode> {
        let mut found = Vec::new();
        self.collect_structures(kind, &mut found);
        found
    }

    fn collect_structures<'a>(
        &'a self,
        kind: BlockKind,
        found: &mut Vec<&'a StructureNode>,
    ) {
        for node in self.structures() {
            if node.kind == kind {
                found.push(node);
            }
            node.collect_structures(kind, found);
        }
    }

    pub fn find_first_structure(
        &self,
        kind: BlockKind,
    ) -> Option<&StructureNode> {
        for node in self.structures() {
            if node.kind == kind {
                return Some(node);
            }
            if let Some(found) = node.find_first_structure(kind) {
                return Some(found);
            }
        }
        None
    }

    /// Innermost block whose span contains `statement`
    pub fn enclosing(
        &self,
        statement: usize,
    ) -> Option<&StructureNode> {
        if !self.statements().contains(&statement) {
            return None;
        }
        self.structures()
            .find_map(|node| node.enclosing(statement))
            .or(Some(self))
    }
}

/// Block tree of one file
#[derive(Debug)]
pub struct StructureOutput {
    pub root: StructureNode,
    pub diagnostics: DiagnosticCollector,
}

/// Span covering the given statements
fn statements_span(
    statements: &[Statement],
    first: Option<usize>,
    last: Option<usize>,
) -> Span {
    match (first, last) {
        (Some(first), Some(last)) => statements[first].span.merge(&statements[last].span),
        (Some(only), None) | (None, Some(only)) => statements[only].span,
        (None, None) => Span::dummy(),
    }
}
