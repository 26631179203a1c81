//! Stack-based block builder

use super::{
    is_closer, is_intermediate, statements_span, BlockKind, StructureChild, StructureNode,
    StructureOutput,
};
use crate::frontend::core::parser::Statement;
use crate::util::diagnostic::{DiagnosticCode, DiagnosticCollector};
use crate::util::span::Span;

/// Open block on the builder stack
struct Frame {
    kind: BlockKind,
    opener: Option<usize>,
    children: Vec<StructureChild>,
}

impl Frame {
    fn new(
        kind: BlockKind,
        opener: Option<usize>,
    ) -> Self {
        Self {
            kind,
            opener,
            children: Vec::new(),
        }
    }

    fn last_statement(&self) -> Option<usize> {
        match self.children.last()? {
            StructureChild::Statement(index) => Some(*index),
            StructureChild::Structure(node) => node.statements().last().copied(),
        }
    }

    fn finish(
        self,
        statements: &[Statement],
        closer: Option<usize>,
    ) -> StructureNode {
        let first = self.opener.or_else(|| match self.children.first()? {
            StructureChild::Statement(index) => Some(*index),
            StructureChild::Structure(node) => node.statements().first().copied(),
        });
        let last = closer.or_else(|| self.last_statement());
        StructureNode {
            kind: self.kind,
            opener: self.opener,
            closer,
            span: statements_span(statements, first, last),
            children: self.children,
        }
    }
}

struct Builder<'a> {
    statements: &'a [Statement],
    /// Never empty: the program frame stays at the bottom
    stack: Vec<Frame>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Builder<'a> {
    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_statement(
        &mut self,
        index: usize,
    ) {
        self.top().children.push(StructureChild::Statement(index));
    }

    /// Pop the top block, closing it with `closer`
    fn close(
        &mut self,
        closer: Option<usize>,
    ) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let node = frame.finish(self.statements, closer);
            self.top().children.push(StructureChild::Structure(node));
        }
    }

    fn visit(
        &mut self,
        index: usize,
    ) {
        let statements = self.statements;
        let statement = &statements[index];
        let kind = statement.kind;

        if let Some(block) = BlockKind::opened_by(kind) {
            self.stack.push(Frame::new(block, Some(index)));
            return;
        }

        if is_closer(kind) {
            let top = self.top().kind;
            if top.closer() == Some(kind) {
                self.close(Some(index));
            } else {
                tracing::debug!("mismatched {} inside {}", kind, top);
                self.diagnostics.error(
                    DiagnosticCode::MismatchedCloser,
                    format!(
                        "{} does not close the open {} block, expected {}",
                        kind,
                        top,
                        top.closing_keyword()
                    ),
                    statement.span,
                );
                self.push_statement(index);
            }
            return;
        }

        if is_intermediate(kind) && !self.top().kind.accepts_intermediate(kind) {
            let top = self.top().kind;
            self.diagnostics.error(
                DiagnosticCode::MisplacedIntermediate,
                format!("{} is not allowed directly inside {}", kind, top),
                statement.span,
            );
        }
        self.push_statement(index);
    }

    fn finish(mut self) -> StructureOutput {
        while self.stack.len() > 1 {
            let frame = &self.stack[self.stack.len() - 1];
            let span = frame
                .opener
                .map(|opener| self.statements[opener].span)
                .unwrap_or_else(Span::dummy);
            tracing::debug!("unterminated {} block at {}", frame.kind, span.start);
            self.diagnostics.error(
                DiagnosticCode::UnterminatedBlock,
                format!(
                    "{} block is not terminated, expected {}",
                    frame.kind,
                    frame.kind.closing_keyword()
                ),
                span,
            );
            self.close(None);
        }

        let root = match self.stack.pop() {
            Some(frame) => frame.finish(self.statements, None),
            None => Frame::new(BlockKind::Program, None).finish(self.statements, None),
        };
        StructureOutput {
            root,
            diagnostics: self.diagnostics,
        }
    }
}

/// Nest `statements` into blocks under a program root
pub fn build_structure(
    filename: &str,
    statements: &[Statement],
) -> StructureOutput {
    let mut builder = Builder {
        statements,
        stack: vec![Frame::new(BlockKind::Program, None)],
        diagnostics: DiagnosticCollector::new(filename),
    };
    for index in 0..statements.len() {
        builder.visit(index);
    }
    let output = builder.finish();
    tracing::debug!(
        "built structure for {}: {} structural diagnostics",
        filename,
        output.diagnostics.len()
    );
    output
}
