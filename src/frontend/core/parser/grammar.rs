//! Per-version grammar tables
//!
//! Version gates are resolved once per [`Version`]; the resulting table is
//! immutable and shared by every file parsed for that version.

use std::collections::HashMap;

use once_cell::sync::{Lazy, OnceCell};

use super::expressions::expression;
use super::kinds::{ExprKind, StatementKind};
use super::statements;
use crate::frontend::core::combi::{Combinator, ExprGrammar, MatchNode, Matcher};
use crate::frontend::core::lexer::{Token, TokenIdx};
use crate::frontend::version::Version;

static TABLES: Lazy<Vec<OnceCell<GrammarTable>>> =
    Lazy::new(|| Version::ALL.iter().map(|_| OnceCell::new()).collect());

/// Expression and statement grammars for one language version
#[derive(Debug)]
pub struct GrammarTable {
    version: Version,
    expressions: Vec<Combinator>,
    statements: Vec<(StatementKind, Combinator)>,
    /// Statements by upper-cased first keyword
    by_word: HashMap<String, Vec<usize>>,
    /// Statements that can start with any token
    any: Vec<usize>,
}

impl ExprGrammar for GrammarTable {
    fn expression(
        &self,
        kind: ExprKind,
    ) -> &Combinator {
        &self.expressions[kind.index()]
    }
}

impl GrammarTable {
    /// Shared table for `version`, built on first use
    pub fn for_version(version: Version) -> &'static GrammarTable {
        TABLES[version.index()].get_or_init(|| GrammarTable::build(version))
    }

    pub fn build(version: Version) -> Self {
        let expressions = ExprKind::ALL
            .iter()
            .map(|kind| expression(*kind).resolve(version))
            .collect();

        let statements: Vec<(StatementKind, Combinator)> = statements::all()
            .into_iter()
            .map(|(kind, grammar)| (kind, grammar.resolve(version)))
            .filter(|(_, grammar)| !matches!(grammar, Combinator::Fail))
            .collect();

        let mut by_word: HashMap<String, Vec<usize>> = HashMap::new();
        let mut any = Vec::new();
        for (i, (_, grammar)) in statements.iter().enumerate() {
            let first = grammar.first_set();
            if first.any || first.nullable {
                any.push(i);
            }
            for word in first.words {
                by_word.entry(word).or_default().push(i);
            }
        }

        tracing::debug!(
            "built grammar table for {}: {} statements, {} keyword entries",
            version,
            statements.len(),
            by_word.len()
        );
        Self {
            version,
            expressions,
            statements,
            by_word,
            any,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Statement grammars worth trying for a statement starting with `first`,
    /// in registration order
    fn candidates(
        &self,
        first: &Token,
    ) -> Vec<usize> {
        let keyed = self
            .by_word
            .get(&first.upper())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut merged = Vec::with_capacity(keyed.len() + self.any.len());
        let (mut a, mut b) = (0, 0);
        while a < keyed.len() || b < self.any.len() {
            let next = match (keyed.get(a), self.any.get(b)) {
                (Some(&x), Some(&y)) if x == y => {
                    a += 1;
                    b += 1;
                    x
                }
                (Some(&x), Some(&y)) if x < y => {
                    a += 1;
                    x
                }
                (Some(&x), None) => {
                    a += 1;
                    x
                }
                (_, Some(&y)) => {
                    b += 1;
                    y
                }
                (None, None) => break,
            };
            merged.push(next);
        }
        merged
    }

    /// First statement grammar matching all of `input`
    pub fn recognize(
        &self,
        tokens: &[Token],
        input: &[TokenIdx],
    ) -> Option<(StatementKind, Vec<MatchNode>)> {
        let first = &tokens[input.first()?.index()];
        let mut matcher = Matcher::new(self, tokens, input);
        for i in self.candidates(first) {
            let (kind, grammar) = &self.statements[i];
            if let Some(children) = matcher.match_all(grammar) {
                return Some((*kind, children));
            }
        }
        None
    }
}
