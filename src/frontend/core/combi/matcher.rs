//! Result-set matcher
//!
//! A match state is a token position plus the children collected so far. Each
//! combinator maps a list of states to a list of states; the list is kept in
//! preference order and never holds two states at the same position.

use std::collections::HashMap;
use std::rc::Rc;

use super::Combinator;
use crate::frontend::core::lexer::{Token, TokenIdx, TokenKind};
use crate::frontend::core::parser::kinds::ExprKind;

/// Supplies expression grammars by kind
pub trait ExprGrammar {
    fn expression(
        &self,
        kind: ExprKind,
    ) -> &Combinator;
}

/// Matched child: a token or a nested expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchNode {
    Token(TokenIdx),
    Expr(ExprKind, Rc<[MatchNode]>),
}

/// Persistent list of matched children, newest first
#[derive(Debug, Clone, Default)]
struct Trail(Option<Rc<TrailCell>>);

#[derive(Debug)]
struct TrailCell {
    node: MatchNode,
    prev: Trail,
}

impl Trail {
    fn push(
        &self,
        node: MatchNode,
    ) -> Trail {
        Trail(Some(Rc::new(TrailCell {
            node,
            prev: self.clone(),
        })))
    }

    fn to_vec(&self) -> Vec<MatchNode> {
        let mut nodes = Vec::new();
        let mut cursor = &self.0;
        while let Some(cell) = cursor {
            nodes.push(cell.node.clone());
            cursor = &cell.prev.0;
        }
        nodes.reverse();
        nodes
    }
}

type State = (usize, Trail);

type ExprResults = Rc<[(usize, Rc<[MatchNode]>)]>;

/// Matches grammars against the non-trivia tokens of one statement
pub struct Matcher<'a, G: ExprGrammar + ?Sized> {
    grammar: &'a G,
    tokens: &'a [Token],
    input: &'a [TokenIdx],
    memo: HashMap<(ExprKind, usize), ExprResults>,
}

impl<'a, G: ExprGrammar + ?Sized> Matcher<'a, G> {
    /// `input` indexes into `tokens`
    pub fn new(
        grammar: &'a G,
        tokens: &'a [Token],
        input: &'a [TokenIdx],
    ) -> Self {
        Self {
            grammar,
            tokens,
            input,
            memo: HashMap::new(),
        }
    }

    /// Children of the first parse that consumes the whole input
    pub fn match_all(
        &mut self,
        combinator: &Combinator,
    ) -> Option<Vec<MatchNode>> {
        let states = self.run(combinator, vec![(0, Trail::default())]);
        states
            .into_iter()
            .find(|(pos, _)| *pos == self.input.len())
            .map(|(_, trail)| trail.to_vec())
    }

    /// End positions reachable from the start, in preference order
    pub fn prefixes(
        &mut self,
        combinator: &Combinator,
    ) -> Vec<usize> {
        self.run(combinator, vec![(0, Trail::default())])
            .into_iter()
            .map(|(pos, _)| pos)
            .collect()
    }

    fn token(
        &self,
        pos: usize,
    ) -> Option<(TokenIdx, &'a Token)> {
        let idx = *self.input.get(pos)?;
        Some((idx, &self.tokens[idx.index()]))
    }

    fn run(
        &mut self,
        combinator: &Combinator,
        states: Vec<State>,
    ) -> Vec<State> {
        if states.is_empty() {
            return states;
        }
        match combinator {
            Combinator::Word(text) => self.step(states, |token| token.is(text)),
            Combinator::Token {
                kind,
                ws_before,
                ws_after,
            } => self.step(states, |token| {
                token.kind == *kind
                    && ws_before.map_or(true, |ws| token.ws_before == ws)
                    && ws_after.map_or(true, |ws| token.ws_after == ws)
            }),
            Combinator::Regex(re) => self.step(states, |token| {
                token.kind == TokenKind::Identifier && re.is_match(&token.text)
            }),
            Combinator::Seq(items) => {
                let mut states = states;
                for item in items {
                    states = self.run(item, states);
                    if states.is_empty() {
                        break;
                    }
                }
                states
            }
            Combinator::Alt(items) => {
                let mut out = Vec::new();
                for state in states {
                    for item in items {
                        out.extend(self.run(item, vec![state.clone()]));
                    }
                }
                self.dedup(out)
            }
            Combinator::AltPrio(items) => {
                let mut out = Vec::new();
                for state in states {
                    for item in items {
                        let found = self.run(item, vec![state.clone()]);
                        if !found.is_empty() {
                            out.extend(found);
                            break;
                        }
                    }
                }
                self.dedup(out)
            }
            Combinator::Opt(inner) => {
                let mut out = Vec::new();
                for state in states {
                    out.extend(self.run(inner, vec![state.clone()]));
                    out.push(state);
                }
                self.dedup(out)
            }
            Combinator::OptPrio(inner) => {
                let mut out = Vec::new();
                for state in states {
                    let found = self.run(inner, vec![state.clone()]);
                    if found.is_empty() {
                        out.push(state);
                    } else {
                        out.extend(found);
                    }
                }
                self.dedup(out)
            }
            Combinator::Star(inner) => self.repeat(inner, states),
            Combinator::Plus(inner) => {
                let first = self.advance(inner, states);
                self.repeat(inner, first)
            }
            Combinator::Per(items) => self.permutation(items, states),
            Combinator::Expr(kind) => {
                let mut out = Vec::new();
                for (pos, trail) in states {
                    for (end, children) in self.expression(*kind, pos).iter() {
                        out.push((
                            *end,
                            trail.push(MatchNode::Expr(*kind, Rc::clone(children))),
                        ));
                    }
                }
                self.dedup(out)
            }
            Combinator::Except { words, inner } => {
                let allowed: Vec<State> = states
                    .into_iter()
                    .filter(|(pos, _)| {
                        self.token(*pos)
                            .map_or(true, |(_, token)| !words.iter().any(|w| token.is(w)))
                    })
                    .collect();
                self.run(inner, allowed)
            }
            Combinator::Ver { .. } => {
                unreachable!("version gates are resolved when the grammar table is built")
            }
            Combinator::Fail => Vec::new(),
        }
    }

    /// Consume one token when `accept` holds
    fn step(
        &self,
        states: Vec<State>,
        accept: impl Fn(&Token) -> bool,
    ) -> Vec<State> {
        states
            .into_iter()
            .filter_map(|(pos, trail)| {
                let (idx, token) = self.token(pos)?;
                accept(token).then(|| (pos + 1, trail.push(MatchNode::Token(idx))))
            })
            .collect()
    }

    /// Results of `inner` that consumed at least one token
    fn advance(
        &mut self,
        inner: &Combinator,
        states: Vec<State>,
    ) -> Vec<State> {
        let mut out = Vec::new();
        for state in states {
            let start = state.0;
            out.extend(
                self.run(inner, vec![state])
                    .into_iter()
                    .filter(|(pos, _)| *pos > start),
            );
        }
        self.dedup(out)
    }

    /// Zero or more advancing iterations, deepest first
    fn repeat(
        &mut self,
        inner: &Combinator,
        states: Vec<State>,
    ) -> Vec<State> {
        let mut levels = vec![states];
        loop {
            let Some(last) = levels.last() else { break };
            let next = self.advance(inner, last.clone());
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }
        let out = levels.into_iter().rev().flatten().collect();
        self.dedup(out)
    }

    /// Every required element once, optional ones at most once, any order
    fn permutation(
        &mut self,
        items: &[Combinator],
        states: Vec<State>,
    ) -> Vec<State> {
        assert!(items.len() < 32, "permutation grammar too wide");
        let required: u32 = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_optional())
            .fold(0, |mask, (i, _)| mask | (1 << i));

        let mut frontier: Vec<(State, u32)> = states.into_iter().map(|s| (s, 0)).collect();
        let mut done: Vec<(State, u32)> = Vec::new();
        while !frontier.is_empty() {
            let mut next: Vec<(State, u32)> = Vec::new();
            for (state, mask) in frontier {
                for (i, item) in items.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        continue;
                    }
                    for found in self.advance(item, vec![state.clone()]) {
                        let mask = mask | (1 << i);
                        if !next.iter().any(|((p, _), m)| *p == found.0 && *m == mask) {
                            next.push((found, mask));
                        }
                    }
                }
            }
            done.extend(
                next.iter()
                    .filter(|(_, mask)| mask & required == required)
                    .cloned(),
            );
            frontier = next;
        }

        done.sort_by_key(|(_, mask)| std::cmp::Reverse(mask.count_ones()));
        let out = done.into_iter().map(|(state, _)| state).collect();
        self.dedup(out)
    }

    fn expression(
        &mut self,
        kind: ExprKind,
        pos: usize,
    ) -> ExprResults {
        if let Some(found) = self.memo.get(&(kind, pos)) {
            return Rc::clone(found);
        }
        // guards against left recursion
        self.memo.insert((kind, pos), Rc::from(Vec::new()));

        let grammar: &'a G = self.grammar;
        let combinator = grammar.expression(kind);
        let states = self.run(combinator, vec![(pos, Trail::default())]);
        let results: ExprResults = states
            .into_iter()
            .filter(|(end, _)| *end > pos)
            .map(|(end, trail)| (end, Rc::from(trail.to_vec())))
            .collect::<Vec<_>>()
            .into();

        self.memo.insert((kind, pos), Rc::clone(&results));
        results
    }

    /// Keep the first state for every position
    fn dedup(
        &self,
        states: Vec<State>,
    ) -> Vec<State> {
        let mut seen = vec![false; self.input.len() + 1];
        states
            .into_iter()
            .filter(|(pos, _)| !std::mem::replace(&mut seen[*pos], true))
            .collect()
    }
}
