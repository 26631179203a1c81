//! Combinator tests
//!
//! 用一个很小的表达式文法驱动 Matcher，覆盖：
//! - 关键字与 token 匹配
//! - 有序选择、优先选择、可选与重复
//! - 排列 (per)、except、版本门控与首词集合

use std::collections::{BTreeSet, HashMap};

use crate::frontend::core::combi::*;
use crate::frontend::core::lexer::{tokenize, TokenIdx, TokenKind};
use crate::frontend::core::parser::kinds::ExprKind as E;
use crate::frontend::version::Version;

struct ToyGrammar(HashMap<E, Combinator>);

impl ToyGrammar {
    fn new() -> Self {
        let mut rules = HashMap::new();
        rules.insert(E::Field, regex("[a-z_][a-z_0-9]*"));
        rules.insert(E::Integer, regex(r"\d+"));
        rules.insert(
            E::Source,
            alt![seq![E::Source, tok(TokenKind::Plus), E::Field], E::Field],
        );
        Self(rules)
    }
}

impl ExprGrammar for ToyGrammar {
    fn expression(
        &self,
        kind: E,
    ) -> &Combinator {
        &self.0[&kind]
    }
}

fn run(
    combinator: &Combinator,
    source: &str,
) -> Option<Vec<MatchNode>> {
    let grammar = ToyGrammar::new();
    let tokens = tokenize("test.abap", source, Version::V757).tokens;
    let input: Vec<TokenIdx> = (0..tokens.len()).map(TokenIdx::new).collect();
    Matcher::new(&grammar, &tokens, &input).match_all(combinator)
}

fn prefixes(
    combinator: &Combinator,
    source: &str,
) -> Vec<usize> {
    let grammar = ToyGrammar::new();
    let tokens = tokenize("test.abap", source, Version::V757).tokens;
    let input: Vec<TokenIdx> = (0..tokens.len()).map(TokenIdx::new).collect();
    Matcher::new(&grammar, &tokens, &input).prefixes(combinator)
}

// ============================================================================
// 关键字与 token
// ============================================================================

#[test]
fn test_word_is_case_insensitive() {
    assert!(run(&word("WRITE"), "write").is_some());
    assert!(run(&word("write"), "WRITE").is_some());
    assert!(run(&word("WRITE"), "writer").is_none());
}

#[test]
fn test_word_splits_on_whitespace() {
    assert!(run(&word("OF STRUCTURE"), "of structure").is_some());
    assert!(run(&word("OF STRUCTURE"), "of").is_none());
}

#[test]
fn test_word_splits_hyphenated_keyword() {
    let keyword = word("FIELD-SYMBOLS");
    assert!(matches!(&keyword, Combinator::Seq(parts) if parts.len() == 3));
    assert!(run(&keyword, "FIELD-SYMBOLS").is_some());
    assert!(run(&keyword, "FIELD - SYMBOLS").is_none());
}

#[test]
fn test_regex_only_matches_identifiers() {
    assert!(run(&regex("x"), "x").is_some());
    assert!(run(&regex("x"), "X").is_some());
    assert!(run(&regex(".*"), "'x'").is_none());
}

#[test]
fn test_token_whitespace_flags() {
    let component = seq![
        E::Field,
        tok_ws(TokenKind::Dash, Some(false), Some(false)),
        E::Field
    ];
    assert!(run(&component, "a-b").is_some());
    assert!(run(&component, "a - b").is_none());

    let minus = seq![
        E::Field,
        tok_ws(TokenKind::Dash, Some(true), Some(true)),
        E::Field
    ];
    assert!(run(&minus, "a - b").is_some());
    assert!(run(&minus, "a-b").is_none());
}

#[test]
fn test_expression_node_wraps_tokens() {
    let children = run(&expr(E::Field), "a").unwrap();
    assert_eq!(children.len(), 1);
    match &children[0] {
        MatchNode::Expr(kind, inner) => {
            assert_eq!(*kind, E::Field);
            assert_eq!(inner.as_ref(), &[MatchNode::Token(TokenIdx::new(0))]);
        }
        other => panic!("expected expression node, got {:?}", other),
    }
}

// ============================================================================
// 选择与重复
// ============================================================================

#[test]
fn test_alt_first_listed_wins() {
    let keyword_first = alt![seq!["a", E::Field], seq![E::Field, E::Field]];
    let children = run(&keyword_first, "a b").unwrap();
    assert_eq!(children[0], MatchNode::Token(TokenIdx::new(0)));

    let field_first = alt![seq![E::Field, E::Field], seq!["a", E::Field]];
    let children = run(&field_first, "a b").unwrap();
    assert!(matches!(children[0], MatchNode::Expr(E::Field, _)));
}

#[test]
fn test_alt_keeps_every_alternative() {
    assert!(run(&alt!["a", seq!["a", "b"]], "a b").is_some());
}

#[test]
fn test_alt_prio_commits_to_first_success() {
    assert!(run(&alt_prio!["a", seq!["a", "b"]], "a b").is_none());
    assert!(run(&alt_prio![seq!["a", "b"], "a"], "a b").is_some());
}

#[test]
fn test_opt_prio_commits_to_match() {
    assert!(run(&seq![opt("a"), "a"], "a").is_some());
    assert!(run(&seq![opt_prio("a"), "a"], "a").is_none());
}

#[test]
fn test_star_prefers_deepest() {
    assert_eq!(prefixes(&star("a"), "a a a"), vec![3, 2, 1, 0]);
}

#[test]
fn test_plus_requires_one_iteration() {
    assert!(prefixes(&plus("a"), "b").is_empty());
    assert_eq!(prefixes(&plus("a"), "a a"), vec![2, 1]);
}

#[test]
fn test_left_recursion_terminates() {
    assert!(run(&expr(E::Source), "a").is_some());
}

// ============================================================================
// per / except
// ============================================================================

#[test]
fn test_per_accepts_any_order() {
    let options = per!["a", "b", opt("c")];
    assert!(run(&options, "a b").is_some());
    assert!(run(&options, "b a").is_some());
    assert!(run(&options, "c a b").is_some());
}

#[test]
fn test_per_requires_mandatory_elements() {
    let options = per!["a", "b", opt("c")];
    assert!(run(&options, "a c").is_none());
}

#[test]
fn test_per_uses_each_element_once() {
    let options = per!["a", "b", opt("c")];
    assert!(run(&options, "a a b").is_none());
}

#[test]
fn test_except_leaves_keyword_to_follower() {
    let guarded = seq![
        plus(except(&["USING"], E::Field)),
        opt(seq!["USING", E::Field])
    ];
    let children = run(&guarded, "p q using r").unwrap();
    assert_eq!(children.len(), 4);
    assert_eq!(children[2], MatchNode::Token(TokenIdx::new(2)));

    let greedy = seq![plus(E::Field), opt(seq!["USING", E::Field])];
    let children = run(&greedy, "p q using r").unwrap();
    assert!(children
        .iter()
        .all(|child| matches!(child, MatchNode::Expr(E::Field, _))));
}

// ============================================================================
// 版本门控
// ============================================================================

#[test]
fn test_resolve_removes_gate() {
    let gated = ver(Version::V740sp02, "x");
    assert!(matches!(gated.clone().resolve(Version::V702), Combinator::Fail));
    assert!(matches!(gated.resolve(Version::V750), Combinator::Word(_)));
}

#[test]
fn test_resolve_negated_gate() {
    let legacy = ver_not(Version::V740sp02, "x");
    assert!(matches!(legacy.clone().resolve(Version::V702), Combinator::Word(_)));
    assert!(matches!(legacy.resolve(Version::V757), Combinator::Fail));
}

#[test]
fn test_resolve_propagates_failure() {
    let sequence = seq!["a", ver(Version::V757, "b")];
    assert!(matches!(sequence.resolve(Version::V750), Combinator::Fail));

    let choice = alt!["a", ver(Version::V757, "b")];
    assert!(matches!(choice.resolve(Version::V750), Combinator::Alt(items) if items.len() == 1));

    let repeated = plus(ver(Version::V757, "b"));
    assert!(matches!(repeated.resolve(Version::V750), Combinator::Fail));
}

#[test]
fn test_resolved_optional_gate_still_matches_skip() {
    let grammar = seq!["a", opt(ver(Version::V757, "b"))].resolve(Version::V750);
    assert!(run(&grammar, "a").is_some());
    assert!(run(&grammar, "a b").is_none());
}

// ============================================================================
// 首词集合
// ============================================================================

#[test]
fn test_first_set_through_optional_prefix() {
    let first = seq![opt("a"), "b", "c"].first_set();
    assert_eq!(first.words, BTreeSet::from(["A".to_string(), "B".to_string()]));
    assert!(!first.any);
    assert!(!first.nullable);
}

#[test]
fn test_first_set_expression_is_any() {
    let first = alt!["x", E::Field].first_set();
    assert!(first.any);
    assert!(first.words.contains("X"));
}

#[test]
fn test_first_set_nullable() {
    assert!(star("a").first_set().nullable);
    assert!(!plus("a").first_set().nullable);
}
