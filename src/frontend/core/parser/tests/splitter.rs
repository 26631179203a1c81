//! 语句切分测试

use super::{kinds, parse};
use crate::frontend::core::lexer::{tokenize, Token, TokenKind};
use crate::frontend::core::parser::{split_statements, RawKind, RawStatement, StatementKind};
use crate::frontend::version::Version;
use crate::util::diagnostic::DiagnosticCode;

fn split(source: &str) -> (Vec<Token>, Vec<RawStatement>) {
    let tokens = tokenize("test.abap", source, Version::V757).tokens;
    let raw = split_statements(&tokens);
    (tokens, raw)
}

// ============================================================================
// 链式语句
// ============================================================================

#[test]
fn test_chain_repeats_prefix() {
    let (tokens, raw) = split("DATA: a TYPE i, b TYPE c.");
    assert_eq!(raw.len(), 2);
    for statement in &raw {
        assert_eq!(statement.kind, RawKind::Normal);
        assert!(tokens[statement.tokens[0].index()].is("DATA"));
        assert!(statement.colon.is_some());
    }
    assert_eq!(tokens[raw[1].tokens[1].index()].text, "b");

    let comma = raw[0].terminator.unwrap();
    assert_eq!(tokens[comma.index()].kind, TokenKind::Comma);
    let period = raw[1].terminator.unwrap();
    assert_eq!(tokens[period.index()].kind, TokenKind::Period);
}

#[test]
fn test_chain_is_recognized_per_element() {
    assert_eq!(kinds("CLEAR: a, b."), vec![StatementKind::Clear, StatementKind::Clear]);
    assert_eq!(
        kinds("TYPES: BEGIN OF ty_s, a TYPE i, END OF ty_s."),
        vec![StatementKind::TypeBegin, StatementKind::Types, StatementKind::TypeEnd]
    );
}

#[test]
fn test_chain_ends_at_period() {
    let (tokens, raw) = split("WRITE: a, b. CLEAR c.");
    assert_eq!(raw.len(), 3);
    assert!(raw[2].colon.is_none());
    assert!(tokens[raw[2].tokens[0].index()].is("CLEAR"));
}

#[test]
fn test_comma_inside_parentheses_does_not_split() {
    let (_, raw) = split("WRITE: meth( a, b ).");
    assert_eq!(raw.len(), 1);
}

// ============================================================================
// 注释与 pragma
// ============================================================================

#[test]
fn test_comments_become_statements() {
    let (_, raw) = split("* full line\nWRITE x. \" trailing\n");
    let found: Vec<RawKind> = raw.iter().map(|s| s.kind).collect();
    assert_eq!(found, vec![RawKind::Comment, RawKind::Normal, RawKind::Comment]);
}

#[test]
fn test_comment_inside_statement_follows_it() {
    let (_, raw) = split("WRITE \" inside\n  x.");
    let found: Vec<RawKind> = raw.iter().map(|s| s.kind).collect();
    assert_eq!(found, vec![RawKind::Normal, RawKind::Comment]);
    assert_eq!(raw[0].tokens.len(), 2);
}

#[test]
fn test_pragma_attaches_to_statement() {
    let parsed = parse("DATA x TYPE i ##NEEDED.");
    assert_eq!(parsed.kinds(), vec![StatementKind::Data]);
    let statement = &parsed.output.statements[0];
    assert_eq!(statement.pragmas.len(), 1);
    assert_eq!(parsed.tokens[statement.pragmas[0].index()].text, "##NEEDED");
}

// ============================================================================
// 边界情况
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(split("").1.is_empty());
    assert!(kinds("   \n\n").is_empty());
}

#[test]
fn test_lone_period_is_empty_statement() {
    assert_eq!(kinds("."), vec![StatementKind::Empty]);
    assert_eq!(
        kinds("WRITE x.."),
        vec![StatementKind::Write, StatementKind::Empty]
    );
}

#[test]
fn test_missing_period_still_recognized() {
    let parsed = parse("WRITE x");
    assert_eq!(parsed.kinds(), vec![StatementKind::Write]);
    let diagnostics = parsed.output.diagnostics.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::MissingPeriod);
}

#[test]
fn test_unbalanced_parenthesis_stops_at_period() {
    let (_, raw) = split("x = meth( .\ny = 1.");
    assert_eq!(raw.len(), 2);
    assert_eq!(kinds("x = meth( .\ny = 1.")[1], StatementKind::Move);
}
