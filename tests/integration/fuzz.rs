//! Fuzz tests for the frontend using proptest
//!
//! 任意输入都不能让词法、语句识别或结构构建崩溃；生成的合法程序必须无诊断

use abaplens::frontend::core::lexer::TokenKind;
use abaplens::frontend::core::parser::StatementKind;
use abaplens::frontend::syntax::EmptyDictionary;
use abaplens::util::diagnostic::DiagnosticCode;
use abaplens::{analyze, parse_file, AnalyzeConfig, SourceInput, Version};
use proptest::prelude::*;

/// Strategy for generating ABAP-looking words and punctuation
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}",
        "[0-9]{1,4}",
        Just("DATA".to_string()),
        Just("TYPE".to_string()),
        Just("IF".to_string()),
        Just("ENDIF".to_string()),
        Just("LOOP AT".to_string()),
        Just("ENDLOOP".to_string()),
        Just("CLASS".to_string()),
        Just("METHOD".to_string()),
        Just("ENDMETHOD".to_string()),
        Just("=".to_string()),
        Just("->".to_string()),
        Just("=>".to_string()),
        Just("-".to_string()),
        Just("( ".to_string()),
        Just(" )".to_string()),
        Just("(".to_string()),
        Just("'text'".to_string()),
        Just("`text`".to_string()),
        Just("|a{ x }b|".to_string()),
        Just("<fs>".to_string()),
        Just("\"comment\n".to_string()),
        Just("\n* star comment\n".to_string()),
        Just(":".to_string()),
        Just(",".to_string()),
        Just(".".to_string()),
        Just("##NEEDED".to_string()),
    ]
}

/// Strategy for generating token soup
fn soup_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..40).prop_map(|parts| parts.join(" "))
}

/// Elementary types that are assignable to each other
fn elementary_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("i"),
        Just("string"),
        Just("c LENGTH 10"),
        Just("p LENGTH 8 DECIMALS 2"),
        Just("f"),
        Just("n LENGTH 4"),
    ]
}

/// Strategy for generating a well-formed program: declarations, then moves
fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(elementary_strategy(), 1..8).prop_flat_map(|types| {
        let count = types.len();
        prop::collection::vec((0..count, 0..count), 0..12).prop_map(move |moves| {
            let mut source = String::from("REPORT zfuzz.\n");
            for (i, ty) in types.iter().enumerate() {
                source.push_str(&format!("DATA lv_var{} TYPE {}.\n", i, ty));
            }
            for (to, from) in moves {
                source.push_str(&format!("lv_var{} = lv_var{}.\n", to, from));
            }
            source
        })
    })
}

proptest! {
    /// Arbitrary printable text never panics the frontend
    #[test]
    fn test_fuzz_printable_text(source in "[ -~\n\t]{0,200}") {
        let parsed = parse_file("zfuzz.prog.abap", &source, Version::V757);
        for token in &parsed.tokens {
            prop_assert!(token.span.end.offset <= source.len());
        }
    }

    /// Token text always matches the source slice it covers
    #[test]
    fn test_fuzz_token_spans(source in soup_strategy()) {
        let parsed = parse_file("zfuzz.prog.abap", &source, Version::V757);
        let mut last_end = 0;
        for token in &parsed.tokens {
            prop_assert!(token.span.start.offset >= last_end);
            prop_assert_eq!(
                token.text.as_str(),
                &source[token.span.start.offset..token.span.end.offset]
            );
            last_end = token.span.end.offset;
        }
    }

    /// Every unknown statement yields exactly one parser error
    #[test]
    fn test_fuzz_unknown_statements(source in soup_strategy()) {
        let parsed = parse_file("zfuzz.prog.abap", &source, Version::V757);
        let unknown = parsed
            .statements
            .iter()
            .filter(|s| s.kind == StatementKind::Unknown)
            .count();
        let parser_errors = parsed
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::ParserError)
            .count();
        prop_assert_eq!(unknown, parser_errors);
    }

    /// Full analysis of token soup never panics, on every version
    #[test]
    fn test_fuzz_analyze_soup(source in soup_strategy(), old in any::<bool>()) {
        let version = if old { Version::V702 } else { Version::Cloud };
        let input = SourceInput::new("zfuzz.prog.abap", source).with_version(version);
        let analysis = analyze(
            vec![input],
            &AnalyzeConfig::default().with_parallel(false),
            &EmptyDictionary,
        );
        prop_assert_eq!(analysis.files.len(), 1);
    }

    /// Generated declarations and moves analyse cleanly
    #[test]
    fn test_fuzz_valid_programs(source in program_strategy()) {
        let analysis = analyze(
            vec![SourceInput::new("zfuzz.prog.abap", source.clone())],
            &AnalyzeConfig::default(),
            &EmptyDictionary,
        );
        let messages: Vec<String> = analysis.diagnostics().map(|d| d.message.clone()).collect();
        prop_assert!(messages.is_empty(), "{}\n{:?}", source, messages);

        let file = &analysis.files[0];
        let comments = file
            .parsed
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .count();
        prop_assert_eq!(comments, 0);
    }
}

/// Nested parentheses don't overflow the recognizer
#[test]
fn test_nested_parens_depth() {
    for depth in 1..30usize {
        let source = format!(
            "DATA lv_a TYPE i.\nlv_a = {}1{}.\n",
            "( ".repeat(depth),
            " )".repeat(depth)
        );
        let parsed = parse_file("zfuzz.prog.abap", &source, Version::V757);
        assert!(
            parsed.diagnostics.is_empty(),
            "depth {}: {:?}",
            depth,
            parsed.diagnostics
        );
    }
}

/// Long arithmetic chains stay linear
#[test]
fn test_long_arithmetic_chain() {
    let source = format!("DATA lv_a TYPE i.\nlv_a = {}1.\n", "1 + ".repeat(100));
    let parsed = parse_file("zfuzz.prog.abap", &source, Version::V757);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
}
