//! End-to-end analysis tests
//!
//! 通过公开 API 走完整条流水线：多文件、诊断级别、版本覆盖与错误恢复

use abaplens::frontend::syntax::{EmptyDictionary, ScopeKind};
use abaplens::frontend::DiagLevel;
use abaplens::util::diagnostic::DiagnosticCode;
use abaplens::{analyze, AnalyzeConfig, SourceInput, Version};

const HELPER_CLASS: &str = "\
CLASS zcl_counter DEFINITION PUBLIC.
  PUBLIC SECTION.
    METHODS increment IMPORTING iv_step TYPE i RETURNING VALUE(rv_total) TYPE i.
  PRIVATE SECTION.
    DATA mv_total TYPE i.
ENDCLASS.
CLASS zcl_counter IMPLEMENTATION.
  METHOD increment.
    mv_total = mv_total + iv_step.
    rv_total = mv_total.
  ENDMETHOD.
ENDCLASS.
";

const COUNTER_REPORT: &str = "\
REPORT zcounter.
DATA lo_counter TYPE REF TO zcl_counter.
DATA lv_total TYPE i.
CREATE OBJECT lo_counter.
lv_total = lo_counter->increment( 2 ).
";

fn codes(analysis: &abaplens::Analysis) -> Vec<DiagnosticCode> {
    analysis.diagnostics().map(|d| d.code).collect()
}

fn messages(analysis: &abaplens::Analysis) -> Vec<String> {
    analysis.diagnostics().map(|d| d.message.clone()).collect()
}

// ============================================================================
// 多文件
// ============================================================================

#[test]
fn test_global_class_used_from_report() {
    let inputs = vec![
        SourceInput::new("zcounter.prog.abap", COUNTER_REPORT),
        SourceInput::new("zcl_counter.clas.abap", HELPER_CLASS),
    ];
    let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);

    assert_eq!(analysis.error_count(), 0, "{:?}", messages(&analysis));
    assert_eq!(analysis.definitions.class_count(), 1);

    let class = analysis
        .definitions
        .class("zcl_counter", "zcounter.prog.abap")
        .expect("global class visible from other files");
    assert!(class.is_global);
    assert_eq!(class.filename, "zcl_counter.clas.abap");
    assert!(class.method("increment").is_some());
}

#[test]
fn test_sequential_and_parallel_agree() {
    let inputs = vec![
        SourceInput::new("zcounter.prog.abap", COUNTER_REPORT),
        SourceInput::new("zcl_counter.clas.abap", HELPER_CLASS),
        SourceInput::new("zbroken.prog.abap", "DATA lv_a TYPE i.\nlv_b = lv_a.\n"),
    ];

    let parallel = analyze(inputs.clone(), &AnalyzeConfig::default(), &EmptyDictionary);
    let sequential = analyze(
        inputs,
        &AnalyzeConfig::default().with_parallel(false),
        &EmptyDictionary,
    );

    assert_eq!(codes(&parallel), codes(&sequential));
    assert_eq!(messages(&parallel), vec!["\"lv_b\" not found".to_string()]);

    let names: Vec<&str> = parallel.files.iter().map(|f| f.filename()).collect();
    assert_eq!(
        names,
        vec!["zcounter.prog.abap", "zcl_counter.clas.abap", "zbroken.prog.abap"]
    );
}

#[test]
fn test_diagnostics_carry_file_and_position() {
    let inputs = vec![SourceInput::new(
        "zpos.prog.abap",
        "DATA lv_a TYPE i.\n\nlv_a = lv_missing.\n",
    )];
    let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);

    let diagnostic = analysis.diagnostics().next().expect("one diagnostic");
    assert_eq!(diagnostic.code, DiagnosticCode::NotFound);
    assert_eq!(diagnostic.file, "zpos.prog.abap");
    assert_eq!(diagnostic.span.start.line, 3);
    assert_eq!(diagnostic.span.start.column, 8);
}

// ============================================================================
// 错误恢复
// ============================================================================

#[test]
fn test_unknown_statement_does_not_stop_file() {
    let inputs = vec![SourceInput::new(
        "zrecover.prog.abap",
        "DATA lv_a TYPE i.\nFOO BAR BAZ.\nDATA lv_b TYPE i.\nlv_b = lv_a.\n",
    )];
    let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);

    assert_eq!(codes(&analysis), vec![DiagnosticCode::ParserError]);

    let file = analysis.file("zrecover.prog.abap").unwrap();
    assert_eq!(file.parsed.statements.len(), 4);
    let scope = &file.syntax.scope;
    let program = scope.get(scope.root()).children[0];
    assert_eq!(scope.get(program).kind, ScopeKind::Program);
    assert!(scope.find_variable(program, "lv_b").is_some());
}

#[test]
fn test_unterminated_block_reported() {
    let inputs = vec![SourceInput::new(
        "zblock.prog.abap",
        "DATA lv_a TYPE i.\nIF lv_a = 1.\n  lv_a = 2.\n",
    )];
    let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);
    assert!(
        codes(&analysis).contains(&DiagnosticCode::UnterminatedBlock),
        "{:?}",
        messages(&analysis)
    );
}

#[test]
fn test_missing_period() {
    let inputs = vec![SourceInput::new("zdot.prog.abap", "DATA lv_a TYPE i")];
    let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);
    assert_eq!(codes(&analysis), vec![DiagnosticCode::MissingPeriod]);
}

// ============================================================================
// 配置
// ============================================================================

#[test]
fn test_diagnostic_level_filters() {
    let inputs = vec![SourceInput::new("zlevel.prog.abap", "lv_missing = 1.\n")];

    let all = analyze(inputs.clone(), &AnalyzeConfig::default(), &EmptyDictionary);
    assert_eq!(all.error_count(), 1);

    let none = analyze(
        inputs,
        &AnalyzeConfig::default().with_diagnostic_level(DiagLevel::None),
        &EmptyDictionary,
    );
    assert_eq!(none.error_count(), 0);
    assert_eq!(none.diagnostics().count(), 0);
    assert_eq!(none.files[0].syntax.diagnostics.len(), 1);
}

#[test]
fn test_file_version_override() {
    let input = SourceInput::new("zold.prog.abap", "DATA lv_a TYPE i.\n").with_version(Version::V702);
    let analysis = analyze(vec![input], &AnalyzeConfig::default(), &EmptyDictionary);
    assert_eq!(analysis.files[0].parsed.version, Version::V702);
    assert_eq!(analysis.error_count(), 0);
}

#[test]
fn test_source_input_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zdisk.prog.abap");
    std::fs::write(&path, "DATA lv_a TYPE i.\nlv_a = 1.\n").unwrap();

    let input = SourceInput::from_path(&path).unwrap();
    assert!(input.filename.ends_with("zdisk.prog.abap"));
    let analysis = analyze(vec![input], &AnalyzeConfig::default(), &EmptyDictionary);
    assert_eq!(analysis.error_count(), 0);

    assert!(SourceInput::from_path(&dir.path().join("missing.abap")).is_err());
}

#[test]
fn test_empty_input() {
    let analysis = analyze(Vec::new(), &AnalyzeConfig::default(), &EmptyDictionary);
    assert!(analysis.files.is_empty());
    assert_eq!(analysis.error_count(), 0);
}
