//! Structure builder tests
//!
//! 嵌套块、中间语句、以及不完整输入下的恢复

use crate::frontend::core::lexer::tokenize;
use crate::frontend::core::parser::{parse_statements, ParseOutput, StatementKind};
use crate::frontend::core::structure::{build_structure, BlockKind, StructureChild, StructureOutput};
use crate::frontend::version::Version;
use crate::util::diagnostic::DiagnosticCode;

fn build(source: &str) -> (ParseOutput, StructureOutput) {
    let tokens = tokenize("test.abap", source, Version::V757).tokens;
    let parsed = parse_statements("test.abap", &tokens, Version::V757);
    let structure = build_structure("test.abap", &parsed.statements);
    (parsed, structure)
}

fn codes(output: &StructureOutput) -> Vec<DiagnosticCode> {
    output
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.code)
        .collect()
}

// ============================================================================
// 平衡的块
// ============================================================================

#[test]
fn test_balanced_if() {
    let (_, output) = build("IF x = 1. WRITE x. ENDIF.");
    assert!(output.diagnostics.is_empty());

    let root = &output.root;
    assert_eq!(root.kind(), BlockKind::Program);
    assert_eq!(root.children().len(), 1);

    let block = root.find_first_structure(BlockKind::If).unwrap();
    assert_eq!(block.statement_count(), 1);
    assert_eq!(block.opener(), Some(0));
    assert_eq!(block.closer(), Some(2));
    assert!(block.is_terminated());
}

#[test]
fn test_nested_blocks() {
    let source = "LOOP AT lt_tab INTO ls_row.\n\
                  IF ls_row-id = 1.\n\
                  CONTINUE.\n\
                  ENDIF.\n\
                  WRITE ls_row-id.\n\
                  ENDLOOP.";
    let (_, output) = build(source);
    assert!(output.diagnostics.is_empty());

    let lp = output.root.find_first_structure(BlockKind::Loop).unwrap();
    assert_eq!(lp.statement_count(), 4);
    assert_eq!(lp.structures().count(), 1);
    assert_eq!(lp.statements(), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(output.root.find_all_structures(BlockKind::If).len(), 1);
}

#[test]
fn test_class_with_methods() {
    let source = "CLASS lcl_app DEFINITION.\n\
                  PUBLIC SECTION.\n\
                  METHODS run.\n\
                  ENDCLASS.\n\
                  CLASS lcl_app IMPLEMENTATION.\n\
                  METHOD run.\n\
                  WRITE 'x'.\n\
                  ENDMETHOD.\n\
                  ENDCLASS.";
    let (_, output) = build(source);
    assert!(output.diagnostics.is_empty());
    assert!(output.root.find_first_structure(BlockKind::ClassDefinition).is_some());

    let implementation = output
        .root
        .find_first_structure(BlockKind::ClassImplementation)
        .unwrap();
    let method = implementation.find_first_structure(BlockKind::Method).unwrap();
    assert_eq!(method.statement_count(), 1);
}

#[test]
fn test_begin_of_blocks_nest() {
    let source = "TYPES: BEGIN OF ty_outer,\n\
                  id TYPE i,\n\
                  BEGIN OF inner,\n\
                  name TYPE string,\n\
                  END OF inner,\n\
                  END OF ty_outer.";
    let (parsed, output) = build(source);
    assert_eq!(parsed.statements[2].kind, StatementKind::TypeBegin);
    assert!(output.diagnostics.is_empty());

    let outer = output.root.find_first_structure(BlockKind::TypesBegin).unwrap();
    assert_eq!(outer.statement_count(), 4);
    assert_eq!(outer.find_all_structures(BlockKind::TypesBegin).len(), 1);
}

#[test]
fn test_intermediates_stay_in_their_block() {
    let source = "CASE x.\nWHEN 1.\nWRITE 'a'.\nWHEN OTHERS.\nWRITE 'b'.\nENDCASE.";
    let (_, output) = build(source);
    assert!(output.diagnostics.is_empty());
    let case = output.root.find_first_structure(BlockKind::Case).unwrap();
    assert_eq!(case.statement_count(), 4);
    assert!(case
        .children()
        .iter()
        .all(|child| matches!(child, StructureChild::Statement(_))));
}

#[test]
fn test_try_catch() {
    let (_, output) = build("TRY.\nx = 1.\nCATCH zcx_error.\nCLEANUP.\nENDTRY.");
    assert!(output.diagnostics.is_empty());
    assert_eq!(
        output.root.find_first_structure(BlockKind::Try).unwrap().statement_count(),
        3
    );
}

#[test]
fn test_comments_are_body_statements() {
    let (_, output) = build("IF x = 1.\n* note\nENDIF.");
    let block = output.root.find_first_structure(BlockKind::If).unwrap();
    assert_eq!(block.statement_count(), 1);
}

// ============================================================================
// 不完整输入
// ============================================================================

#[test]
fn test_unterminated_block() {
    let (_, output) = build("IF x = 1. WRITE x.");
    assert_eq!(codes(&output), vec![DiagnosticCode::UnterminatedBlock]);

    let block = output.root.find_first_structure(BlockKind::If).unwrap();
    assert!(!block.is_terminated());
    assert_eq!(block.statement_count(), 1);
    assert!(output.diagnostics.diagnostics()[0].message.contains("ENDIF"));
}

#[test]
fn test_every_open_frame_reported() {
    let (_, output) = build("FORM foo.\nDO.\nLOOP AT lt_tab INTO ls_row.");
    assert_eq!(
        codes(&output),
        vec![DiagnosticCode::UnterminatedBlock; 3]
    );
    let form = output.root.find_first_structure(BlockKind::Form).unwrap();
    assert!(form.find_first_structure(BlockKind::Loop).is_some());
}

#[test]
fn test_stray_closer_is_free_standing() {
    let (_, output) = build("WRITE x.\nENDIF.\nWRITE y.");
    assert_eq!(codes(&output), vec![DiagnosticCode::MismatchedCloser]);
    assert_eq!(output.root.children().len(), 3);
    assert_eq!(output.root.structures().count(), 0);
}

#[test]
fn test_mismatched_closer_keeps_block_open() {
    let (_, output) = build("IF x = 1.\nENDLOOP.\nENDIF.");
    assert_eq!(codes(&output), vec![DiagnosticCode::MismatchedCloser]);
    let block = output.root.find_first_structure(BlockKind::If).unwrap();
    assert_eq!(block.closer(), Some(2));
    assert_eq!(block.statement_count(), 1);
}

#[test]
fn test_misplaced_intermediate() {
    let (_, output) = build("LOOP AT lt_tab INTO ls_row.\nELSE.\nENDLOOP.");
    assert_eq!(codes(&output), vec![DiagnosticCode::MisplacedIntermediate]);
    let lp = output.root.find_first_structure(BlockKind::Loop).unwrap();
    assert_eq!(lp.statement_count(), 1);
}

#[test]
fn test_intermediate_checks_innermost_block() {
    let (_, output) = build("IF a = 1.\nDO.\nELSE.\nENDDO.\nENDIF.");
    assert_eq!(codes(&output), vec![DiagnosticCode::MisplacedIntermediate]);
}

#[test]
fn test_empty_program() {
    let (_, output) = build("");
    assert!(output.root.children().is_empty());
    assert!(output.root.span().is_dummy());
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_enclosing_block() {
    let (_, output) = build("IF x = 1.\nDO.\nWRITE x.\nENDDO.\nENDIF.");
    assert_eq!(output.root.enclosing(2).unwrap().kind(), BlockKind::Do);
    assert_eq!(output.root.enclosing(0).unwrap().kind(), BlockKind::If);
    assert!(output.root.enclosing(99).is_none());
}
