//! Syntax resolver tests
//!
//! 声明与作用域、类型检查、类与方法、FORM、命名空间规则与字典查询

use crate::frontend::config::AnalyzeConfig;
use crate::frontend::core::type_system::{AbapType, Component};
use crate::frontend::pipeline::{analyze, parse_file, ParsedFile, SourceInput};
use crate::frontend::syntax::{
    resolve_file, EmptyDictionary, FunctionModule, MemoryDictionary, MethodParameter,
    ParameterKind, ReferenceKind, ReferenceTarget, ScopeId, ScopeKind, SyntaxResult,
};
use crate::frontend::version::Version;
use crate::util::diagnostic::DiagnosticCode;

fn parse(source: &str) -> ParsedFile {
    parse_file("zfoo.prog.abap", source, Version::V757)
}

fn run(source: &str) -> (ParsedFile, SyntaxResult) {
    run_with(source, &AnalyzeConfig::default(), &EmptyDictionary)
}

fn run_with(
    source: &str,
    config: &AnalyzeConfig,
    dictionary: &dyn crate::frontend::syntax::Dictionary,
) -> (ParsedFile, SyntaxResult) {
    let parsed = parse(source);
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected parse diagnostics: {:?}",
        parsed.diagnostics
    );
    let result = resolve_file(&parsed, config, dictionary);
    (parsed, result)
}

fn codes(result: &SyntaxResult) -> Vec<DiagnosticCode> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

fn messages(result: &SyntaxResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.message.clone()).collect()
}

fn program_scope(result: &SyntaxResult) -> ScopeId {
    let root = result.scope.root();
    result.scope.get(root).children[0]
}

fn assert_clean(source: &str) {
    let (_, result) = run(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        messages(&result)
    );
}

const CALCULATOR: &str = "\
CLASS lcl_calc DEFINITION.
  PUBLIC SECTION.
    METHODS add IMPORTING iv_a TYPE i iv_b TYPE i RETURNING VALUE(rv_sum) TYPE i.
ENDCLASS.
CLASS lcl_calc IMPLEMENTATION.
  METHOD add.
    rv_sum = iv_a + iv_b.
  ENDMETHOD.
ENDCLASS.
DATA lo_calc TYPE REF TO lcl_calc.
DATA lv_sum TYPE i.
CREATE OBJECT lo_calc.
";

// ============================================================================
// 声明与作用域
// ============================================================================

#[test]
fn test_declarations_are_visible() {
    let (_, result) = run(
        "DATA lv_count TYPE i.\nDATA lv_text TYPE string.\nlv_count = 1.\nlv_text = lv_count.\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let program = program_scope(&result);
    assert_eq!(result.scope.get(program).kind, ScopeKind::Program);
    let count = result.scope.find_variable(program, "LV_COUNT").unwrap();
    assert_eq!(count.ty, AbapType::integer());
    assert_eq!(count.name, "lv_count");
    assert!(result.scope.find_variable(program, "lv_text").is_some());
}

#[test]
fn test_builtin_names_resolve() {
    assert_clean(
        "DATA lv_flag TYPE abap_bool.\n\
         DATA lv_rc TYPE i.\n\
         lv_flag = abap_true.\n\
         lv_rc = sy-subrc.\n",
    );
}

#[test]
fn test_inline_declaration_types() {
    let (_, result) = run("DATA(lv_text) = 'abc'.\nDATA(lv_num) = 5.\n");
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let program = program_scope(&result);
    let text = result.scope.find_variable(program, "lv_text").unwrap();
    assert_eq!(text.ty, AbapType::character(3));
    assert_eq!(result.types.type_at(text.span), Some(&AbapType::character(3)));

    let num = result.scope.find_variable(program, "lv_num").unwrap();
    assert_eq!(num.ty, AbapType::integer());
    assert!(result
        .references
        .iter()
        .any(|r| r.kind == ReferenceKind::InferredType && r.target_name() == "LV_NUM"));
}

#[test]
fn test_references_serialize_to_json() {
    let (_, result) = run("DATA(lv_num) = 5.\nDATA lv_copy TYPE i.\nlv_copy = lv_num.\n");
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let json = serde_json::to_string(&result.references).unwrap();
    let restored: Vec<crate::frontend::syntax::Reference> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, result.references);
    assert!(restored
        .iter()
        .any(|r| matches!(&r.target, ReferenceTarget::Identifier(id) if id.key() == "LV_NUM")));
}

#[test]
fn test_begin_of_structure_components() {
    let source = "\
TYPES BEGIN OF ty_row.
TYPES id TYPE i.
TYPES name TYPE string.
TYPES END OF ty_row.
DATA ls_row TYPE ty_row.
ls_row-id = 1.
ls_row-name = 'x'.
";
    let (_, result) = run(source);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let program = program_scope(&result);
    let row = result.scope.find_type(program, "ty_row").unwrap();
    assert_eq!(row.ty.components().len(), 2);
    assert_eq!(row.ty.component("NAME"), Some(&AbapType::string()));
}

#[test]
fn test_unknown_variable_is_error() {
    let (_, result) = run("lv_unknown = 1.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::NotFound]);
    assert_eq!(messages(&result), vec!["\"lv_unknown\" not found".to_string()]);
}

#[test]
fn test_duplicate_declaration() {
    let (_, result) = run("DATA lv_a TYPE i.\nDATA lv_a TYPE string.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::AlreadyDefined]);
}

#[test]
fn test_failed_inline_declaration_still_declared() {
    let (_, result) = run("DATA(lv_u) = unknown_thing.\nDATA lv TYPE i.\nlv = lv_u.\n");
    assert_eq!(messages(&result), vec!["\"unknown_thing\" not found".to_string()]);

    let program = program_scope(&result);
    let recovered = result.scope.find_variable(program, "lv_u").unwrap();
    assert!(matches!(recovered.ty, AbapType::Unknown(_)));
}

#[test]
fn test_failed_loop_keeps_inline_targets() {
    let (_, result) = run(
        "LOOP AT unknown_tab INTO DATA(ls_row).\n\
         WRITE ls_row.\n\
         ENDLOOP.\n",
    );
    assert_eq!(messages(&result), vec!["\"unknown_tab\" not found".to_string()]);

    let (_, result) = run(
        "LOOP AT unknown_tab ASSIGNING FIELD-SYMBOL(<ls_row>).\n\
         <ls_row> = 1.\n\
         ENDLOOP.\n",
    );
    assert_eq!(codes(&result), vec![DiagnosticCode::NotFound]);
}

#[test]
fn test_form_local_shadows_program_variable() {
    let source = "\
DATA x TYPE string.
x = 'a'.
FORM calc.
  DATA x TYPE i.
  x = 1.
ENDFORM.
";
    let (parsed, result) = run(source);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let inner = parsed.source.position_from_offset(source.find("x = 1").unwrap());
    let shadowing = result.scope.find_variable_in_scope("x", inner).unwrap();
    assert_eq!(shadowing.ty, AbapType::integer());

    let outer = parsed.source.position_from_offset(source.find("x = 'a'").unwrap());
    let shadowed = result.scope.find_variable_in_scope("x", outer).unwrap();
    assert_eq!(shadowed.ty, AbapType::string());
}

#[test]
fn test_method_local_shadows_program_variable() {
    let source = "\
DATA x TYPE string.
CLASS lcl_shadow DEFINITION.
  PUBLIC SECTION.
    METHODS run.
ENDCLASS.
CLASS lcl_shadow IMPLEMENTATION.
  METHOD run.
    DATA x TYPE i.
    x = 1.
  ENDMETHOD.
ENDCLASS.
";
    let (parsed, result) = run(source);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let inner = parsed.source.position_from_offset(source.find("x = 1").unwrap());
    let shadowing = result.scope.find_variable_in_scope("x", inner).unwrap();
    assert_eq!(shadowing.ty, AbapType::integer());

    let program = program_scope(&result);
    assert_eq!(result.scope.find_variable(program, "x").unwrap().ty, AbapType::string());
}

#[test]
fn test_constant_cannot_change() {
    let (_, result) = run("CONSTANTS lc_max TYPE i VALUE 10.\nlc_max = 5.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::WrongContext]);
    assert!(messages(&result)[0].contains("lc_max"));
}

#[test]
fn test_global_constants_from_config() {
    let source = "DATA lv_a TYPE i.\nlv_a = gc_magic.\n";
    let (_, result) = run(source);
    assert_eq!(codes(&result), vec![DiagnosticCode::NotFound]);

    let config = AnalyzeConfig::default().with_global_constant("gc_magic");
    let (_, result) = run_with(source, &config, &EmptyDictionary);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));
}

// ============================================================================
// 类型检查
// ============================================================================

#[test]
fn test_incompatible_assignment() {
    let source = "\
TYPES BEGIN OF ty_row.
TYPES id TYPE i.
TYPES name TYPE string.
TYPES END OF ty_row.
DATA ls_row TYPE ty_row.
ls_row = 5.
";
    let (_, result) = run(source);
    assert_eq!(codes(&result), vec![DiagnosticCode::IncompatibleTypes]);
    assert!(messages(&result)[0].contains("\"TY_ROW\""));
}

#[test]
fn test_unknown_component() {
    let source = "\
TYPES BEGIN OF ty_row.
TYPES id TYPE i.
TYPES END OF ty_row.
DATA ls_row TYPE ty_row.
ls_row-foo = 1.
";
    let (_, result) = run(source);
    assert_eq!(codes(&result), vec![DiagnosticCode::ComponentNotFound]);
}

#[test]
fn test_loop_over_table() {
    let source = "\
TYPES BEGIN OF ty_row.
TYPES id TYPE i.
TYPES END OF ty_row.
DATA lt_rows TYPE STANDARD TABLE OF ty_row WITH DEFAULT KEY.
LOOP AT lt_rows INTO DATA(ls_line).
  ls_line-id = 1.
ENDLOOP.
";
    let (_, result) = run(source);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let program = program_scope(&result);
    let line = result.scope.find_variable(program, "ls_line").unwrap();
    assert!(line.ty.is_structure());
    assert!(line.ty.component("ID").is_some());
}

#[test]
fn test_loop_over_non_table() {
    let (_, result) = run("DATA lv_a TYPE i.\nLOOP AT lv_a INTO DATA(lv_x).\nENDLOOP.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::NotATable]);
}

#[test]
fn test_continue_outside_loop() {
    let (_, result) = run("CONTINUE.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::WrongContext]);

    assert_clean("DO 3 TIMES.\n  CONTINUE.\nENDDO.\n");
}

// ============================================================================
// 类与方法
// ============================================================================

#[test]
fn test_method_call_resolves() {
    let source = format!("{}lv_sum = lo_calc->add( iv_a = 1 iv_b = 2 ).\n", CALCULATOR);
    let (_, result) = run(&source);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));
    assert!(result
        .references
        .iter()
        .any(|r| r.kind == ReferenceKind::MethodReference && r.target_name() == "ADD"));
}

#[test]
fn test_missing_parameter() {
    let source = format!("{}lv_sum = lo_calc->add( iv_a = 1 ).\n", CALCULATOR);
    let (_, result) = run(&source);
    assert_eq!(codes(&result), vec![DiagnosticCode::ParameterMissing]);
    assert_eq!(messages(&result), vec!["Parameter \"iv_b\" must be supplied".to_string()]);
}

#[test]
fn test_unknown_parameter() {
    let source = format!("{}lv_sum = lo_calc->add( iv_a = 1 iv_c = 2 ).\n", CALCULATOR);
    let (_, result) = run(&source);
    assert_eq!(codes(&result), vec![DiagnosticCode::UnknownParameter]);
}

#[test]
fn test_method_scope_and_parameters() {
    let (parsed, result) = run(CALCULATOR);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let (method, data) = result
        .scope
        .iter()
        .find(|(_, data)| data.kind == ScopeKind::Method)
        .unwrap();
    assert_eq!(data.name, "ADD");
    assert!(result.scope.find_variable(method, "iv_a").is_some());
    assert!(result.scope.find_variable(method, "rv_sum").is_some());
    assert!(result.scope.find_variable(program_scope(&result), "iv_a").is_none());

    let offset = CALCULATOR.find("rv_sum = iv_a").unwrap();
    let position = parsed.source.position_from_offset(offset);
    assert_eq!(result.scope.lookup_position(position), method);
    assert!(result.scope.find_variable_in_scope("iv_b", position).is_some());
}

#[test]
fn test_undefined_method_implementation() {
    let source = "\
CLASS lcl_a DEFINITION.
  PUBLIC SECTION.
    METHODS run.
ENDCLASS.
CLASS lcl_a IMPLEMENTATION.
  METHOD run.
  ENDMETHOD.
  METHOD other.
  ENDMETHOD.
ENDCLASS.
";
    let (_, result) = run(source);
    assert_eq!(codes(&result), vec![DiagnosticCode::MethodNotFound]);
    assert!(messages(&result)[0].contains("LCL_A=>OTHER"));
}

#[test]
fn test_signature_errors_reported_once() {
    let source = "\
CLASS lcl_a DEFINITION.
  PUBLIC SECTION.
    METHODS run IMPORTING iv_x TYPE zunknown_type.
ENDCLASS.
";
    let (_, result) = run(source);
    assert_eq!(codes(&result), vec![DiagnosticCode::TypeNotFound]);
}

// ============================================================================
// FORM
// ============================================================================

#[test]
fn test_perform_hoisted_form() {
    assert_clean(
        "PERFORM calc.\n\
         FORM calc.\n\
         ENDFORM.\n",
    );
}

#[test]
fn test_form_parameters_in_scope() {
    assert_clean(
        "FORM calc USING iv_in TYPE i CHANGING cv_out TYPE i.\n\
         cv_out = iv_in * 2.\n\
         ENDFORM.\n",
    );
}

#[test]
fn test_perform_references_form_definition() {
    let (_, result) = run("PERFORM calc.\nFORM calc.\nENDFORM.\n");
    let reference = result
        .references
        .iter()
        .find(|r| r.kind == ReferenceKind::FormReference)
        .unwrap();
    assert_eq!(reference.span.start.line, 1);
    match &reference.target {
        ReferenceTarget::Form { name, span } => {
            assert_eq!(name, "calc");
            assert_eq!(span.start.line, 2);
            assert_eq!(span.start.column, 6);
        }
        other => panic!("expected form target, got {:?}", other),
    }
}

#[test]
fn test_perform_missing_form() {
    let (_, result) = run("PERFORM missing_form.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::FormNotFound]);
}

// ============================================================================
// 命名空间与 void
// ============================================================================

#[test]
fn test_outside_namespace_is_void() {
    let (_, result) = run("DATA lo_descr TYPE REF TO cl_abap_typedescr.\nDATA lv_val TYPE some_data_element.\n");
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));
    assert!(result.references.iter().any(|r| r.kind == ReferenceKind::Void));
}

#[test]
fn test_inside_namespace_is_error() {
    let (_, result) = run("DATA lo_obj TYPE REF TO zcl_missing.\nDATA lv_val TYPE zmissing_type.\n");
    assert_eq!(
        codes(&result),
        vec![DiagnosticCode::ClassNotFound, DiagnosticCode::TypeNotFound]
    );
}

#[test]
fn test_custom_namespace() {
    let config = AnalyzeConfig::default().with_error_namespace("^ZZ");
    let (_, result) = run_with(
        "DATA lo_obj TYPE REF TO zcl_missing.\n",
        &config,
        &EmptyDictionary,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));
}

#[test]
fn test_function_module_outside_namespace() {
    assert_clean("CALL FUNCTION 'RFC_PING'.\n");

    let (_, result) = run("CALL FUNCTION 'Z_MISSING'.\n");
    assert_eq!(codes(&result), vec![DiagnosticCode::MethodNotFound]);
}

// ============================================================================
// 字典
// ============================================================================

#[test]
fn test_dictionary_types_and_tables() {
    let dictionary = MemoryDictionary::new();
    dictionary.add_type("zdtel_name", AbapType::character(10));
    dictionary.add_table(
        "ztab",
        vec![
            Component::new("ID", AbapType::integer()),
            Component::new("NAME", AbapType::character(10)),
        ],
    );

    let source = "\
DATA lv_name TYPE zdtel_name.
DATA ls_tab TYPE ztab.
ls_tab-name = lv_name.
";
    let (_, result) = run_with(source, &AnalyzeConfig::default(), &dictionary);
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));

    let name = result
        .scope
        .find_variable(program_scope(&result), "lv_name")
        .unwrap();
    assert_eq!(name.ty, AbapType::character(10).with_name("ZDTEL_NAME"));

    let (_, result) = run_with(
        "DATA ls_tab TYPE ztab.\nls_tab-unknown = 1.\n",
        &AnalyzeConfig::default(),
        &dictionary,
    );
    assert_eq!(codes(&result), vec![DiagnosticCode::ComponentNotFound]);
}

#[test]
fn test_dictionary_function_module() {
    let dictionary = MemoryDictionary::new();
    dictionary.add_function_module(FunctionModule {
        name: "Z_GET_TEXT".to_string(),
        parameters: vec![
            MethodParameter::new("iv_id", ParameterKind::Importing, AbapType::integer()),
            MethodParameter::new("iv_lang", ParameterKind::Importing, AbapType::character(1)),
            MethodParameter::new("iv_trace", ParameterKind::Importing, AbapType::character(1))
                .optional(),
        ],
    });

    let (_, result) = run_with(
        "CALL FUNCTION 'Z_GET_TEXT' EXPORTING iv_id = 1.\n",
        &AnalyzeConfig::default(),
        &dictionary,
    );
    assert_eq!(codes(&result), vec![DiagnosticCode::ParameterMissing]);
    assert!(messages(&result)[0].contains("iv_lang"));

    let (_, result) = run_with(
        "CALL FUNCTION 'Z_GET_TEXT' EXPORTING iv_id = 1 iv_lang = 'E'.\n",
        &AnalyzeConfig::default(),
        &dictionary,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", messages(&result));
}

// ============================================================================
// 多文件
// ============================================================================

const GREETER_INTERFACE: &str = "\
INTERFACE zif_greeter PUBLIC.
  METHODS greet IMPORTING iv_name TYPE string RETURNING VALUE(rv_text) TYPE string.
ENDINTERFACE.
";

const GREETER_CLASS: &str = "\
CLASS zcl_greeter DEFINITION PUBLIC.
  PUBLIC SECTION.
    INTERFACES zif_greeter.
ENDCLASS.
CLASS zcl_greeter IMPLEMENTATION.
  METHOD zif_greeter~greet.
    rv_text = iv_name.
  ENDMETHOD.
ENDCLASS.
";

const GREETER_REPORT: &str = "\
REPORT zdemo.
DATA lo_greeter TYPE REF TO zif_greeter.
DATA lv_text TYPE string.
CREATE OBJECT lo_greeter TYPE zcl_greeter.
lv_text = lo_greeter->greet( 'World' ).
";

#[test]
fn test_analyze_across_files() {
    let inputs = vec![
        SourceInput::new("zdemo.prog.abap", GREETER_REPORT),
        SourceInput::new("zcl_greeter.clas.abap", GREETER_CLASS),
        SourceInput::new("zif_greeter.intf.abap", GREETER_INTERFACE),
    ];
    let config = AnalyzeConfig::default().with_version(Version::V757);
    let analysis = analyze(inputs, &config, &EmptyDictionary);

    let all: Vec<String> = analysis.diagnostics().map(|d| d.message.clone()).collect();
    assert_eq!(analysis.error_count(), 0, "{:?}", all);
    assert_eq!(analysis.files.len(), 3);
    assert_eq!(analysis.files[0].filename(), "zdemo.prog.abap");
    assert_eq!(analysis.definitions.class_count(), 1);
    assert_eq!(analysis.definitions.interface_count(), 1);
}

#[test]
fn test_analyze_missing_dependency() {
    let inputs = vec![SourceInput::new("zcl_greeter.clas.abap", GREETER_CLASS)];
    let config = AnalyzeConfig::default().with_version(Version::V757).with_parallel(false);
    let analysis = analyze(inputs, &config, &EmptyDictionary);

    let codes: Vec<DiagnosticCode> = analysis.diagnostics().map(|d| d.code).collect();
    assert!(codes.contains(&DiagnosticCode::ClassNotFound), "{:?}", codes);
}
