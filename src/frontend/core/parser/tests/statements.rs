//! 语句识别测试

use super::{assert_kind, kinds, parse};
use crate::frontend::core::parser::{ExprKind, StatementKind as S};
use crate::util::diagnostic::DiagnosticCode;

fn assert_all(
    sources: &[&str],
    kind: S,
) {
    for source in sources {
        assert_kind(source, kind);
    }
}

// ============================================================================
// 声明
// ============================================================================

#[test]
fn test_program_headers() {
    assert_kind("REPORT zfoo.", S::Report);
    assert_kind("REPORT zfoo LINE-SIZE 255 NO STANDARD PAGE HEADING.", S::Report);
    assert_kind("PROGRAM zbar.", S::Program);
    assert_kind("INCLUDE zinclude.", S::Include);
    assert_kind("INCLUDE TYPE ty_base.", S::IncludeType);
}

#[test]
fn test_data_forms() {
    assert_all(
        &[
            "DATA foo.",
            "DATA lv_foo LIKE LINE OF foo.",
            "DATA lv_foo TYPE zcl_class=>typedef.",
            "data lt_data type table of d020s with header line.",
            "Data foo(89) type c.",
            "data foo type i value -1.",
            "data foobar type abap_bool read-only value ABAP_FALSE ##NO_TEXT.",
            "DATA mt_stage TYPE SORTED TABLE OF ty_stage WITH UNIQUE KEY file-path file-filename.",
            "data foo like bar[].",
            "DATA li_data(200) TYPE c OCCURS 0 WITH HEADER LINE.",
            "data lt_foo type standard table of snodetext initial size 0 with header line.",
            "DATA %id TYPE flag.",
            "data $fie$ld type c.",
            "DATA /foo/bar TYPE /foo/bar.",
            "DATA lo_ref TYPE REF TO zcl_foo.",
            "DATA lt_tab TYPE HASHED TABLE OF ty_row WITH UNIQUE KEY id.",
            "DATA lt_range TYPE RANGE OF i.",
            "DATA lv_text TYPE c LENGTH 10.",
            "DATA lv_amount TYPE p LENGTH 8 DECIMALS 2.",
        ],
        S::Data,
    );
}

#[test]
fn test_other_data_declarations() {
    assert_kind("class-data gv_var type zfoo value 'FOO' read-only .", S::ClassData);
    assert_kind("STATICS sv_count TYPE i.", S::Statics);
    assert_kind("CONSTANTS c_max TYPE i VALUE 10.", S::Constants);
    assert_kind("TYPES ty_id TYPE n LENGTH 10.", S::Types);
    assert_kind("FIELD-SYMBOLS <fs> TYPE any.", S::FieldSymbol);
    assert_kind("TABLES t100.", S::Tables);
    assert_kind("PARAMETERS p_file TYPE string OBLIGATORY.", S::Parameter);
}

#[test]
fn test_structure_declarations() {
    assert_eq!(
        kinds("DATA: BEGIN OF ls_row, id TYPE i, END OF ls_row."),
        vec![S::DataBegin, S::Data, S::DataEnd]
    );
    assert_eq!(
        kinds("CONSTANTS: BEGIN OF c_mode, read TYPE c VALUE 'R', END OF c_mode."),
        vec![S::ConstantBegin, S::Constants, S::ConstantEnd]
    );
}

// ============================================================================
// 类与子程序
// ============================================================================

#[test]
fn test_class_statements() {
    assert_kind("CLASS lcl_foo DEFINITION.", S::ClassDefinition);
    assert_kind("CLASS lcl_foo DEFINITION PUBLIC FINAL CREATE PUBLIC.", S::ClassDefinition);
    assert_kind("CLASS lcl_sub DEFINITION INHERITING FROM lcl_foo ABSTRACT.", S::ClassDefinition);
    assert_kind("CLASS lcl_foo DEFINITION DEFERRED.", S::ClassDeferred);
    assert_kind("CLASS lcl_foo IMPLEMENTATION.", S::ClassImplementation);
    assert_kind("ENDCLASS.", S::EndClass);
    assert_kind("PUBLIC SECTION.", S::Public);
    assert_kind("PROTECTED SECTION.", S::Protected);
    assert_kind("PRIVATE SECTION.", S::Private);
    assert_kind("INTERFACE lif_foo.", S::Interface);
    assert_kind("INTERFACE lif_foo DEFERRED.", S::InterfaceDeferred);
    assert_kind("ENDINTERFACE.", S::EndInterface);
    assert_kind("INTERFACES lif_foo.", S::InterfaceDef);
}

#[test]
fn test_method_definitions() {
    assert_all(
        &[
            "METHODS run.",
            "METHODS run IMPORTING iv_x TYPE i RETURNING VALUE(rv_y) TYPE string.",
            "METHODS run REDEFINITION.",
            "CLASS-METHODS create IMPORTING iv_name TYPE string OPTIONAL RETURNING VALUE(ro_obj) TYPE REF TO lcl_foo.",
            "METHODS set CHANGING ct_tab TYPE STANDARD TABLE RAISING zcx_error.",
            "METHODS on_click FOR EVENT clicked OF lcl_button IMPORTING sender.",
        ],
        S::MethodDef,
    );
    assert_kind("METHOD run.", S::MethodImplementation);
    assert_kind("ENDMETHOD.", S::EndMethod);
}

#[test]
fn test_subroutines() {
    assert_kind("FORM foo.", S::Form);
    assert_kind("FORM foo USING bar TYPE i CHANGING baz.", S::Form);
    assert_kind("FORM foo TABLES pt_tab USING VALUE(pv_x) TYPE i.", S::Form);
    assert_kind("ENDFORM.", S::EndForm);
    assert_kind("PERFORM foo.", S::Perform);
    assert_kind("PERFORM foo USING 1 CHANGING lv_x.", S::Perform);
}

// ============================================================================
// 控制流
// ============================================================================

#[test]
fn test_branches() {
    assert_kind("IF x = 1.", S::If);
    assert_kind("IF x = 1 AND NOT y IS INITIAL.", S::If);
    assert_kind("IF ( a < b ) OR c >= d.", S::If);
    assert_kind("ELSEIF lo_obj IS BOUND.", S::ElseIf);
    assert_kind("ELSE.", S::Else);
    assert_kind("ENDIF.", S::EndIf);
    assert_kind("CASE lv_x.", S::Case);
    assert_kind("WHEN 1 OR 2.", S::When);
    assert_kind("WHEN OTHERS.", S::When);
    assert_kind("ENDCASE.", S::EndCase);
}

#[test]
fn test_loops() {
    assert_kind("DO.", S::Do);
    assert_kind("DO 5 TIMES.", S::Do);
    assert_kind("ENDDO.", S::EndDo);
    assert_kind("WHILE lv_x < 10.", S::While);
    assert_kind("ENDWHILE.", S::EndWhile);
    assert_kind("LOOP AT lt_tab INTO ls_row.", S::Loop);
    assert_kind("LOOP AT lt_tab INTO ls_row WHERE field = 1.", S::Loop);
    assert_kind("LOOP AT lt_tab ASSIGNING FIELD-SYMBOL(<ls_row>).", S::Loop);
    assert_kind("LOOP AT lt_tab REFERENCE INTO DATA(lr_row) FROM 2.", S::Loop);
    assert_kind("ENDLOOP.", S::EndLoop);
    assert_kind("EXIT.", S::Exit);
    assert_kind("CONTINUE.", S::Continue);
    assert_kind("CHECK lv_x IS NOT INITIAL.", S::Check);
    assert_kind("RETURN.", S::Return);
}

#[test]
fn test_exceptions() {
    assert_kind("TRY.", S::Try);
    assert_kind("CATCH zcx_error INTO lx_err.", S::Catch);
    assert_kind("CATCH zcx_a zcx_b.", S::Catch);
    assert_kind("CLEANUP.", S::Cleanup);
    assert_kind("ENDTRY.", S::EndTry);
    assert_kind("RAISE EXCEPTION TYPE zcx_error.", S::Raise);
    assert_kind("RAISE EXCEPTION TYPE zcx_error EXPORTING textid = lv_id.", S::Raise);
    assert_kind("RAISE not_found.", S::Raise);
}

// ============================================================================
// 操作
// ============================================================================

#[test]
fn test_uline_forms() {
    assert_all(
        &[
            "ULINE.",
            "ULINE (92).",
            "ULINE /(80).",
            "ULINE /1(76).",
            "ULINE AT /.",
            "ULINE AT (c_line_size).",
            "ULINE AT /1(80) .",
            "ULINE AT 3(12).",
            "ULINE AT /(right).",
            "ULINE /10.",
        ],
        S::Uline,
    );
}

#[test]
fn test_write_forms() {
    assert_all(
        &[
            "WRITE 'Hello'.",
            "WRITE lv_x.",
            "WRITE / 'foo'.",
            "WRITE AT 5 lv_x.",
            "WRITE lv_x NO-GAP.",
            "WRITE lv_x TO lv_text.",
        ],
        S::Write,
    );
    assert_eq!(kinds("WRITE: / 'a', / 'b'."), vec![S::Write, S::Write]);
}

#[test]
fn test_assign_forms() {
    assert_all(
        &[
            "ASSIGN lv_x TO <fs>.",
            "ASSIGN COMPONENT 'NAME' OF STRUCTURE ls_row TO <lv_field>.",
            "ASSIGN COMPONENT lv_idx OF STRUCTURE <ls_row> TO <lv_field>.",
            "ASSIGN (lv_name) TO <fs>.",
            "ASSIGN lv_x TO <fs> CASTING TYPE x.",
            "ASSIGN lv_x TO <fs> CASTING.",
            "ASSIGN lo_obj->(lv_attr) TO <fs>.",
            "ASSIGN lv_x TO <fs> ELSE UNASSIGN.",
        ],
        S::Assign,
    );
}

#[test]
fn test_table_operations() {
    assert_kind("APPEND ls_row TO lt_tab.", S::Append);
    assert_kind("APPEND INITIAL LINE TO lt_tab ASSIGNING <ls_row>.", S::Append);
    assert_kind("APPEND LINES OF lt_a TO lt_b.", S::Append);
    assert_kind("INSERT ls_row INTO TABLE lt_tab.", S::Insert);
    assert_kind("INSERT ls_row INTO lt_tab INDEX 1.", S::Insert);
    assert_kind("INSERT ztab FROM ls_row.", S::InsertDatabase);
    assert_kind("READ TABLE lt_tab INTO ls_row INDEX 1.", S::ReadTable);
    assert_kind("READ TABLE lt_tab WITH KEY id = 1 TRANSPORTING NO FIELDS.", S::ReadTable);
    assert_kind("READ TABLE lt_tab ASSIGNING <ls_row> WITH KEY id = lv_id BINARY SEARCH.", S::ReadTable);
    assert_kind("MODIFY ztab FROM ls_row.", S::ModifyDatabase);
    assert_kind("MODIFY lt_tab INDEX 1 FROM ls_row.", S::ModifyInternal);
    assert_kind("MODIFY lt_tab FROM ls_row TRANSPORTING name WHERE id = 1.", S::ModifyInternal);
    assert_kind("CLEAR lv_x.", S::Clear);
    assert_kind("FREE lt_tab.", S::Free);
}

#[test]
fn test_calls() {
    assert_kind("CALL FUNCTION 'Z_FOO'.", S::CallFunction);
    assert_kind(
        "CALL FUNCTION 'Z_FOO' EXPORTING iv_x = 1 IMPORTING ev_y = lv_y EXCEPTIONS OTHERS = 1.",
        S::CallFunction,
    );
    assert_kind("CALL METHOD lo_obj->run EXPORTING iv_x = 1.", S::Call);
    assert_kind("CALL METHOD zcl_foo=>create RECEIVING ro_obj = lo_obj.", S::Call);
    assert_kind("lo_obj->run( ).", S::Call);
    assert_kind("run( iv_x = 1 iv_y = 2 ).", S::Call);
    assert_kind("zcl_foo=>create( )->run( 5 ).", S::Call);
    assert_kind("CREATE OBJECT lo_foo.", S::CreateObject);
    assert_kind("CREATE OBJECT lo_foo TYPE lcl_sub EXPORTING iv_x = 1.", S::CreateObject);
}

#[test]
fn test_misc_operations() {
    assert_kind("CONCATENATE a b INTO c.", S::Concatenate);
    assert_kind("CONCATENATE a b INTO c SEPARATED BY space.", S::Concatenate);
    assert_kind("ASSERT lv_x = 1.", S::Assert);
    assert_kind("MESSAGE e001(zmsg) WITH lv_x.", S::Message);
    assert_kind("MESSAGE 'Done' TYPE 'S'.", S::Message);
}

#[test]
fn test_move_forms() {
    assert_all(
        &[
            "lv_x = 1.",
            "lv_x = lv_y = 2.",
            "lo_obj ?= lo_base.",
            "MOVE lv_y TO lv_x.",
            "ls_row-name = 'A'.",
            "lv_x = lv_a * ( lv_b + 1 ).",
            "lv_text = |Hello { lv_name }!|.",
            "lv_x = COND #( WHEN lv_a = 1 THEN 2 ELSE 3 ).",
            "lt_tab = VALUE #( ( 1 ) ( 2 ) ).",
            "ls_row = VALUE #( id = 1 name = 'A' ).",
            "lv_x = lt_tab[ 1 ].",
            "lv_x = lt_tab[ id = 1 ]-name.",
            "lo_obj->attr = 1.",
            "<fs> = 2.",
        ],
        S::Move,
    );
}

// ============================================================================
// 未识别语句
// ============================================================================

#[test]
fn test_unknown_statement_reports_parser_error() {
    let parsed = parse("REPORT z.\ngarbage text.\nWRITE x.");
    assert_eq!(parsed.kinds(), vec![S::Report, S::Unknown, S::Write]);

    let diagnostics = parsed.output.diagnostics.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::ParserError);
    assert_eq!(diagnostics[0].span.start.line, 2);
    assert!(diagnostics[0].message.contains("v757"));
}

#[test]
fn test_unknown_statement_keeps_all_tokens() {
    let parsed = parse("garbage text.");
    let node = parsed.node(0);
    assert_eq!(node.tokens().len(), 3);
    assert!(node.expressions().next().is_none());
}

#[test]
fn test_statement_tree_has_expressions() {
    let parsed = parse("DATA lv_x TYPE i VALUE 1.");
    let node = parsed.node(0);
    let definition = node.find_direct_expression(ExprKind::DataDefinition).unwrap();
    assert_eq!(
        definition
            .find_direct_expression(ExprKind::DefinitionName)
            .unwrap()
            .concat_tokens(),
        "lv_x"
    );
    assert!(definition.find_direct_expression(ExprKind::Value).is_some());
}
