//! 内置作用域
//!
//! 基本类型与泛型类型名、`sy` 系统结构、`abap_true` 等常量，以及内置函数。

use once_cell::sync::Lazy;

use super::scope::{IdentifierMeta, ScopeData, ScopeKind, TypedIdentifier};
use crate::frontend::core::type_system::{
    AbapType, Component, ElementaryKind, GenericKind, TableKey, TableType,
};
use crate::util::span::Span;

/// 内置函数：名称与返回类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub returns: AbapType,
}

fn c(length: u32) -> AbapType {
    AbapType::character(length)
}

fn abap_bool() -> AbapType {
    c(1).with_name("ABAP_BOOL")
}

fn system_fields() -> AbapType {
    let fields = [
        ("SUBRC", AbapType::integer()),
        ("TABIX", AbapType::integer()),
        ("INDEX", AbapType::integer()),
        ("DBCNT", AbapType::integer()),
        ("FDPOS", AbapType::integer()),
        ("LSIND", AbapType::integer()),
        ("DATUM", AbapType::elementary(ElementaryKind::D)),
        ("UZEIT", AbapType::elementary(ElementaryKind::T)),
        ("UNAME", c(12)),
        ("MANDT", c(3)),
        ("LANGU", c(1)),
        ("REPID", c(40)),
        ("CPROG", c(40)),
        ("TCODE", c(20)),
        ("UCOMM", c(70)),
        ("MSGID", c(20)),
        ("MSGTY", c(1)),
        ("MSGNO", AbapType::elementary(ElementaryKind::N).with_name("SYMSGNO")),
        ("MSGV1", c(50)),
        ("MSGV2", c(50)),
        ("MSGV3", c(50)),
        ("MSGV4", c(50)),
        ("BATCH", c(1)),
    ];
    AbapType::structure(
        fields
            .into_iter()
            .map(|(name, ty)| Component::new(name, ty))
            .collect(),
    )
    .with_name("SYST")
}

fn string_table() -> AbapType {
    AbapType::Table(TableType {
        row: Box::new(AbapType::string()),
        key: TableKey::default(),
        header_line: false,
        name: Some("STRING_TABLE".to_string()),
    })
}

static TYPES: Lazy<Vec<TypedIdentifier>> = Lazy::new(|| {
    let mut types: Vec<TypedIdentifier> = ElementaryKind::ALL
        .iter()
        .map(|kind| TypedIdentifier::builtin(kind.keyword(), AbapType::elementary(*kind)))
        .collect();
    types.extend(
        [
            GenericKind::Any,
            GenericKind::Data,
            GenericKind::Simple,
            GenericKind::Clike,
            GenericKind::Csequence,
            GenericKind::Xsequence,
            GenericKind::Numeric,
            GenericKind::Object,
        ]
        .iter()
        .map(|kind| TypedIdentifier::builtin(kind.keyword(), AbapType::Generic(*kind))),
    );
    types.extend([
        TypedIdentifier::builtin("ABAP_BOOL", abap_bool()),
        TypedIdentifier::builtin("SYST", system_fields()),
        TypedIdentifier::builtin("STRING_TABLE", string_table()),
        TypedIdentifier::builtin("ABAP_ENCODING", c(20).with_name("ABAP_ENCODING")),
        TypedIdentifier::builtin("TIMESTAMP", AbapType::packed(8, 0).with_name("TIMESTAMP")),
        TypedIdentifier::builtin("TIMESTAMPL", AbapType::packed(11, 7).with_name("TIMESTAMPL")),
    ]);
    types
});

static VARIABLES: Lazy<Vec<TypedIdentifier>> = Lazy::new(|| {
    let constant = |name: &str, ty: AbapType| {
        TypedIdentifier::builtin(name, ty).with_meta(IdentifierMeta::Constant)
    };
    vec![
        TypedIdentifier::builtin("SY", system_fields()),
        TypedIdentifier::builtin("SYST", system_fields()),
        constant("ABAP_TRUE", abap_bool()),
        constant("ABAP_FALSE", abap_bool()),
        constant("ABAP_UNDEFINED", abap_bool()),
        constant("SPACE", c(1)),
        constant("COL_BACKGROUND", AbapType::integer()),
        constant("COL_HEADING", AbapType::integer()),
        constant("COL_NORMAL", AbapType::integer()),
        constant("COL_TOTAL", AbapType::integer()),
        constant("COL_KEY", AbapType::integer()),
        constant("COL_POSITIVE", AbapType::integer()),
        constant("COL_NEGATIVE", AbapType::integer()),
        constant("COL_GROUP", AbapType::integer()),
    ]
});

static FUNCTIONS: Lazy<Vec<BuiltinFunction>> = Lazy::new(|| {
    let function = |name: &'static str, returns: AbapType| BuiltinFunction { name, returns };
    vec![
        function("LINES", AbapType::integer()),
        function("STRLEN", AbapType::integer()),
        function("XSTRLEN", AbapType::integer()),
        function("NUMOFCHAR", AbapType::integer()),
        function("CONDENSE", AbapType::string()),
        function("TO_UPPER", AbapType::string()),
        function("TO_LOWER", AbapType::string()),
        function("TO_MIXED", AbapType::string()),
        function("SHIFT_LEFT", AbapType::string()),
        function("SHIFT_RIGHT", AbapType::string()),
        function("SUBSTRING", AbapType::string()),
        function("REPLACE", AbapType::string()),
        function("ESCAPE", AbapType::string()),
        function("CONCAT_LINES_OF", AbapType::string()),
        function("REVERSE", AbapType::string()),
        function("REPEAT", AbapType::string()),
        function("SEGMENT", AbapType::string()),
        function("ABS", AbapType::Generic(GenericKind::Numeric)),
        function("SQRT", AbapType::elementary(ElementaryKind::F)),
        function("BOOLC", AbapType::string()),
        function("XSDBOOL", abap_bool()),
        function("FIND", AbapType::integer()),
        function("COUNT", AbapType::integer()),
        function("LINE_EXISTS", abap_bool()),
        function("LINE_INDEX", AbapType::integer()),
    ]
});

/// 按名称查找内置函数
pub fn function(name: &str) -> Option<&'static BuiltinFunction> {
    FUNCTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

/// 构造内置作用域，附加配置中的全局常量（类型为 void）
pub fn scope(global_constants: &[String]) -> ScopeData {
    let mut data = ScopeData::new(ScopeKind::BuiltIn, "_builtin", Span::dummy());
    for ty in TYPES.iter() {
        data.add_type(ty.clone());
    }
    for var in VARIABLES.iter() {
        data.add_variable(var.clone());
    }
    for name in global_constants {
        data.add_variable(
            TypedIdentifier::builtin(name.clone(), AbapType::void(name.to_ascii_uppercase()))
                .with_meta(IdentifierMeta::Constant),
        );
    }
    data
}

/// `TYPE RANGE OF` 的行结构
pub fn range_row(low: AbapType) -> AbapType {
    AbapType::structure(vec![
        Component::new("SIGN", c(1)),
        Component::new("OPTION", c(2)),
        Component::new("LOW", low.clone()),
        Component::new("HIGH", low),
    ])
}

/// `TYPE RANGE OF` 表
pub fn range_table(low: AbapType) -> AbapType {
    AbapType::Table(TableType {
        row: Box::new(range_row(low)),
        key: TableKey::default(),
        header_line: false,
        name: None,
    })
}
