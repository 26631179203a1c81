//! Type system tests
//!
//! 可赋值性规则、限定名、显示格式，以及基于 quickcheck 的性质测试

use quickcheck::{quickcheck, Arbitrary, Gen};

use crate::frontend::core::type_system::*;

fn named_structure(
    name: &str,
    components: &[(&str, AbapType)],
) -> AbapType {
    AbapType::structure(
        components
            .iter()
            .map(|(n, ty)| Component::new(*n, ty.clone()))
            .collect(),
    )
    .with_name(name)
}

fn header_line_table(row: AbapType) -> AbapType {
    AbapType::Table(TableType {
        row: Box::new(row),
        key: TableKey::default(),
        header_line: true,
        name: None,
    })
}

// ============================================================================
// 基本类型
// ============================================================================

#[test]
fn test_elementary_numeric_and_character_mix() {
    let i = AbapType::integer();
    let s = AbapType::string();
    let p = AbapType::packed(8, 2);
    assert!(assignable(&i, &s));
    assert!(assignable(&s, &i));
    assert!(assignable(&p, &i));
    assert!(assignable(&AbapType::character(10), &AbapType::elementary(ElementaryKind::N)));
}

#[test]
fn test_utclong_rejects_numeric() {
    let ts = AbapType::elementary(ElementaryKind::UtcLong);
    assert!(!assignable(&ts, &AbapType::integer()));
    assert!(!assignable(&AbapType::integer(), &ts));
    assert!(assignable(&ts, &AbapType::string()));
}

#[test]
fn test_keyword_lookup() {
    assert_eq!(ElementaryKind::from_keyword("xstring"), Some(ElementaryKind::XString));
    assert_eq!(ElementaryKind::from_keyword("Int8"), Some(ElementaryKind::Int8));
    assert_eq!(ElementaryKind::from_keyword("zfoo"), None);
    assert_eq!(GenericKind::from_keyword("index  table"), Some(GenericKind::IndexTable));
    assert_eq!(GenericKind::from_keyword("c"), None);
}

// ============================================================================
// 结构与内表
// ============================================================================

#[test]
fn test_structures_compare_components_in_order() {
    let a = named_structure("TY_A", &[("x", AbapType::integer()), ("y", AbapType::string())]);
    let b = named_structure("TY_B", &[("p", AbapType::integer()), ("q", AbapType::string())]);
    let short = named_structure("TY_C", &[("x", AbapType::integer())]);
    assert!(assignable(&a, &b));
    assert!(!assignable(&a, &short));
    assert!(!assignable(&a, &AbapType::object_reference("zcl_foo")));
}

#[test]
fn test_character_structure_acts_as_text() {
    let flat = AbapType::structure(vec![
        Component::new("a", AbapType::character(2)),
        Component::new("b", AbapType::elementary(ElementaryKind::N)),
    ]);
    assert!(assignable(&flat, &AbapType::string()));
    assert!(assignable(&AbapType::character(3), &flat));

    let mixed = AbapType::structure(vec![Component::new("a", AbapType::integer())]);
    assert!(!assignable(&mixed, &AbapType::string()));
}

#[test]
fn test_table_compares_row_only() {
    let mut sorted = AbapType::table(AbapType::integer());
    if let AbapType::Table(table) = &mut sorted {
        table.key = TableKey {
            access: TableAccess::Sorted,
            unique: true,
            fields: vec!["TABLE_LINE".to_string()],
            is_default: false,
        };
    }
    assert!(assignable(&AbapType::table(AbapType::integer()), &sorted));
    assert!(!assignable(&AbapType::table(AbapType::integer()), &AbapType::integer()));
}

#[test]
fn test_header_line_behaves_as_row() {
    let row = named_structure("TY_ROW", &[("id", AbapType::integer())]);
    let itab = header_line_table(row.clone());
    assert!(assignable(&itab, &row));
    assert!(assignable(&row, &itab));
    assert_eq!(itab.component("ID"), Some(&AbapType::integer()));
    assert!(AbapType::table(row).component("id").is_none());
}

// ============================================================================
// 引用与泛型
// ============================================================================

#[test]
fn test_references() {
    let ref_i = AbapType::data_reference(AbapType::integer());
    let ref_data = AbapType::data_reference(AbapType::Generic(GenericKind::Data));
    let ref_struct = AbapType::data_reference(AbapType::structure(vec![]));
    assert!(assignable(&ref_i, &ref_data));
    assert!(!assignable(&ref_i, &ref_struct));
    assert!(assignable(
        &AbapType::object_reference("zcl_a"),
        &AbapType::object_reference("zif_b")
    ));
    assert!(!assignable(&ref_i, &AbapType::object_reference("zcl_a")));
}

#[test]
fn test_generic_targets_accept_by_category() {
    let numeric = AbapType::Generic(GenericKind::Numeric);
    assert!(assignable(&AbapType::packed(8, 2), &numeric));
    assert!(!assignable(&AbapType::string(), &numeric));

    let index_table = AbapType::Generic(GenericKind::IndexTable);
    assert!(assignable(&AbapType::table(AbapType::integer()), &index_table));
    let mut hashed = AbapType::table(AbapType::integer());
    if let AbapType::Table(table) = &mut hashed {
        table.key.access = TableAccess::Hashed;
    }
    assert!(!assignable(&hashed, &index_table));
    assert!(assignable(&hashed, &AbapType::Generic(GenericKind::AnyTable)));

    assert!(assignable(&AbapType::Generic(GenericKind::Any), &AbapType::integer()));
}

// ============================================================================
// 名称与显示
// ============================================================================

#[test]
fn test_qualified_name() {
    assert_eq!(AbapType::integer().qualified_name().as_deref(), Some("I"));
    assert_eq!(
        AbapType::integer().with_name("ZCL_FOO=>TY_ID").qualified_name().as_deref(),
        Some("ZCL_FOO=>TY_ID")
    );
    assert_eq!(AbapType::structure(vec![]).qualified_name(), None);
    assert_eq!(AbapType::Generic(GenericKind::Any).qualified_name(), None);
    assert_eq!(
        AbapType::object_reference("zcl_foo").qualified_name().as_deref(),
        Some("ZCL_FOO")
    );
}

#[test]
fn test_display() {
    assert_eq!(AbapType::character(10).to_string(), "C LENGTH 10");
    assert_eq!(AbapType::packed(8, 2).to_string(), "P LENGTH 8 DECIMALS 2");
    assert_eq!(AbapType::string().to_string(), "STRING");
    assert_eq!(
        AbapType::table(AbapType::string()).to_string(),
        "STANDARD TABLE OF STRING"
    );
    assert_eq!(AbapType::object_reference("zcl_foo").to_string(), "REF TO ZCL_FOO");
}

// ============================================================================
// 性质测试
// ============================================================================

#[derive(Debug, Clone)]
struct ArbType(AbapType);

fn name(g: &mut Gen) -> String {
    let names = ["ZCL_A", "TY_ROW", "CL_GUI", "MARA"];
    g.choose(&names).copied().unwrap_or("X").to_string()
}

fn arbitrary_type(
    g: &mut Gen,
    depth: u32,
) -> AbapType {
    let choices = if depth == 0 { 4 } else { 8 };
    match u8::arbitrary(g) % choices {
        0 => AbapType::elementary(*g.choose(&ElementaryKind::ALL).unwrap()),
        1 => AbapType::Generic(*g.choose(&GenericKind::ALL).unwrap()),
        2 => AbapType::void(name(g)),
        3 => AbapType::object_reference(name(g)),
        4 => {
            let count = usize::arbitrary(g) % 3;
            AbapType::structure(
                (0..count)
                    .map(|i| Component::new(format!("c{}", i), arbitrary_type(g, depth - 1)))
                    .collect(),
            )
        }
        5 => {
            let row = arbitrary_type(g, depth - 1);
            if bool::arbitrary(g) {
                header_line_table(row)
            } else {
                AbapType::table(row)
            }
        }
        6 => AbapType::data_reference(arbitrary_type(g, depth - 1)),
        _ => AbapType::unknown(name(g)),
    }
}

impl Arbitrary for ArbType {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbType(arbitrary_type(g, 3))
    }
}

#[test]
fn test_prop_assignable_is_reflexive() {
    fn prop(ty: ArbType) -> bool {
        assignable(&ty.0, &ty.0)
    }
    quickcheck(prop as fn(ArbType) -> bool);
}

#[test]
fn test_prop_void_is_permissive() {
    fn prop(ty: ArbType) -> bool {
        let void = AbapType::void("CL_MISSING");
        assignable(&void, &ty.0) && assignable(&ty.0, &void)
    }
    quickcheck(prop as fn(ArbType) -> bool);
}

#[test]
fn test_prop_unknown_is_permissive() {
    fn prop(ty: ArbType) -> bool {
        let unknown = AbapType::unknown("not found");
        assignable(&unknown, &ty.0) && assignable(&ty.0, &unknown)
    }
    quickcheck(prop as fn(ArbType) -> bool);
}

#[test]
fn test_prop_any_accepts_everything() {
    fn prop(ty: ArbType) -> bool {
        assignable(&ty.0, &AbapType::Generic(GenericKind::Any))
    }
    quickcheck(prop as fn(ArbType) -> bool);
}
