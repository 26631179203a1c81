//! 类型定义
//!
//! - [`AbapType`]: 解析后的数据类型
//! - [`StructureType`] / [`TableType`]: 结构与内表
//! - [`ElementaryKind`] / [`GenericKind`]: 内置类型关键字

use std::fmt;

use serde::{Deserialize, Serialize};

/// 基本类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryKind {
    I,
    Int8,
    P,
    F,
    DecFloat16,
    DecFloat34,
    C,
    N,
    D,
    T,
    String,
    X,
    XString,
    UtcLong,
}

impl ElementaryKind {
    pub const ALL: [ElementaryKind; 14] = [
        ElementaryKind::I,
        ElementaryKind::Int8,
        ElementaryKind::P,
        ElementaryKind::F,
        ElementaryKind::DecFloat16,
        ElementaryKind::DecFloat34,
        ElementaryKind::C,
        ElementaryKind::N,
        ElementaryKind::D,
        ElementaryKind::T,
        ElementaryKind::String,
        ElementaryKind::X,
        ElementaryKind::XString,
        ElementaryKind::UtcLong,
    ];

    /// 类型关键字（大写）
    pub fn keyword(self) -> &'static str {
        match self {
            ElementaryKind::I => "I",
            ElementaryKind::Int8 => "INT8",
            ElementaryKind::P => "P",
            ElementaryKind::F => "F",
            ElementaryKind::DecFloat16 => "DECFLOAT16",
            ElementaryKind::DecFloat34 => "DECFLOAT34",
            ElementaryKind::C => "C",
            ElementaryKind::N => "N",
            ElementaryKind::D => "D",
            ElementaryKind::T => "T",
            ElementaryKind::String => "STRING",
            ElementaryKind::X => "X",
            ElementaryKind::XString => "XSTRING",
            ElementaryKind::UtcLong => "UTCLONG",
        }
    }

    /// 按关键字查找（大小写不敏感）
    pub fn from_keyword(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(name))
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ElementaryKind::I
                | ElementaryKind::Int8
                | ElementaryKind::P
                | ElementaryKind::F
                | ElementaryKind::DecFloat16
                | ElementaryKind::DecFloat34
        )
    }

    pub fn is_character_like(self) -> bool {
        matches!(
            self,
            ElementaryKind::C
                | ElementaryKind::N
                | ElementaryKind::D
                | ElementaryKind::T
                | ElementaryKind::String
        )
    }

    pub fn is_byte_like(self) -> bool {
        matches!(self, ElementaryKind::X | ElementaryKind::XString)
    }

    /// 未指定 LENGTH 时的长度
    pub fn default_length(self) -> Option<u32> {
        match self {
            ElementaryKind::C | ElementaryKind::N | ElementaryKind::X => Some(1),
            ElementaryKind::P | ElementaryKind::D => Some(8),
            ElementaryKind::T => Some(6),
            _ => None,
        }
    }

    /// 是否可带 LENGTH 附加
    pub fn has_length(self) -> bool {
        matches!(
            self,
            ElementaryKind::C | ElementaryKind::N | ElementaryKind::X | ElementaryKind::P
        )
    }
}

/// 泛型类型（只能用于参数和字段符号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericKind {
    Any,
    Data,
    Simple,
    Clike,
    Csequence,
    Xsequence,
    Numeric,
    Object,
    AnyTable,
    IndexTable,
    /// 不带长度的 `c`
    C,
    N,
    P,
    X,
}

impl GenericKind {
    pub const ALL: [GenericKind; 14] = [
        GenericKind::Any,
        GenericKind::Data,
        GenericKind::Simple,
        GenericKind::Clike,
        GenericKind::Csequence,
        GenericKind::Xsequence,
        GenericKind::Numeric,
        GenericKind::Object,
        GenericKind::AnyTable,
        GenericKind::IndexTable,
        GenericKind::C,
        GenericKind::N,
        GenericKind::P,
        GenericKind::X,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            GenericKind::Any => "ANY",
            GenericKind::Data => "DATA",
            GenericKind::Simple => "SIMPLE",
            GenericKind::Clike => "CLIKE",
            GenericKind::Csequence => "CSEQUENCE",
            GenericKind::Xsequence => "XSEQUENCE",
            GenericKind::Numeric => "NUMERIC",
            GenericKind::Object => "OBJECT",
            GenericKind::AnyTable => "ANY TABLE",
            GenericKind::IndexTable => "INDEX TABLE",
            GenericKind::C => "C",
            GenericKind::N => "N",
            GenericKind::P => "P",
            GenericKind::X => "X",
        }
    }

    /// 按关键字查找；`c`/`n`/`p`/`x` 不在此列，它们首先是基本类型
    pub fn from_keyword(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let kind = match upper.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "ANY" => GenericKind::Any,
            "DATA" => GenericKind::Data,
            "SIMPLE" => GenericKind::Simple,
            "CLIKE" => GenericKind::Clike,
            "CSEQUENCE" => GenericKind::Csequence,
            "XSEQUENCE" => GenericKind::Xsequence,
            "NUMERIC" => GenericKind::Numeric,
            "OBJECT" => GenericKind::Object,
            "ANY TABLE" => GenericKind::AnyTable,
            "INDEX TABLE" => GenericKind::IndexTable,
            _ => return None,
        };
        Some(kind)
    }

    /// 实际类型能否绑定到该泛型
    pub fn accepts(
        self,
        ty: &AbapType,
    ) -> bool {
        let ty = ty.behaves_as();
        if ty.is_permissive() || ty.is_generic() {
            return true;
        }
        let elementary = ty.elementary_kind();
        match self {
            GenericKind::Any | GenericKind::Data => true,
            GenericKind::Simple => elementary.is_some(),
            GenericKind::Clike => {
                elementary.is_some_and(ElementaryKind::is_character_like)
                    || matches!(ty, AbapType::Structure(s) if s.is_character_like())
            }
            GenericKind::Csequence => elementary
                .is_some_and(|kind| matches!(kind, ElementaryKind::C | ElementaryKind::String)),
            GenericKind::Xsequence => elementary.is_some_and(ElementaryKind::is_byte_like),
            GenericKind::Numeric => elementary.is_some_and(ElementaryKind::is_numeric),
            GenericKind::Object => matches!(ty, AbapType::ObjectReference(_)),
            GenericKind::AnyTable => ty.is_table(),
            GenericKind::IndexTable => match ty {
                AbapType::Table(table) => table.key.access.is_index(),
                _ => false,
            },
            GenericKind::C => elementary == Some(ElementaryKind::C),
            GenericKind::N => elementary == Some(ElementaryKind::N),
            GenericKind::P => elementary == Some(ElementaryKind::P),
            GenericKind::X => elementary == Some(ElementaryKind::X),
        }
    }
}

/// 结构组件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub ty: AbapType,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        ty: AbapType,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// 结构类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureType {
    pub components: Vec<Component>,
    pub name: Option<String>,
}

impl StructureType {
    /// 按名称查找组件（大小写不敏感）
    pub fn component(
        &self,
        name: &str,
    ) -> Option<&AbapType> {
        self.components
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| &c.ty)
    }

    /// 所有组件都是字符型（可以当作 `c` 使用）
    pub fn is_character_like(&self) -> bool {
        self.components.iter().all(|c| match &c.ty {
            AbapType::Elementary { kind, .. } => {
                kind.is_character_like() && *kind != ElementaryKind::String
            }
            AbapType::Structure(inner) => inner.is_character_like(),
            other => other.is_permissive(),
        })
    }
}

/// 内表访问方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableAccess {
    Standard,
    Sorted,
    Hashed,
    /// `ANY TABLE`
    Any,
    /// `INDEX TABLE`
    Index,
}

impl TableAccess {
    /// 支持索引访问
    pub fn is_index(self) -> bool {
        matches!(
            self,
            TableAccess::Standard | TableAccess::Sorted | TableAccess::Index
        )
    }

    pub fn keyword(self) -> &'static str {
        match self {
            TableAccess::Standard => "STANDARD",
            TableAccess::Sorted => "SORTED",
            TableAccess::Hashed => "HASHED",
            TableAccess::Any => "ANY",
            TableAccess::Index => "INDEX",
        }
    }
}

/// 主键定义（对可赋值性无影响）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableKey {
    pub access: TableAccess,
    pub unique: bool,
    pub fields: Vec<String>,
    /// `WITH DEFAULT KEY` 或未指定
    pub is_default: bool,
}

impl Default for TableKey {
    fn default() -> Self {
        Self {
            access: TableAccess::Standard,
            unique: false,
            fields: Vec::new(),
            is_default: true,
        }
    }
}

/// 内表类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableType {
    pub row: Box<AbapType>,
    pub key: TableKey,
    /// 带表头行（`OCCURS` / `WITH HEADER LINE`）
    pub header_line: bool,
    pub name: Option<String>,
}

/// 数据类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbapType {
    /// 基本类型，`length`/`decimals` 只对带长度的种类有意义
    Elementary {
        kind: ElementaryKind,
        length: Option<u32>,
        decimals: Option<u32>,
        name: Option<String>,
    },
    /// 结构：有序的命名组件
    Structure(StructureType),
    /// 内表
    Table(TableType),
    /// `REF TO data`
    DataReference {
        target: Box<AbapType>,
        name: Option<String>,
    },
    /// `REF TO` 类或接口
    ObjectReference(String),
    /// 泛型占位（无类型字段符号、泛型参数）
    Generic(GenericKind),
    /// 定义位于已分析源码之外；不是错误
    Void(String),
    /// 解析失败，附原因
    Unknown(String),
}

impl AbapType {
    /// 带默认长度的基本类型
    pub fn elementary(kind: ElementaryKind) -> Self {
        AbapType::Elementary {
            kind,
            length: kind.default_length(),
            decimals: None,
            name: None,
        }
    }

    pub fn integer() -> Self {
        Self::elementary(ElementaryKind::I)
    }

    pub fn string() -> Self {
        Self::elementary(ElementaryKind::String)
    }

    pub fn character(length: u32) -> Self {
        AbapType::Elementary {
            kind: ElementaryKind::C,
            length: Some(length),
            decimals: None,
            name: None,
        }
    }

    pub fn packed(
        length: u32,
        decimals: u32,
    ) -> Self {
        AbapType::Elementary {
            kind: ElementaryKind::P,
            length: Some(length),
            decimals: Some(decimals),
            name: None,
        }
    }

    pub fn structure(components: Vec<Component>) -> Self {
        AbapType::Structure(StructureType {
            components,
            name: None,
        })
    }

    /// 默认键的标准表
    pub fn table(row: AbapType) -> Self {
        AbapType::Table(TableType {
            row: Box::new(row),
            key: TableKey::default(),
            header_line: false,
            name: None,
        })
    }

    pub fn data_reference(target: AbapType) -> Self {
        AbapType::DataReference {
            target: Box::new(target),
            name: None,
        }
    }

    pub fn object_reference(class: impl Into<String>) -> Self {
        AbapType::ObjectReference(class.into().to_ascii_uppercase())
    }

    pub fn void(name: impl Into<String>) -> Self {
        AbapType::Void(name.into())
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        AbapType::Unknown(reason.into())
    }

    /// 附加限定名；引用对象、泛型、void、unknown 不受影响
    pub fn with_name(
        mut self,
        qualified: impl Into<String>,
    ) -> Self {
        let qualified = qualified.into();
        match &mut self {
            AbapType::Elementary { name, .. } | AbapType::DataReference { name, .. } => {
                *name = Some(qualified)
            }
            AbapType::Structure(structure) => structure.name = Some(qualified),
            AbapType::Table(table) => table.name = Some(qualified),
            _ => {}
        }
        self
    }

    /// 限定名：用于生成声明时回写类型；匿名与泛型类型没有
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            AbapType::Elementary { kind, name, .. } => {
                Some(name.clone().unwrap_or_else(|| kind.keyword().to_string()))
            }
            AbapType::Structure(structure) => structure.name.clone(),
            AbapType::Table(table) => table.name.clone(),
            AbapType::DataReference { name, .. } => name.clone(),
            AbapType::ObjectReference(class) => Some(class.clone()),
            AbapType::Void(name) => Some(name.clone()),
            AbapType::Generic(_) | AbapType::Unknown(_) => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, AbapType::Void(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AbapType::Unknown(_))
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, AbapType::Generic(_))
    }

    /// void 或 unknown：任何检查都通过
    pub fn is_permissive(&self) -> bool {
        matches!(self, AbapType::Void(_) | AbapType::Unknown(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self, AbapType::Table(_))
            || matches!(
                self,
                AbapType::Generic(GenericKind::AnyTable | GenericKind::IndexTable)
            )
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, AbapType::Structure(_))
    }

    pub fn is_object_reference(&self) -> bool {
        matches!(
            self,
            AbapType::ObjectReference(_) | AbapType::Generic(GenericKind::Object)
        )
    }

    pub fn is_data_reference(&self) -> bool {
        matches!(self, AbapType::DataReference { .. })
    }

    pub fn elementary_kind(&self) -> Option<ElementaryKind> {
        match self {
            AbapType::Elementary { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.elementary_kind().is_some_and(ElementaryKind::is_numeric)
    }

    pub fn is_character_like(&self) -> bool {
        self.elementary_kind()
            .is_some_and(ElementaryKind::is_character_like)
    }

    /// 内表的行类型
    pub fn row_type(&self) -> Option<&AbapType> {
        match self {
            AbapType::Table(table) => Some(&table.row),
            _ => None,
        }
    }

    pub fn has_header_line(&self) -> bool {
        matches!(self, AbapType::Table(table) if table.header_line)
    }

    /// 带表头行的内表在非表上下文中表现为其行
    pub fn behaves_as(&self) -> &AbapType {
        match self {
            AbapType::Table(table) if table.header_line => &table.row,
            other => other,
        }
    }

    /// 结构组件；带表头行的内表查找行组件
    pub fn component(
        &self,
        name: &str,
    ) -> Option<&AbapType> {
        match self.behaves_as() {
            AbapType::Structure(structure) => structure.component(name),
            _ => None,
        }
    }

    pub fn components(&self) -> &[Component] {
        match self.behaves_as() {
            AbapType::Structure(structure) => &structure.components,
            _ => &[],
        }
    }

    /// 类型名称（用于诊断消息）
    pub fn type_name(&self) -> String {
        match self {
            AbapType::Elementary {
                kind,
                length,
                decimals,
                ..
            } => {
                let mut text = kind.keyword().to_string();
                if kind.has_length() {
                    if let Some(length) = length {
                        text.push_str(&format!(" LENGTH {}", length));
                    }
                }
                if let Some(decimals) = decimals {
                    text.push_str(&format!(" DECIMALS {}", decimals));
                }
                text
            }
            AbapType::Structure(structure) => match &structure.name {
                Some(name) => name.clone(),
                None => {
                    let components: Vec<String> = structure
                        .components
                        .iter()
                        .map(|c| format!("{} TYPE {}", c.name, c.ty.type_name()))
                        .collect();
                    format!("BEGIN OF {} END OF", components.join(", "))
                }
            },
            AbapType::Table(table) => match &table.name {
                Some(name) => name.clone(),
                None => {
                    let mut text = format!(
                        "{} TABLE OF {}",
                        table.key.access.keyword(),
                        table.row.type_name()
                    );
                    if table.header_line {
                        text.push_str(" WITH HEADER LINE");
                    }
                    text
                }
            },
            AbapType::DataReference { target, name } => match name {
                Some(name) => name.clone(),
                None => format!("REF TO {}", target.type_name()),
            },
            AbapType::ObjectReference(class) => format!("REF TO {}", class),
            AbapType::Generic(kind) => kind.keyword().to_string(),
            AbapType::Void(name) => format!("VOID({})", name),
            AbapType::Unknown(reason) => format!("UNKNOWN({})", reason),
        }
    }
}

impl fmt::Display for AbapType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
