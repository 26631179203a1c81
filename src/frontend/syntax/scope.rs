//! Spaghetti scope
//!
//! 作用域树：内置 → 程序 → 类实现 / 接口 → 方法 / FORM。离开作用域后节点
//! 依然保留，并记录其覆盖的源码范围，因此任意位置都能映射到唯一的最内层
//! 作用域，供 "这里的名字指向什么" 之类的查询使用。

use indexmap::IndexMap;
use la_arena::{Arena, Idx};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::frontend::core::type_system::AbapType;
use crate::util::span::{Position, Span};

pub type ScopeId = Idx<ScopeData>;

/// 标识符附加信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierMeta {
    /// `DATA(x)` / `FIELD-SYMBOL(<x>)`
    InlineDefinition,
    ReadOnly,
    /// `CLASS-DATA`, `STATICS`, `CLASS-METHODS`
    Static,
    Constant,
    FieldSymbol,
    /// 内置名称（`sy`、`abap_true`、内置类型）
    BuiltIn,
    MethodImporting,
    MethodExporting,
    MethodChanging,
    MethodReturning,
    FormParameter,
    SelectionScreen,
    /// `TABLES` 工作区
    TableWorkArea,
}

/// 已解析的声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedIdentifier {
    /// 声明时的写法
    pub name: String,
    /// 声明所在文件；内置名称为空
    pub filename: String,
    /// 名称 token 的位置
    pub span: Span,
    pub ty: AbapType,
    pub meta: SmallVec<[IdentifierMeta; 2]>,
}

impl TypedIdentifier {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        span: Span,
        ty: AbapType,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            span,
            ty,
            meta: SmallVec::new(),
        }
    }

    /// 内置名称
    pub fn builtin(
        name: impl Into<String>,
        ty: AbapType,
    ) -> Self {
        Self::new(name, "", Span::dummy(), ty).with_meta(IdentifierMeta::BuiltIn)
    }

    pub fn with_meta(
        mut self,
        meta: IdentifierMeta,
    ) -> Self {
        if !self.meta.contains(&meta) {
            self.meta.push(meta);
        }
        self
    }

    pub fn has_meta(
        &self,
        meta: IdentifierMeta,
    ) -> bool {
        self.meta.contains(&meta)
    }

    /// 大小写无关的查找键
    pub fn key(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}

/// 作用域种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    BuiltIn,
    Program,
    ClassDefinition,
    ClassImplementation,
    Interface,
    Method,
    Form,
}

/// 作用域节点
#[derive(Debug, Clone)]
pub struct ScopeData {
    pub kind: ScopeKind,
    /// 程序、类、方法或 FORM 名
    pub name: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// 覆盖范围；内置作用域为 dummy，视为覆盖一切
    pub span: Span,
    vars: IndexMap<String, TypedIdentifier>,
    types: IndexMap<String, TypedIdentifier>,
}

impl ScopeData {
    pub fn new(
        kind: ScopeKind,
        name: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            span,
            vars: IndexMap::new(),
            types: IndexMap::new(),
        }
    }

    /// 添加数据对象；同名已存在时返回旧声明
    pub fn add_variable(
        &mut self,
        identifier: TypedIdentifier,
    ) -> Option<TypedIdentifier> {
        self.vars.insert(identifier.key(), identifier)
    }

    pub fn add_type(
        &mut self,
        identifier: TypedIdentifier,
    ) -> Option<TypedIdentifier> {
        self.types.insert(identifier.key(), identifier)
    }

    pub fn variable(
        &self,
        name: &str,
    ) -> Option<&TypedIdentifier> {
        self.vars.get(&name.to_ascii_uppercase())
    }

    pub fn type_definition(
        &self,
        name: &str,
    ) -> Option<&TypedIdentifier> {
        self.types.get(&name.to_ascii_uppercase())
    }

    /// 按声明顺序
    pub fn variables(&self) -> impl Iterator<Item = &TypedIdentifier> {
        self.vars.values()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypedIdentifier> {
        self.types.values()
    }

    fn covers(
        &self,
        position: Position,
    ) -> bool {
        self.span.is_dummy() || self.span.contains(position)
    }
}

/// 作用域树
#[derive(Debug, Clone)]
pub struct SpaghettiScope {
    scopes: Arena<ScopeData>,
    root: ScopeId,
}

impl SpaghettiScope {
    pub fn new(root: ScopeData) -> Self {
        let mut scopes = Arena::new();
        let root = scopes.alloc(root);
        Self { scopes, root }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn get(
        &self,
        id: ScopeId,
    ) -> &ScopeData {
        &self.scopes[id]
    }

    pub(crate) fn get_mut(
        &mut self,
        id: ScopeId,
    ) -> &mut ScopeData {
        &mut self.scopes[id]
    }

    /// 在 `parent` 下添加子作用域
    pub(crate) fn push(
        &mut self,
        parent: ScopeId,
        mut data: ScopeData,
    ) -> ScopeId {
        data.parent = Some(parent);
        let id = self.scopes.alloc(data);
        self.scopes[parent].children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// 所有作用域，按创建顺序
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &ScopeData)> {
        self.scopes.iter()
    }

    /// `id` 及其所有祖先，由内向外
    pub fn ancestors(
        &self,
        id: ScopeId,
    ) -> impl Iterator<Item = &ScopeData> {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = &self.scopes[next?];
            next = current.parent;
            Some(current)
        })
    }

    /// 包含 `position` 的最内层作用域
    pub fn lookup_position(
        &self,
        position: Position,
    ) -> ScopeId {
        let mut current = self.root;
        'descend: loop {
            for &child in &self.scopes[current].children {
                if self.scopes[child].covers(position) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// 从 `scope` 开始由内向外查找数据对象
    pub fn find_variable(
        &self,
        scope: ScopeId,
        name: &str,
    ) -> Option<&TypedIdentifier> {
        self.ancestors(scope).find_map(|data| data.variable(name))
    }

    pub fn find_type(
        &self,
        scope: ScopeId,
        name: &str,
    ) -> Option<&TypedIdentifier> {
        self.ancestors(scope).find_map(|data| data.type_definition(name))
    }

    /// 在 `position` 处 `name` 指向的数据对象
    pub fn find_variable_in_scope(
        &self,
        name: &str,
        position: Position,
    ) -> Option<&TypedIdentifier> {
        self.find_variable(self.lookup_position(position), name)
    }

    pub fn find_type_in_scope(
        &self,
        name: &str,
        position: Position,
    ) -> Option<&TypedIdentifier> {
        self.find_type(self.lookup_position(position), name)
    }
}
