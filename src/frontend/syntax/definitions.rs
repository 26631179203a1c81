//! 全局定义
//!
//! 类与接口的签名（属性、常量、类型、方法参数），由第一遍从所有文件收集，
//! 之后作为只读数据在各文件的第二遍解析之间共享。

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::scope::TypedIdentifier;
use crate::frontend::core::type_system::AbapType;
use crate::util::span::Span;

/// 可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// 参数方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Importing,
    Exporting,
    Changing,
    Returning,
    /// 函数模块的 `TABLES`
    Tables,
}

/// 方法（或函数模块）参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub ty: AbapType,
    /// `OPTIONAL` 或 `DEFAULT`
    pub optional: bool,
    pub span: Span,
}

impl MethodParameter {
    pub fn new(
        name: impl Into<String>,
        kind: ParameterKind,
        ty: AbapType,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            optional: false,
            span: Span::dummy(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is(
        &self,
        name: &str,
    ) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// 方法签名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    /// `REDEFINITION`：签名取自父类
    pub is_redefinition: bool,
    pub parameters: Vec<MethodParameter>,
    /// `PREFERRED PARAMETER`
    pub preferred: Option<String>,
    pub raising: Vec<String>,
    pub span: Span,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_redefinition: false,
            parameters: Vec::new(),
            preferred: None,
            raising: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn with_parameter(
        mut self,
        parameter: MethodParameter,
    ) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn is(
        &self,
        name: &str,
    ) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn parameter(
        &self,
        name: &str,
    ) -> Option<&MethodParameter> {
        self.parameters.iter().find(|p| p.is(name))
    }

    pub fn parameters_of(
        &self,
        kind: ParameterKind,
    ) -> impl Iterator<Item = &MethodParameter> {
        self.parameters.iter().filter(move |p| p.kind == kind)
    }

    pub fn returning(&self) -> Option<&MethodParameter> {
        self.parameters_of(ParameterKind::Returning).next()
    }

    /// 按位置传参时绑定的 importing 参数：
    /// 首选参数，否则唯一的 importing 参数，否则唯一的必需 importing 参数
    pub fn default_importing(&self) -> Option<&MethodParameter> {
        if let Some(preferred) = &self.preferred {
            return self.parameter(preferred);
        }
        let importing: Vec<&MethodParameter> =
            self.parameters_of(ParameterKind::Importing).collect();
        if importing.len() == 1 {
            return importing.first().copied();
        }
        let required: Vec<&MethodParameter> =
            importing.iter().copied().filter(|p| !p.optional).collect();
        if required.len() == 1 {
            return required.first().copied();
        }
        None
    }

    /// 必须提供的 importing 参数
    pub fn required_importing(&self) -> impl Iterator<Item = &MethodParameter> {
        self.parameters_of(ParameterKind::Importing)
            .filter(|p| !p.optional)
    }
}

/// 属性、常量或类型成员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub identifier: TypedIdentifier,
    pub visibility: Visibility,
}

/// 类定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    pub filename: String,
    pub span: Span,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// `PUBLIC`：全局类
    pub is_global: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub attributes: Vec<Member>,
    pub types: Vec<Member>,
    pub methods: Vec<MethodDefinition>,
}

impl ClassDefinition {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            filename: filename.into(),
            span: Span::dummy(),
            superclass: None,
            interfaces: Vec::new(),
            is_global: false,
            is_abstract: false,
            is_final: false,
            attributes: Vec::new(),
            types: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(
        mut self,
        method: MethodDefinition,
    ) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_attribute(
        mut self,
        identifier: TypedIdentifier,
    ) -> Self {
        self.attributes.push(Member {
            identifier,
            visibility: Visibility::Public,
        });
        self
    }

    pub fn with_superclass(
        mut self,
        superclass: impl Into<String>,
    ) -> Self {
        self.superclass = Some(superclass.into().to_ascii_uppercase());
        self
    }

    pub fn method(
        &self,
        name: &str,
    ) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.is(name))
    }

    pub fn attribute(
        &self,
        name: &str,
    ) -> Option<&Member> {
        self.attributes
            .iter()
            .find(|a| a.identifier.name.eq_ignore_ascii_case(name))
    }

    pub fn type_member(
        &self,
        name: &str,
    ) -> Option<&Member> {
        self.types
            .iter()
            .find(|t| t.identifier.name.eq_ignore_ascii_case(name))
    }
}

/// 接口定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub name: String,
    pub filename: String,
    pub span: Span,
    /// 包含的接口
    pub interfaces: Vec<String>,
    pub is_global: bool,
    pub attributes: Vec<Member>,
    pub types: Vec<Member>,
    pub methods: Vec<MethodDefinition>,
}

impl InterfaceDefinition {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            filename: filename.into(),
            span: Span::dummy(),
            interfaces: Vec::new(),
            is_global: false,
            attributes: Vec::new(),
            types: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(
        mut self,
        method: MethodDefinition,
    ) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(
        &self,
        name: &str,
    ) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.is(name))
    }

    pub fn attribute(
        &self,
        name: &str,
    ) -> Option<&Member> {
        self.attributes
            .iter()
            .find(|a| a.identifier.name.eq_ignore_ascii_case(name))
    }

    pub fn type_member(
        &self,
        name: &str,
    ) -> Option<&Member> {
        self.types
            .iter()
            .find(|t| t.identifier.name.eq_ignore_ascii_case(name))
    }
}

/// 所有文件的类与接口定义
///
/// 同名定义可能出现在多个文件中（各程序的局部类），查找时优先同一文件，
/// 其次是全局定义。
#[derive(Debug, Clone, Default)]
pub struct GlobalDefinitions {
    classes: IndexMap<String, Vec<Arc<ClassDefinition>>>,
    interfaces: IndexMap<String, Vec<Arc<InterfaceDefinition>>>,
}

fn pick<'a, T>(
    candidates: Option<&'a Vec<Arc<T>>>,
    filename: &str,
    file_of: impl Fn(&T) -> &str,
    is_global: impl Fn(&T) -> bool,
) -> Option<Arc<T>> {
    let candidates = candidates?;
    candidates
        .iter()
        .find(|d| file_of(d) == filename)
        .or_else(|| candidates.iter().find(|d| is_global(d)))
        .or_else(|| candidates.first())
        .cloned()
}

impl GlobalDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(
        &mut self,
        class: ClassDefinition,
    ) {
        self.classes
            .entry(class.name.clone())
            .or_default()
            .push(Arc::new(class));
    }

    pub fn add_interface(
        &mut self,
        interface: InterfaceDefinition,
    ) {
        self.interfaces
            .entry(interface.name.clone())
            .or_default()
            .push(Arc::new(interface));
    }

    /// 合并另一组定义（第一遍逐文件累积）
    pub fn extend(
        &mut self,
        other: GlobalDefinitions,
    ) {
        for (name, list) in other.classes {
            self.classes.entry(name).or_default().extend(list);
        }
        for (name, list) in other.interfaces {
            self.interfaces.entry(name).or_default().extend(list);
        }
    }

    /// 从 `filename` 中看到的类
    pub fn class(
        &self,
        name: &str,
        filename: &str,
    ) -> Option<Arc<ClassDefinition>> {
        pick(
            self.classes.get(&name.to_ascii_uppercase()),
            filename,
            |c| c.filename.as_str(),
            |c| c.is_global,
        )
    }

    pub fn interface(
        &self,
        name: &str,
        filename: &str,
    ) -> Option<Arc<InterfaceDefinition>> {
        pick(
            self.interfaces.get(&name.to_ascii_uppercase()),
            filename,
            |i| i.filename.as_str(),
            |i| i.is_global,
        )
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassDefinition>> {
        self.classes.values().flatten()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Arc<InterfaceDefinition>> {
        self.interfaces.values().flatten()
    }

    pub fn class_count(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.values().map(Vec::len).sum()
    }
}
