//! 引用与按位置索引的类型表
//!
//! 解析结果不回写语法树，而是记录在以源码位置为键的旁表中。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scope::TypedIdentifier;
use crate::frontend::core::type_system::AbapType;
use crate::util::span::Span;

/// 引用种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// 读数据对象
    DataRead,
    /// 写数据对象
    DataWrite,
    /// 类型引用（`TYPE ty`）
    Type,
    /// 内联声明，类型由右侧推断
    InferredType,
    /// 方法调用
    MethodReference,
    /// 类或接口引用
    ObjectOriented,
    /// `PERFORM`
    FormReference,
    /// 内置函数
    BuiltinMethod,
    /// 依赖缺失，按 void 处理
    Void,
}

/// 引用目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceTarget {
    Identifier(TypedIdentifier),
    Class(String),
    Interface(String),
    Method { owner: String, name: String },
    /// `FORM` 名与其定义处
    Form { name: String, span: Span },
    Builtin(String),
    /// 位于已分析源码之外
    Void(String),
    /// 解析失败（诊断已报告）
    Unresolved(String),
}

/// 解析过程中记录的一条边
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// 使用处
    pub span: Span,
    pub filename: String,
    pub target: ReferenceTarget,
}

impl Reference {
    /// 目标名（大写）
    pub fn target_name(&self) -> String {
        match &self.target {
            ReferenceTarget::Identifier(identifier) => identifier.key(),
            ReferenceTarget::Method { name, .. } | ReferenceTarget::Form { name, .. } => {
                name.to_ascii_uppercase()
            }
            ReferenceTarget::Class(name)
            | ReferenceTarget::Interface(name)
            | ReferenceTarget::Builtin(name)
            | ReferenceTarget::Void(name)
            | ReferenceTarget::Unresolved(name) => name.to_ascii_uppercase(),
        }
    }
}

/// 源码范围 → 推断出的类型
#[derive(Debug, Clone, Default)]
pub struct ResolvedTypes {
    types: HashMap<(usize, usize), AbapType>,
}

impl ResolvedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        span: Span,
        ty: AbapType,
    ) {
        self.types.insert((span.start.offset, span.end.offset), ty);
    }

    /// 覆盖 `span` 的表达式的类型
    pub fn type_at(
        &self,
        span: Span,
    ) -> Option<&AbapType> {
        self.types.get(&(span.start.offset, span.end.offset))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
