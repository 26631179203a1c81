//! 作用域与语法解析
//!
//! 在结构树上建立 spaghetti scope，解析每个名称、推断表达式类型，并检查
//! 语义错误。分两遍进行：
//!
//! 1. [`collect_definitions`]：收集类与接口签名，所有文件完成后合并为
//!    [`GlobalDefinitions`]；
//! 2. [`resolve`]：以合并后的定义为只读输入，完整解析一个文件。
//!
//! 两遍之间是一道屏障；第二遍各文件互不依赖，可以并行。

mod builtin;
mod calls;
mod declarations;
pub mod definitions;
pub mod dictionary;
pub mod errors;
mod expressions;
pub mod references;
mod resolver;
pub mod scope;
mod statements;

#[cfg(test)]
mod tests;

pub use definitions::{
    ClassDefinition, GlobalDefinitions, InterfaceDefinition, Member, MethodDefinition,
    MethodParameter, ParameterKind, Visibility,
};
pub use dictionary::{Dictionary, EmptyDictionary, FunctionModule, MemoryDictionary, TableDefinition};
pub use errors::SyntaxError;
pub use references::{Reference, ReferenceKind, ReferenceTarget, ResolvedTypes};
pub use scope::{IdentifierMeta, ScopeData, ScopeId, ScopeKind, SpaghettiScope, TypedIdentifier};

use crate::frontend::config::AnalyzeConfig;
use crate::frontend::core::parser::{ExprKind, StatementKind};
use crate::frontend::pipeline::ParsedFile;
use crate::util::diagnostic::Diagnostic;
use resolver::{expression_after, Pass, Resolver};

/// 一个文件的解析结果
#[derive(Debug)]
pub struct SyntaxResult {
    pub filename: String,
    pub scope: SpaghettiScope,
    pub references: Vec<Reference>,
    pub diagnostics: Vec<Diagnostic>,
    pub types: ResolvedTypes,
}

/// 第一遍的结果
#[derive(Debug, Default)]
pub struct DefinitionsOutput {
    pub definitions: GlobalDefinitions,
    /// 类与接口定义中的诊断（签名中的未知类型等）
    pub diagnostics: Vec<Diagnostic>,
    pub references: Vec<Reference>,
}

/// 第一遍：收集本文件的类与接口定义
///
/// `globals` 是之前已收集的其他文件的定义，用于解析父类与接口。
pub fn collect_definitions(
    file: &ParsedFile,
    globals: &GlobalDefinitions,
    config: &AnalyzeConfig,
    dictionary: &dyn Dictionary,
) -> DefinitionsOutput {
    let output = Resolver::new(file, Pass::Definitions, globals, config, dictionary).run();
    DefinitionsOutput {
        definitions: output.definitions,
        diagnostics: output.diagnostics,
        references: output.references,
    }
}

/// 第二遍：完整解析一个文件
pub fn resolve(
    file: &ParsedFile,
    globals: &GlobalDefinitions,
    config: &AnalyzeConfig,
    dictionary: &dyn Dictionary,
) -> SyntaxResult {
    let output = Resolver::new(file, Pass::Full, globals, config, dictionary).run();
    SyntaxResult {
        filename: file.filename.clone(),
        scope: output.scope,
        references: output.references,
        diagnostics: output.diagnostics,
        types: output.types,
    }
}

/// 单文件解析：先收集本文件的定义，再完整解析
pub fn resolve_file(
    file: &ParsedFile,
    config: &AnalyzeConfig,
    dictionary: &dyn Dictionary,
) -> SyntaxResult {
    let collected = collect_definitions(file, &GlobalDefinitions::new(), config, dictionary);
    let mut result = resolve(file, &collected.definitions, config, dictionary);
    let mut diagnostics = collected.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    result
}

/// 文件定义与依赖的类、接口名（大写）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDependencies {
    pub defines: Vec<String>,
    /// 父类与实现的接口
    pub requires: Vec<String>,
    /// 是否只定义接口
    pub interfaces_only: bool,
}

/// 扫描语句得到文件之间的依赖，供第一遍排序
pub fn dependencies(file: &ParsedFile) -> FileDependencies {
    let mut deps = FileDependencies::default();
    let mut classes = 0;
    for statement in &file.statements {
        let node = file.arena.view(&file.tokens, statement.node);
        match statement.kind {
            StatementKind::ClassDefinition => {
                classes += 1;
                if let Some(name) = node.find_direct_expression(ExprKind::ClassName) {
                    deps.defines.push(name.concat_upper());
                }
                if let Some(parent) = expression_after(node, "FROM", ExprKind::ClassName) {
                    deps.requires.push(parent.concat_upper());
                }
            }
            StatementKind::Interface => {
                if let Some(name) = node.find_direct_expression(ExprKind::ClassName) {
                    deps.defines.push(name.concat_upper());
                }
            }
            StatementKind::InterfaceDef => {
                if let Some(name) = node.find_direct_expression(ExprKind::ClassName) {
                    deps.requires.push(name.concat_upper());
                }
            }
            _ => {}
        }
    }
    deps.requires.retain(|name| !deps.defines.contains(name));
    deps.requires.dedup();
    deps.interfaces_only = classes == 0 && !deps.defines.is_empty();
    deps
}
