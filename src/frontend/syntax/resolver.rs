//! 解析驱动
//!
//! 沿结构树遍历一个文件。第一遍（[`Pass::Definitions`]）只收集类与接口
//! 定义，顶层声明静默处理以便定义中能引用它们；第二遍（[`Pass::Full`]）
//! 建立完整的作用域树，解析每条语句并记录引用与诊断。
//!
//! 语句处理函数返回 [`Result`]，出错时由 [`Resolver::visit_statement`]
//! 转换为诊断后继续下一条语句。

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use super::builtin;
use super::definitions::{
    ClassDefinition, GlobalDefinitions, InterfaceDefinition, Member, MethodDefinition, Visibility,
};
use super::dictionary::Dictionary;
use super::errors::{Result, SyntaxError};
use super::references::{Reference, ReferenceKind, ReferenceTarget, ResolvedTypes};
use super::scope::{
    IdentifierMeta, ScopeData, ScopeId, ScopeKind, SpaghettiScope, TypedIdentifier,
};
use crate::frontend::config::AnalyzeConfig;
use crate::frontend::core::parser::{ChildRef, ExprKind, NodeRef, StatementKind};
use crate::frontend::core::structure::{BlockKind, StructureChild, StructureNode};
use crate::frontend::core::type_system::AbapType;
use crate::frontend::pipeline::ParsedFile;
use crate::util::diagnostic::Diagnostic;
use crate::util::span::{Position, Span};

/// 继承链的最大深度，防止循环继承
pub(crate) const MAX_HIERARCHY_DEPTH: usize = 32;

/// 遍历模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// 收集类与接口定义
    Definitions,
    /// 完整解析
    Full,
}

/// 成员种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberKind {
    Attribute,
    Type,
}

/// 正在收集的类或接口定义
#[derive(Debug, Default)]
pub(crate) struct MemberCollector {
    pub visibility: Visibility,
    /// 本定义自己声明的成员（键为大写名）
    pub declared: IndexMap<String, Visibility>,
    pub methods: Vec<MethodDefinition>,
    pub interfaces: Vec<String>,
}

/// `FORM` 签名
#[derive(Debug, Clone)]
pub(crate) struct FormDefinition {
    pub name: String,
    pub span: Span,
}

/// 一次遍历的结果
#[derive(Debug)]
pub(crate) struct ResolverOutput {
    pub scope: SpaghettiScope,
    pub references: Vec<Reference>,
    pub diagnostics: Vec<Diagnostic>,
    pub types: ResolvedTypes,
    pub definitions: GlobalDefinitions,
}

pub(crate) struct Resolver<'a> {
    pub(crate) file: &'a ParsedFile,
    pub(crate) pass: Pass,
    pub(crate) globals: &'a GlobalDefinitions,
    pub(crate) dictionary: &'a dyn Dictionary,
    namespace: Regex,
    pub(crate) scope: SpaghettiScope,
    pub(crate) current: ScopeId,
    /// 本文件第一遍收集到的定义
    pub(crate) local: GlobalDefinitions,
    pub(crate) forms: IndexMap<String, FormDefinition>,
    references: Vec<Reference>,
    diagnostics: Vec<Diagnostic>,
    pub(crate) types: ResolvedTypes,
    /// 不记录诊断与引用
    silent: bool,
    pub(crate) loop_depth: usize,
    /// 当前所在的类（定义或实现）
    pub(crate) class_context: Option<String>,
    pub(crate) collecting: Option<MemberCollector>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        file: &'a ParsedFile,
        pass: Pass,
        globals: &'a GlobalDefinitions,
        config: &AnalyzeConfig,
        dictionary: &'a dyn Dictionary,
    ) -> Self {
        let mut scope = SpaghettiScope::new(builtin::scope(&config.global_constants));
        let end = file.source.position_from_offset(file.source.content.len());
        let program_span = Span::new(
            Position::with_offset(1, 1, 0),
            Position::with_offset(end.line, end.column + 1, end.offset),
        );
        let program = scope.push(
            scope.root(),
            ScopeData::new(ScopeKind::Program, file.filename.clone(), program_span),
        );
        Self {
            file,
            pass,
            globals,
            dictionary,
            namespace: config.error_namespace_regex(),
            scope,
            current: program,
            local: GlobalDefinitions::new(),
            forms: IndexMap::new(),
            references: Vec::new(),
            diagnostics: Vec::new(),
            types: ResolvedTypes::new(),
            silent: pass == Pass::Definitions,
            loop_depth: 0,
            class_context: None,
            collecting: None,
        }
    }

    pub(crate) fn run(mut self) -> ResolverOutput {
        tracing::debug!("resolving {} ({:?})", self.file.filename, self.pass);
        if self.pass == Pass::Full {
            self.hoist_forms();
        }
        let root = &self.file.structure;
        self.visit_children(root);
        tracing::debug!(
            "resolved {}: {} scopes, {} references, {} diagnostics",
            self.file.filename,
            self.scope.len(),
            self.references.len(),
            self.diagnostics.len()
        );
        ResolverOutput {
            scope: self.scope,
            references: self.references,
            diagnostics: self.diagnostics,
            types: self.types,
            definitions: self.local,
        }
    }

    // ------------------------------------------------------------------
    // 结构遍历
    // ------------------------------------------------------------------

    fn visit_children(
        &mut self,
        node: &'a StructureNode,
    ) {
        for child in node.children() {
            match child {
                StructureChild::Statement(index) => self.visit_statement(*index),
                StructureChild::Structure(inner) => self.visit_structure(inner),
            }
        }
    }

    fn visit_structure(
        &mut self,
        node: &'a StructureNode,
    ) {
        match node.kind() {
            BlockKind::Program => self.visit_children(node),
            BlockKind::ClassDefinition => self.visit_class_definition(node),
            BlockKind::Interface => self.visit_interface(node),
            BlockKind::TypesBegin | BlockKind::DataBegin | BlockKind::ConstantsBegin => {
                if let Err(error) = self.declare_begin_block(node) {
                    self.report(error);
                }
            }
            _ if self.pass == Pass::Definitions => {}
            BlockKind::ClassImplementation => self.visit_class_implementation(node),
            BlockKind::Method => self.visit_method(node),
            BlockKind::Form => self.visit_form(node),
            BlockKind::Do | BlockKind::While | BlockKind::Loop => {
                self.visit_opener(node);
                self.loop_depth += 1;
                self.visit_children(node);
                self.loop_depth -= 1;
            }
            BlockKind::If | BlockKind::Case | BlockKind::Try => {
                self.visit_opener(node);
                self.visit_children(node);
            }
        }
    }

    fn visit_opener(
        &mut self,
        node: &StructureNode,
    ) {
        if let Some(opener) = node.opener() {
            self.visit_statement(opener);
        }
    }

    pub(crate) fn visit_statement(
        &mut self,
        index: usize,
    ) {
        let kind = self.file.statements[index].kind;
        if self.pass == Pass::Definitions && self.collecting.is_none() && !is_declaration(kind) {
            return;
        }
        if let Err(error) = self.statement(index) {
            self.recover_inline_declarations(self.statement_node(index), &error);
            self.report(error);
        }
    }

    /// 第 `index` 条语句的节点
    pub(crate) fn statement_node(
        &self,
        index: usize,
    ) -> NodeRef<'a> {
        let file = self.file;
        file.arena.view(&file.tokens, file.statements[index].node)
    }

    fn opener_node(
        &self,
        node: &StructureNode,
    ) -> Option<NodeRef<'a>> {
        node.opener().map(|index| self.statement_node(index))
    }

    fn hoist_forms(&mut self) {
        let file = self.file;
        for statement in &file.statements {
            if statement.kind != StatementKind::Form {
                continue;
            }
            let node = file.arena.view(&file.tokens, statement.node);
            if let Some(name) = node.find_direct_expression(ExprKind::FormName) {
                self.forms
                    .entry(name.concat_upper())
                    .or_insert(FormDefinition {
                        name: name.concat_tokens(),
                        span: name.span(),
                    });
            }
        }
    }

    // ------------------------------------------------------------------
    // 作用域
    // ------------------------------------------------------------------

    pub(crate) fn push_scope(
        &mut self,
        kind: ScopeKind,
        name: impl Into<String>,
        span: Span,
    ) -> ScopeId {
        let name = name.into();
        tracing::trace!("enter {:?} scope {}", kind, name);
        self.current = self
            .scope
            .push(self.current, ScopeData::new(kind, name, span));
        self.current
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(parent) = self.scope.get(self.current).parent {
            tracing::trace!("leave scope {}", self.scope.get(self.current).name);
            self.current = parent;
        }
    }

    pub(crate) fn current_kind(&self) -> ScopeKind {
        self.scope.get(self.current).kind
    }

    /// 在当前作用域声明数据对象
    pub(crate) fn declare_variable(
        &mut self,
        identifier: TypedIdentifier,
    ) -> Result<()> {
        let key = identifier.key();
        if let Some(existing) = self.scope.get(self.current).variable(&key) {
            if !existing.has_meta(IdentifierMeta::BuiltIn) {
                return Err(SyntaxError::AlreadyDefined {
                    name: identifier.name,
                    span: identifier.span,
                });
            }
        }
        if let Some(collector) = self.collecting.as_mut() {
            collector.declared.insert(key, collector.visibility);
        }
        self.scope.get_mut(self.current).add_variable(identifier);
        Ok(())
    }

    /// 在当前作用域声明类型
    pub(crate) fn declare_type(
        &mut self,
        identifier: TypedIdentifier,
    ) -> Result<()> {
        let key = identifier.key();
        if let Some(existing) = self.scope.get(self.current).type_definition(&key) {
            if !existing.has_meta(IdentifierMeta::BuiltIn) {
                return Err(SyntaxError::AlreadyDefined {
                    name: identifier.name,
                    span: identifier.span,
                });
            }
        }
        if let Some(collector) = self.collecting.as_mut() {
            collector.declared.insert(key, collector.visibility);
        }
        self.scope.get_mut(self.current).add_type(identifier);
        Ok(())
    }

    /// 类型的限定名：类或接口内的类型带 `owner=>` 前缀
    pub(crate) fn qualify(
        &self,
        name: &str,
    ) -> String {
        let upper = name.to_ascii_uppercase();
        match (&self.class_context, self.current_kind()) {
            (
                Some(owner),
                ScopeKind::ClassDefinition | ScopeKind::ClassImplementation | ScopeKind::Interface,
            ) => format!("{}=>{}", owner, upper),
            _ => upper,
        }
    }

    // ------------------------------------------------------------------
    // 诊断与引用
    // ------------------------------------------------------------------

    pub(crate) fn report(
        &mut self,
        error: SyntaxError,
    ) {
        tracing::debug!("{}: {}", self.file.filename, error);
        if !self.silent {
            self.diagnostics.push(error.to_diagnostic(&self.file.filename));
        }
    }

    pub(crate) fn reference(
        &mut self,
        kind: ReferenceKind,
        span: Span,
        target: ReferenceTarget,
    ) {
        if self.silent {
            return;
        }
        self.references.push(Reference {
            kind,
            span,
            filename: self.file.filename.clone(),
            target,
        });
    }

    pub(crate) fn record_type(
        &mut self,
        span: Span,
        ty: &AbapType,
    ) {
        if !self.silent {
            self.types.insert(span, ty.clone());
        }
    }

    /// 名称是否必须能在已分析源码中找到
    pub(crate) fn in_namespace(
        &self,
        name: &str,
    ) -> bool {
        self.namespace.is_match(name)
    }

    /// 找不到的名称：命名空间内报错，否则按 void 处理
    pub(crate) fn void_or(
        &mut self,
        name: &str,
        span: Span,
        error: SyntaxError,
    ) -> Result<AbapType> {
        if self.in_namespace(name) {
            return Err(error);
        }
        self.reference(
            ReferenceKind::Void,
            span,
            ReferenceTarget::Void(name.to_ascii_uppercase()),
        );
        Ok(AbapType::void(name.to_ascii_uppercase()))
    }

    // ------------------------------------------------------------------
    // 类与接口查找
    // ------------------------------------------------------------------

    pub(crate) fn find_class(
        &self,
        name: &str,
    ) -> Option<Arc<ClassDefinition>> {
        let filename = &self.file.filename;
        self.local
            .class(name, filename)
            .or_else(|| self.globals.class(name, filename))
            .or_else(|| self.dictionary.lookup_class(name))
    }

    pub(crate) fn find_interface(
        &self,
        name: &str,
    ) -> Option<Arc<InterfaceDefinition>> {
        let filename = &self.file.filename;
        self.local
            .interface(name, filename)
            .or_else(|| self.globals.interface(name, filename))
            .or_else(|| self.dictionary.lookup_interface(name))
    }

    /// 类或接口是否已知
    pub(crate) fn is_known_class_or_interface(
        &self,
        name: &str,
    ) -> bool {
        self.find_class(name).is_some() || self.find_interface(name).is_some()
    }

    /// 引用类或接口名；未知时按命名空间决定报错或 void
    pub(crate) fn resolve_class_name(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let name = node.concat_upper();
        if self.find_class(&name).is_some() {
            self.reference(
                ReferenceKind::ObjectOriented,
                node.span(),
                ReferenceTarget::Class(name),
            );
        } else if self.find_interface(&name).is_some() {
            self.reference(
                ReferenceKind::ObjectOriented,
                node.span(),
                ReferenceTarget::Interface(name),
            );
        } else if self.class_context.as_deref() == Some(name.as_str()) {
            self.reference(
                ReferenceKind::ObjectOriented,
                node.span(),
                ReferenceTarget::Class(name),
            );
        } else {
            let span = node.span();
            self.void_or(&name, span, SyntaxError::ClassNotFound { name: name.clone(), span })?;
        }
        Ok(())
    }

    /// 类或接口（含父类、接口）中的属性或类型成员
    pub(crate) fn class_member(
        &self,
        owner: &str,
        name: &str,
        kind: MemberKind,
    ) -> Option<TypedIdentifier> {
        if let Some((interface, member)) = name.split_once('~') {
            return self.interface_member(interface, member, kind, 0);
        }
        if self.collecting.is_some() && self.class_context.as_deref() == Some(owner) {
            let scope = self.scope.get(self.current);
            let found = match kind {
                MemberKind::Attribute => scope.variable(name),
                MemberKind::Type => scope.type_definition(name),
            };
            if found.is_some() {
                return found.cloned();
            }
        }
        if self.find_class(owner).is_some() {
            self.class_member_in(owner, name, kind, 0)
        } else {
            self.interface_member(owner, name, kind, 0)
        }
    }

    fn class_member_in(
        &self,
        class_name: &str,
        name: &str,
        kind: MemberKind,
        depth: usize,
    ) -> Option<TypedIdentifier> {
        if depth > MAX_HIERARCHY_DEPTH {
            return None;
        }
        let class = self.find_class(class_name)?;
        let members = match kind {
            MemberKind::Attribute => &class.attributes,
            MemberKind::Type => &class.types,
        };
        if let Some(member) = find_member(members, name) {
            return Some(member.identifier.clone());
        }
        for interface in &class.interfaces {
            if let Some(found) = self.interface_member(interface, name, kind, depth + 1) {
                return Some(found);
            }
        }
        let superclass = class.superclass.as_deref()?;
        self.class_member_in(superclass, name, kind, depth + 1)
    }

    fn interface_member(
        &self,
        interface_name: &str,
        name: &str,
        kind: MemberKind,
        depth: usize,
    ) -> Option<TypedIdentifier> {
        if depth > MAX_HIERARCHY_DEPTH {
            return None;
        }
        let interface = self.find_interface(interface_name)?;
        let members = match kind {
            MemberKind::Attribute => &interface.attributes,
            MemberKind::Type => &interface.types,
        };
        if let Some(member) = find_member(members, name) {
            return Some(member.identifier.clone());
        }
        interface
            .interfaces
            .iter()
            .find_map(|inner| self.interface_member(inner, name, kind, depth + 1))
    }

    /// 在类（或接口）层次中查找方法，返回声明它的类型名与签名
    ///
    /// `REDEFINITION` 沿父类链取原始签名；`zif~m` 在接口中查找。
    pub(crate) fn find_method(
        &self,
        owner: &str,
        method: &str,
    ) -> Option<(String, MethodDefinition)> {
        if let Some((interface, name)) = method.split_once('~') {
            return self.find_interface_method(interface, name, 0);
        }
        if self.find_class(owner).is_some() {
            self.find_class_method(owner, method, 0)
        } else {
            self.find_interface_method(owner, method, 0)
        }
    }

    fn find_class_method(
        &self,
        class_name: &str,
        method: &str,
        depth: usize,
    ) -> Option<(String, MethodDefinition)> {
        if depth > MAX_HIERARCHY_DEPTH {
            return None;
        }
        let class = self.find_class(class_name)?;
        if let Some(found) = class.method(method) {
            if !found.is_redefinition {
                return Some((class.name.clone(), found.clone()));
            }
        }
        if let Some(superclass) = class.superclass.as_deref() {
            if let Some(found) = self.find_class_method(superclass, method, depth + 1) {
                return Some(found);
            }
        }
        class
            .interfaces
            .iter()
            .find_map(|interface| self.find_interface_method(interface, method, depth + 1))
    }

    fn find_interface_method(
        &self,
        interface_name: &str,
        method: &str,
        depth: usize,
    ) -> Option<(String, MethodDefinition)> {
        if depth > MAX_HIERARCHY_DEPTH {
            return None;
        }
        let interface = self.find_interface(interface_name)?;
        if let Some(found) = interface.method(method) {
            return Some((interface.name.clone(), found.clone()));
        }
        interface
            .interfaces
            .iter()
            .find_map(|inner| self.find_interface_method(inner, method, depth + 1))
    }

    /// 把类的属性与类型加入当前作用域
    ///
    /// `own` 为真时包含私有成员；父类只导入非私有成员，接口成员以
    /// `zif~name` 形式导入。
    fn import_class_members(
        &mut self,
        class_name: &str,
        own: bool,
        depth: usize,
    ) {
        if depth > MAX_HIERARCHY_DEPTH {
            return;
        }
        let Some(class) = self.find_class(class_name) else {
            return;
        };
        let scope = self.scope.get_mut(self.current);
        for member in class.attributes.iter().filter(|m| own || m.visibility != Visibility::Private) {
            if scope.variable(&member.identifier.name).is_none() {
                scope.add_variable(member.identifier.clone());
            }
        }
        for member in class.types.iter().filter(|m| own || m.visibility != Visibility::Private) {
            if scope.type_definition(&member.identifier.name).is_none() {
                scope.add_type(member.identifier.clone());
            }
        }
        for interface in &class.interfaces {
            self.import_interface_members(interface, true, depth + 1);
        }
        if let Some(superclass) = class.superclass.as_deref() {
            self.import_class_members(superclass, false, depth + 1);
        }
    }

    fn import_interface_members(
        &mut self,
        interface_name: &str,
        prefixed: bool,
        depth: usize,
    ) {
        if depth > MAX_HIERARCHY_DEPTH {
            return;
        }
        let Some(interface) = self.find_interface(interface_name) else {
            return;
        };
        let rename = |identifier: &TypedIdentifier| {
            let mut identifier = identifier.clone();
            if prefixed {
                identifier.name = format!("{}~{}", interface.name, identifier.name);
            }
            identifier
        };
        let scope = self.scope.get_mut(self.current);
        for member in &interface.attributes {
            let identifier = rename(&member.identifier);
            if scope.variable(&identifier.name).is_none() {
                scope.add_variable(identifier);
            }
        }
        for member in &interface.types {
            let identifier = rename(&member.identifier);
            if scope.type_definition(&identifier.name).is_none() {
                scope.add_type(identifier);
            }
        }
        for inner in &interface.interfaces {
            self.import_interface_members(inner, true, depth + 1);
        }
    }

    // ------------------------------------------------------------------
    // 类与接口定义
    // ------------------------------------------------------------------

    fn visit_class_definition(
        &mut self,
        node: &'a StructureNode,
    ) {
        let Some(opener) = self.opener_node(node) else {
            return;
        };
        let Some(name_node) = opener.find_direct_expression(ExprKind::ClassName) else {
            return;
        };
        let name = name_node.concat_upper();
        self.push_scope(ScopeKind::ClassDefinition, name.clone(), node.span());
        self.class_context = Some(name.clone());

        match self.pass {
            Pass::Definitions => self.collect_class(node, opener, name_node, &name),
            Pass::Full => self.import_class_members(&name, true, 0),
        }

        self.class_context = None;
        self.pop_scope();
    }

    fn collect_class(
        &mut self,
        node: &'a StructureNode,
        opener: NodeRef<'a>,
        name_node: NodeRef<'a>,
        name: &str,
    ) {
        let silent = std::mem::replace(&mut self.silent, false);
        self.collecting = Some(MemberCollector {
            // 类定义以 PUBLIC SECTION 之前的成员为公有
            visibility: Visibility::Public,
            ..MemberCollector::default()
        });

        let mut class = ClassDefinition::new(name, self.file.filename.clone());
        class.span = name_node.span();
        class.is_global = has_word(opener, "PUBLIC");
        class.is_abstract = has_word(opener, "ABSTRACT");
        class.is_final = has_word(opener, "FINAL");

        if let Some(superclass) = expression_after(opener, "FROM", ExprKind::ClassName) {
            let superclass_name = superclass.concat_upper();
            if let Err(error) = self.resolve_class_name(superclass) {
                self.report(error);
            }
            self.import_class_members(&superclass_name, false, 0);
            class.superclass = Some(superclass_name);
        }

        self.visit_children(node);

        let collector = self.collecting.take().unwrap_or_default();
        let scope = self.scope.get(self.current);
        class.attributes = own_members(scope.variables(), &collector);
        class.types = own_members(scope.types(), &collector);
        class.methods = collector.methods;
        class.interfaces = collector.interfaces;
        tracing::debug!(
            "class {}: {} attributes, {} types, {} methods",
            class.name,
            class.attributes.len(),
            class.types.len(),
            class.methods.len()
        );
        self.local.add_class(class);
        self.silent = silent;
    }

    fn visit_interface(
        &mut self,
        node: &'a StructureNode,
    ) {
        let Some(opener) = self.opener_node(node) else {
            return;
        };
        let Some(name_node) = opener.find_direct_expression(ExprKind::ClassName) else {
            return;
        };
        let name = name_node.concat_upper();
        self.push_scope(ScopeKind::Interface, name.clone(), node.span());
        self.class_context = Some(name.clone());

        match self.pass {
            Pass::Definitions => {
                let silent = std::mem::replace(&mut self.silent, false);
                self.collecting = Some(MemberCollector::default());
                self.visit_children(node);

                let collector = self.collecting.take().unwrap_or_default();
                let scope = self.scope.get(self.current);
                let mut interface = InterfaceDefinition::new(&name, self.file.filename.clone());
                interface.span = name_node.span();
                interface.is_global = has_word(opener, "PUBLIC");
                interface.attributes = own_members(scope.variables(), &collector);
                interface.types = own_members(scope.types(), &collector);
                interface.methods = collector.methods;
                interface.interfaces = collector.interfaces;
                self.local.add_interface(interface);
                self.silent = silent;
            }
            Pass::Full => self.import_interface_members(&name, false, 0),
        }

        self.class_context = None;
        self.pop_scope();
    }

    // ------------------------------------------------------------------
    // 实现部分
    // ------------------------------------------------------------------

    fn visit_class_implementation(
        &mut self,
        node: &'a StructureNode,
    ) {
        let Some(opener) = self.opener_node(node) else {
            return;
        };
        let Some(name_node) = opener.find_direct_expression(ExprKind::ClassName) else {
            return;
        };
        let name = name_node.concat_upper();
        self.push_scope(ScopeKind::ClassImplementation, name.clone(), node.span());
        self.class_context = Some(name.clone());

        match self.find_class(&name) {
            Some(class) => {
                self.reference(
                    ReferenceKind::ObjectOriented,
                    name_node.span(),
                    ReferenceTarget::Class(name.clone()),
                );
                let me = TypedIdentifier::new("me", "", Span::dummy(), AbapType::object_reference(&name))
                    .with_meta(IdentifierMeta::BuiltIn)
                    .with_meta(IdentifierMeta::ReadOnly);
                self.scope.get_mut(self.current).add_variable(me);
                if let Some(superclass) = class.superclass.as_deref() {
                    let parent = TypedIdentifier::new(
                        "super",
                        "",
                        Span::dummy(),
                        AbapType::object_reference(superclass),
                    )
                    .with_meta(IdentifierMeta::BuiltIn)
                    .with_meta(IdentifierMeta::ReadOnly);
                    self.scope.get_mut(self.current).add_variable(parent);
                }
                self.import_class_members(&name, true, 0);
            }
            None => self.report(SyntaxError::ClassNotFound {
                name: name.clone(),
                span: name_node.span(),
            }),
        }

        self.visit_children(node);
        self.class_context = None;
        self.pop_scope();
    }

    fn visit_method(
        &mut self,
        node: &'a StructureNode,
    ) {
        let Some(opener) = self.opener_node(node) else {
            return;
        };
        let Some(name_node) = opener.find_direct_expression(ExprKind::MethodName) else {
            return;
        };
        let name = name_node.concat_upper();
        self.push_scope(ScopeKind::Method, name.clone(), node.span());

        if let Some(class_name) = self.class_context.clone() {
            match self.find_method(&class_name, &name) {
                Some((owner, method)) => {
                    self.reference(
                        ReferenceKind::MethodReference,
                        name_node.span(),
                        ReferenceTarget::Method {
                            owner,
                            name: name.clone(),
                        },
                    );
                    for parameter in &method.parameters {
                        let identifier = parameter_identifier(parameter, &self.file.filename);
                        self.scope.get_mut(self.current).add_variable(identifier);
                    }
                }
                None if self.find_class(&class_name).is_some() => {
                    self.report(SyntaxError::MethodNotFound {
                        name: format!("{}=>{}", class_name, name),
                        span: name_node.span(),
                    });
                }
                None => {}
            }
        }

        self.visit_children(node);
        self.pop_scope();
    }

    fn visit_form(
        &mut self,
        node: &'a StructureNode,
    ) {
        let Some(opener) = self.opener_node(node) else {
            return;
        };
        let name = opener
            .find_direct_expression(ExprKind::FormName)
            .map(|n| n.concat_upper())
            .unwrap_or_default();
        self.push_scope(ScopeKind::Form, name, node.span());
        if let Err(error) = self.declare_form_parameters(opener) {
            self.report(error);
        }
        self.visit_children(node);
        self.pop_scope();
    }
}

/// 可在第一遍顶层处理的声明语句
fn is_declaration(kind: StatementKind) -> bool {
    use StatementKind as S;
    matches!(
        kind,
        S::Data | S::Types | S::Constants | S::Statics | S::ClassData | S::Tables | S::FieldSymbol
    )
}

fn find_member<'m>(
    members: &'m [Member],
    name: &str,
) -> Option<&'m Member> {
    members
        .iter()
        .find(|m| m.identifier.name.eq_ignore_ascii_case(name))
}

/// 作用域中由本定义自己声明的成员
fn own_members<'s>(
    identifiers: impl Iterator<Item = &'s TypedIdentifier>,
    collector: &MemberCollector,
) -> Vec<Member> {
    identifiers
        .filter_map(|identifier| {
            let visibility = *collector.declared.get(&identifier.key())?;
            Some(Member {
                identifier: identifier.clone(),
                visibility,
            })
        })
        .collect()
}

/// 方法参数在方法作用域中的声明
pub(crate) fn parameter_identifier(
    parameter: &super::definitions::MethodParameter,
    filename: &str,
) -> TypedIdentifier {
    use super::definitions::ParameterKind;
    let meta = match parameter.kind {
        ParameterKind::Importing => IdentifierMeta::MethodImporting,
        ParameterKind::Exporting => IdentifierMeta::MethodExporting,
        ParameterKind::Changing | ParameterKind::Tables => IdentifierMeta::MethodChanging,
        ParameterKind::Returning => IdentifierMeta::MethodReturning,
    };
    let mut identifier = TypedIdentifier::new(
        parameter.name.clone(),
        filename,
        parameter.span,
        parameter.ty.clone(),
    )
    .with_meta(meta);
    if parameter.kind == ParameterKind::Importing {
        identifier = identifier.with_meta(IdentifierMeta::ReadOnly);
    }
    identifier
}

/// 节点是否直接包含关键字 `word`
pub(crate) fn has_word(
    node: NodeRef<'_>,
    word: &str,
) -> bool {
    node.find_direct_token_by_text(word).is_some()
}

/// 紧跟在关键字 `word` 之后的 `kind` 子表达式
pub(crate) fn expression_after<'n>(
    node: NodeRef<'n>,
    word: &str,
    kind: ExprKind,
) -> Option<NodeRef<'n>> {
    let mut seen = false;
    for child in node.children() {
        match child {
            ChildRef::Token(_, token) if token.is(word) => seen = true,
            ChildRef::Node(inner) if seen && inner.is(kind) => return Some(inner),
            _ => {}
        }
    }
    None
}

/// 把直接子节点按前面最近的关键字分组：`(关键字, 表达式)`
pub(crate) fn sections<'n>(node: NodeRef<'n>) -> Vec<(String, NodeRef<'n>)> {
    let mut keyword = String::new();
    let mut out = Vec::new();
    for child in node.children() {
        match child {
            ChildRef::Token(_, token) if token.is_word() => keyword = token.upper(),
            ChildRef::Token(..) => {}
            ChildRef::Node(inner) => out.push((keyword.clone(), inner)),
        }
    }
    out
}

/// 去掉 `!` 转义前缀
pub(crate) fn plain_name(node: NodeRef<'_>) -> String {
    node.concat_tokens().trim_start_matches('!').to_string()
}
