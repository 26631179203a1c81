//! 声明
//!
//! `TYPE` / `LIKE` 子句、内表类型、`DATA` 定义、`BEGIN OF` 结构、方法与
//! FORM 参数。

use super::builtin;
use super::definitions::{MethodDefinition, MethodParameter, ParameterKind, Visibility};
use super::errors::{Result, SyntaxError};
use super::expressions::Access;
use super::references::{ReferenceKind, ReferenceTarget};
use super::resolver::{expression_after, has_word, plain_name, sections, MemberKind, Resolver};
use super::scope::{IdentifierMeta, TypedIdentifier};
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::{ExprKind, NodeRef, StatementKind};
use crate::frontend::core::structure::{BlockKind, StructureChild, StructureNode};
use crate::frontend::core::type_system::{
    AbapType, Component, GenericKind, TableAccess, TableKey, TableType,
};
use crate::util::span::Span;

/// 类型子句所在的上下文
///
/// 参数和字段符号中不带长度的 `c`/`n`/`p`/`x` 是泛型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Typing {
    Data,
    Parameter,
}

/// 直接子 token 的大写文本
fn words(node: NodeRef<'_>) -> Vec<String> {
    node.direct_tokens().map(|t| t.upper()).collect()
}

fn contains(
    words: &[String],
    word: &str,
) -> bool {
    words.iter().any(|w| w == word)
}

/// 参数上下文中的 `TYPE c` 等
fn untyped_generic(node: NodeRef<'_>) -> Option<GenericKind> {
    let tokens = node.tokens();
    if tokens.len() != 1 {
        return None;
    }
    match tokens[0].upper().as_str() {
        "C" => Some(GenericKind::C),
        "N" => Some(GenericKind::N),
        "P" => Some(GenericKind::P),
        "X" => Some(GenericKind::X),
        _ => None,
    }
}

/// 应用 `LENGTH` / `DECIMALS` / `(10)`
fn with_length(
    ty: AbapType,
    length: Option<u32>,
    decimals: Option<u32>,
) -> AbapType {
    if length.is_none() && decimals.is_none() {
        return ty;
    }
    match ty {
        AbapType::Elementary {
            kind,
            length: old_length,
            decimals: old_decimals,
            name,
        } if kind.has_length() => AbapType::Elementary {
            kind,
            length: length.or(old_length),
            decimals: decimals.or(old_decimals),
            name,
        },
        other => other,
    }
}

fn header_line_table(
    row: AbapType,
    header_line: bool,
) -> AbapType {
    AbapType::Table(TableType {
        row: Box::new(row),
        key: TableKey::default(),
        header_line,
        name: None,
    })
}

impl<'a> Resolver<'a> {
    /// 出错时报告并退回 unknown 类型，让声明本身仍然生效
    pub(crate) fn or_unknown(
        &mut self,
        result: Result<AbapType>,
    ) -> AbapType {
        match result {
            Ok(ty) => ty,
            Err(error) => {
                let reason = error.to_string();
                self.report(error);
                AbapType::unknown(reason)
            }
        }
    }

    /// 解析类型名：`ty`、`zcl_foo=>ty`、`zif_foo~ty`、`ty-comp`
    pub(crate) fn resolve_type_name(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<AbapType> {
        let tokens = node.tokens();
        let span = node.span();
        let Some(first) = tokens.first() else {
            return Ok(AbapType::unknown("empty type name"));
        };
        let head = first.upper();

        let (mut ty, mut index) = match tokens.get(1).map(|t| t.kind) {
            Some(TokenKind::StaticArrow) | Some(TokenKind::Tilde) => {
                let member = tokens.get(2).map(|t| t.upper()).unwrap_or_default();
                (self.resolve_member_type(&head, &member, span)?, 3)
            }
            _ => (self.resolve_plain_type(&head, span, tokens.len() > 1)?, 1),
        };

        while let Some(component) = tokens.get(index + 1) {
            let component = component.upper();
            let next = ty.component(&component).cloned();
            ty = match next {
                Some(found) => found,
                None if ty.is_permissive() || ty.is_generic() => ty,
                None => {
                    return Err(SyntaxError::ComponentNotFound {
                        name: component,
                        span,
                    })
                }
            };
            index += 2;
        }
        Ok(ty)
    }

    fn resolve_plain_type(
        &mut self,
        name: &str,
        span: Span,
        has_components: bool,
    ) -> Result<AbapType> {
        if let Some(identifier) = self.scope.find_type(self.current, name).cloned() {
            let ty = identifier.ty.clone();
            if !identifier.has_meta(IdentifierMeta::BuiltIn) {
                self.reference(
                    ReferenceKind::Type,
                    span,
                    ReferenceTarget::Identifier(identifier),
                );
            }
            return Ok(ty);
        }
        if has_components {
            // TYPE struc-comp 也可以指向数据对象
            if let Some(identifier) = self.scope.find_variable(self.current, name).cloned() {
                let ty = identifier.ty.clone();
                self.reference(
                    ReferenceKind::DataRead,
                    span,
                    ReferenceTarget::Identifier(identifier),
                );
                return Ok(ty);
            }
        }
        if let Some(ty) = self.dictionary.lookup_type(name) {
            self.reference(
                ReferenceKind::Type,
                span,
                ReferenceTarget::Void(name.to_string()),
            );
            return Ok(ty);
        }
        if let Some(table) = self.dictionary.lookup_table_or_view(name) {
            self.reference(
                ReferenceKind::Type,
                span,
                ReferenceTarget::Void(name.to_string()),
            );
            return Ok(table.ty);
        }
        self.void_or(
            name,
            span,
            SyntaxError::TypeNotFound {
                name: name.to_string(),
                span,
            },
        )
    }

    fn resolve_member_type(
        &mut self,
        owner: &str,
        member: &str,
        span: Span,
    ) -> Result<AbapType> {
        let qualified = format!("{}=>{}", owner, member);
        if let Some(identifier) = self.class_member(owner, member, MemberKind::Type) {
            let ty = identifier.ty.clone();
            self.reference(
                ReferenceKind::Type,
                span,
                ReferenceTarget::Identifier(identifier),
            );
            return Ok(ty);
        }
        if self.is_known_class_or_interface(owner) || self.class_context.as_deref() == Some(owner) {
            return Err(SyntaxError::TypeNotFound {
                name: qualified,
                span,
            });
        }
        if let Some(ty) = self.dictionary.lookup_type(&qualified) {
            self.reference(ReferenceKind::Type, span, ReferenceTarget::Void(qualified));
            return Ok(ty);
        }
        self.void_or(
            owner,
            span,
            SyntaxError::ClassNotFound {
                name: owner.to_string(),
                span,
            },
        )
    }

    /// `REF TO x`：类或接口得到对象引用，数据类型得到数据引用
    pub(crate) fn resolve_ref_to(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<AbapType> {
        let name = node.concat_upper();
        let span = node.span();
        match name.as_str() {
            "DATA" => return Ok(AbapType::data_reference(AbapType::Generic(GenericKind::Data))),
            "OBJECT" => return Ok(AbapType::object_reference("OBJECT")),
            _ => {}
        }
        if name.contains("=>") || name.contains('-') || name.contains('~') {
            return Ok(AbapType::data_reference(self.resolve_type_name(node)?));
        }
        if self.find_class(&name).is_some() || self.class_context.as_deref() == Some(name.as_str()) {
            self.reference(
                ReferenceKind::ObjectOriented,
                span,
                ReferenceTarget::Class(name.clone()),
            );
            return Ok(AbapType::object_reference(name));
        }
        if self.find_interface(&name).is_some() {
            self.reference(
                ReferenceKind::ObjectOriented,
                span,
                ReferenceTarget::Interface(name.clone()),
            );
            return Ok(AbapType::object_reference(name));
        }
        if self.scope.find_type(self.current, &name).is_some()
            || self.dictionary.lookup_type(&name).is_some()
            || self.dictionary.lookup_table_or_view(&name).is_some()
        {
            return Ok(AbapType::data_reference(self.resolve_type_name(node)?));
        }
        self.void_or(
            &name,
            span,
            SyntaxError::ClassNotFound {
                name: name.clone(),
                span,
            },
        )
    }

    /// `TYPE ...` / `LIKE ...` / `TYPE REF TO ...` / `TYPE LINE OF ...`
    pub(crate) fn resolve_type_clause(
        &mut self,
        clause: NodeRef<'a>,
        typing: Typing,
    ) -> Result<AbapType> {
        let words = words(clause);
        let like = contains(&words, "LIKE");
        let type_name = clause.find_direct_expression(ExprKind::TypeName);
        let field = clause.find_direct_expression(ExprKind::FieldChain);

        if contains(&words, "REF") {
            return match (like, field, type_name) {
                (true, Some(field), _) => Ok(AbapType::data_reference(
                    self.resolve_field_chain(field, Access::Read)?,
                )),
                (false, _, Some(type_name)) => self.resolve_ref_to(type_name),
                _ => Ok(AbapType::unknown("incomplete REF TO")),
            };
        }

        let (base, target) = match (like, field, type_name) {
            (true, Some(field), _) => (self.resolve_field_chain(field, Access::Read)?, field),
            (false, _, Some(type_name)) => {
                let ty = match untyped_generic(type_name) {
                    Some(generic) if typing == Typing::Parameter => AbapType::Generic(generic),
                    _ => self.resolve_type_name(type_name)?,
                };
                (ty, type_name)
            }
            _ => return Ok(AbapType::unknown("incomplete type clause")),
        };

        if contains(&words, "LINE") {
            return self.row_of(&base, &target.concat_tokens(), target.span());
        }
        Ok(base)
    }

    /// 内表的行类型；泛型与 void 表原样放行
    pub(crate) fn row_of(
        &self,
        ty: &AbapType,
        name: &str,
        span: Span,
    ) -> Result<AbapType> {
        match ty {
            AbapType::Table(table) => Ok((*table.row).clone()),
            AbapType::Generic(_) => Ok(AbapType::Generic(GenericKind::Any)),
            other if other.is_permissive() => Ok(other.clone()),
            _ => Err(SyntaxError::NotATable {
                name: name.to_string(),
                span,
            }),
        }
    }

    /// `TYPE [STANDARD|SORTED|HASHED] TABLE OF ... WITH ... KEY ...`
    pub(crate) fn resolve_table_type(
        &mut self,
        node: NodeRef<'a>,
        typing: Typing,
    ) -> Result<AbapType> {
        let words = words(node);
        let like = contains(&words, "LIKE");
        let row_node = if like {
            node.find_direct_expression(ExprKind::FieldChain)
        } else {
            node.find_direct_expression(ExprKind::TypeName)
        };

        if contains(&words, "RANGE") {
            let low = match row_node {
                Some(field) if like => self.resolve_field_chain(field, Access::Read)?,
                Some(type_name) => self.resolve_type_name(type_name)?,
                None => AbapType::unknown("incomplete RANGE OF"),
            };
            return Ok(builtin::range_table(low));
        }

        let access = if contains(&words, "SORTED") {
            TableAccess::Sorted
        } else if contains(&words, "HASHED") {
            TableAccess::Hashed
        } else if contains(&words, "ANY") {
            TableAccess::Any
        } else if contains(&words, "INDEX") {
            TableAccess::Index
        } else {
            TableAccess::Standard
        };

        let Some(row_node) = row_node else {
            return Ok(match access {
                TableAccess::Any => AbapType::Generic(GenericKind::AnyTable),
                TableAccess::Index => AbapType::Generic(GenericKind::IndexTable),
                _ => AbapType::Table(TableType {
                    row: Box::new(AbapType::Generic(GenericKind::Any)),
                    key: TableKey {
                        access,
                        ..TableKey::default()
                    },
                    header_line: false,
                    name: None,
                }),
            });
        };

        let is_ref = contains(&words, "REF");
        let row = match (like, is_ref) {
            (true, true) => {
                AbapType::data_reference(self.resolve_field_chain(row_node, Access::Read)?)
            }
            (true, false) => self.resolve_field_chain(row_node, Access::Read)?,
            (false, true) => self.resolve_ref_to(row_node)?,
            (false, false) => match untyped_generic(row_node) {
                Some(generic) if typing == Typing::Parameter => AbapType::Generic(generic),
                _ => self.resolve_type_name(row_node)?,
            },
        };

        let mut key = TableKey {
            access,
            ..TableKey::default()
        };
        if let Some(primary) = node
            .find_direct_expressions(ExprKind::TableKey)
            .into_iter()
            .find(|k| is_primary_key(*k))
        {
            apply_primary_key(primary, &mut key);
        }

        Ok(AbapType::Table(TableType {
            row: Box::new(row),
            key,
            header_line: false,
            name: None,
        }))
    }

    /// 数值型长度：`LENGTH 10`、`LENGTH '10'`、`(10)`、`DECIMALS 2`
    fn length_value(node: NodeRef<'_>) -> Option<u32> {
        if let Some(integer) = node.find_direct_expression(ExprKind::Integer) {
            return integer.concat_upper().parse().ok();
        }
        let literal = node.find_direct_expression(ExprKind::TextLiteral)?;
        literal
            .first_token()?
            .text
            .trim_matches(|c| c == '\'' || c == '`')
            .trim()
            .parse()
            .ok()
    }

    /// 解析 `DATA`/`TYPES`/`CONSTANTS` 等语句中的定义部分
    pub(crate) fn resolve_data_definition(
        &mut self,
        def: NodeRef<'a>,
        typing: Typing,
        is_types: bool,
    ) -> Result<TypedIdentifier> {
        let Some(name_node) = def.find_direct_expression(ExprKind::DefinitionName) else {
            return Err(SyntaxError::WrongContext {
                message: "Definition without a name".to_string(),
                span: def.span(),
            });
        };
        let name = plain_name(name_node);
        let words = words(def);

        let ty = if let Some(table) = def.find_direct_expression(ExprKind::TableType) {
            let result = self.resolve_table_type(table, typing);
            self.or_unknown(result)
        } else if let Some(clause) = def.find_direct_expression(ExprKind::TypeClause) {
            let result = self.resolve_type_clause(clause, typing);
            self.or_unknown(result)
        } else {
            AbapType::character(1)
        };

        let field_length = def
            .find_direct_expression(ExprKind::ConstantFieldLength)
            .and_then(Self::length_value);
        let length = def
            .find_direct_expression(ExprKind::Length)
            .and_then(Self::length_value)
            .or(field_length);
        let decimals = def
            .find_direct_expression(ExprKind::Decimals)
            .and_then(Self::length_value);
        let mut ty = with_length(ty, length, decimals);

        if contains(&words, "OCCURS") {
            ty = header_line_table(ty, !is_types);
        } else if contains(&words, "HEADER") {
            if let AbapType::Table(table) = &mut ty {
                table.header_line = true;
            }
        }

        if let Some(value) = def.find_direct_expression(ExprKind::Value) {
            if let Some(field) = value.find_direct_expression(ExprKind::FieldChain) {
                self.resolve_field_chain(field, Access::Read)?;
            }
        }

        let ty = if is_types {
            ty.with_name(self.qualify(&name))
        } else {
            ty
        };
        let mut identifier =
            TypedIdentifier::new(name, self.file.filename.clone(), name_node.span(), ty);
        if contains(&words, "READ") {
            identifier = identifier.with_meta(IdentifierMeta::ReadOnly);
        }
        Ok(identifier)
    }

    /// `DATA`、`CLASS-DATA`、`STATICS`、`CONSTANTS`、`TYPES`
    pub(crate) fn declare_data(
        &mut self,
        node: NodeRef<'a>,
        kind: StatementKind,
    ) -> Result<()> {
        let Some(def) = node.find_direct_expression(ExprKind::DataDefinition) else {
            return Ok(());
        };
        let is_types = kind == StatementKind::Types;
        let mut identifier = self.resolve_data_definition(def, Typing::Data, is_types)?;
        match kind {
            StatementKind::ClassData | StatementKind::Statics => {
                identifier = identifier.with_meta(IdentifierMeta::Static)
            }
            StatementKind::Constants => identifier = identifier.with_meta(IdentifierMeta::Constant),
            _ => {}
        }
        if is_types {
            self.declare_type(identifier)
        } else {
            self.declare_variable(identifier)
        }
    }

    /// `FIELD-SYMBOLS <fs> [TYPE ...]`
    pub(crate) fn declare_field_symbol(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(name_node) = node.find_direct_expression(ExprKind::FieldSymbol) else {
            return Ok(());
        };
        let ty = if let Some(table) = node.find_direct_expression(ExprKind::TableType) {
            let result = self.resolve_table_type(table, Typing::Parameter);
            self.or_unknown(result)
        } else if let Some(clause) = node.find_direct_expression(ExprKind::TypeClause) {
            let result = self.resolve_type_clause(clause, Typing::Parameter);
            self.or_unknown(result)
        } else if let Some(type_name) = node.find_direct_expression(ExprKind::TypeName) {
            let result = self.resolve_type_name(type_name);
            self.or_unknown(result)
        } else {
            AbapType::Generic(GenericKind::Any)
        };
        if let Some(default) = node.find_direct_expression(ExprKind::FieldChain) {
            self.resolve_field_chain(default, Access::Read)?;
        }
        let identifier = TypedIdentifier::new(
            name_node.concat_tokens(),
            self.file.filename.clone(),
            name_node.span(),
            ty,
        )
        .with_meta(IdentifierMeta::FieldSymbol);
        self.declare_variable(identifier)
    }

    /// `TABLES dbtab`：与数据库表同名的工作区
    pub(crate) fn declare_tables(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(field) = node.find_direct_expression(ExprKind::Field) else {
            return Ok(());
        };
        let name = field.concat_upper();
        let span = field.span();
        let ty = match self.dictionary.lookup_table_or_view(&name) {
            Some(table) => {
                self.reference(
                    ReferenceKind::Type,
                    span,
                    ReferenceTarget::Void(name.clone()),
                );
                table.ty
            }
            None => {
                let result = self.void_or(
                    &name,
                    span,
                    SyntaxError::TableNotFound {
                        name: name.clone(),
                        span,
                    },
                );
                self.or_unknown(result)
            }
        };
        let identifier =
            TypedIdentifier::new(field.concat_tokens(), self.file.filename.clone(), span, ty)
                .with_meta(IdentifierMeta::TableWorkArea);
        self.declare_variable(identifier)
    }

    /// `PARAMETERS p_name TYPE ...`
    pub(crate) fn declare_parameter(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(name_node) = node.find_direct_expression(ExprKind::DefinitionName) else {
            return Ok(());
        };
        let ty = if let Some(clause) = node.find_direct_expression(ExprKind::TypeClause) {
            let result = self.resolve_type_clause(clause, Typing::Data);
            self.or_unknown(result)
        } else {
            let length = node
                .find_direct_expression(ExprKind::ConstantFieldLength)
                .and_then(Self::length_value)
                .unwrap_or(1);
            AbapType::character(length)
        };
        if let Some(default) = node.find_direct_expression(ExprKind::Source) {
            self.resolve_source(default)?;
        }
        let identifier = TypedIdentifier::new(
            plain_name(name_node),
            self.file.filename.clone(),
            name_node.span(),
            ty,
        )
        .with_meta(IdentifierMeta::SelectionScreen);
        self.declare_variable(identifier)
    }

    // ------------------------------------------------------------------
    // BEGIN OF ... END OF
    // ------------------------------------------------------------------

    /// 注册 `TYPES/DATA/CONSTANTS BEGIN OF` 块定义的结构
    pub(crate) fn declare_begin_block(
        &mut self,
        node: &'a StructureNode,
    ) -> Result<()> {
        let Some(opener) = node.opener().map(|index| self.statement_node(index)) else {
            return Ok(());
        };
        let (name, span, ty) = self.structure_from_block(node)?;
        match node.kind() {
            BlockKind::TypesBegin => {
                let ty = ty.with_name(self.qualify(&name));
                let identifier = TypedIdentifier::new(name, self.file.filename.clone(), span, ty);
                self.declare_type(identifier)
            }
            BlockKind::ConstantsBegin => {
                let identifier = TypedIdentifier::new(name, self.file.filename.clone(), span, ty)
                    .with_meta(IdentifierMeta::Constant);
                self.declare_variable(identifier)
            }
            _ => {
                let mut identifier =
                    TypedIdentifier::new(name, self.file.filename.clone(), span, ty);
                let first = opener.first_token().map(|t| t.upper()).unwrap_or_default();
                if first == "STATICS" || first == "CLASS" {
                    identifier = identifier.with_meta(IdentifierMeta::Static);
                }
                if has_word(opener, "READ") {
                    identifier = identifier.with_meta(IdentifierMeta::ReadOnly);
                }
                self.declare_variable(identifier)
            }
        }
    }

    fn structure_from_block(
        &mut self,
        node: &'a StructureNode,
    ) -> Result<(String, Span, AbapType)> {
        let Some(opener) = node.opener().map(|index| self.statement_node(index)) else {
            return Ok((String::new(), node.span(), AbapType::unknown("missing opener")));
        };
        let Some(name_node) = opener.find_direct_expression(ExprKind::DefinitionName) else {
            return Ok((String::new(), node.span(), AbapType::unknown("missing name")));
        };

        let mut components = Vec::new();
        for child in node.children() {
            match child {
                StructureChild::Statement(index) => {
                    let kind = self.file.statements[*index].kind;
                    let statement = self.statement_node(*index);
                    match kind {
                        StatementKind::Data
                        | StatementKind::Types
                        | StatementKind::Constants
                        | StatementKind::ClassData
                        | StatementKind::Statics => {
                            let Some(def) = statement.find_direct_expression(ExprKind::DataDefinition)
                            else {
                                continue;
                            };
                            match self.resolve_data_definition(def, Typing::Data, false) {
                                Ok(identifier) => {
                                    components.push(Component::new(identifier.key(), identifier.ty))
                                }
                                Err(error) => self.report(error),
                            }
                        }
                        StatementKind::IncludeType => {
                            if let Err(error) = self.include_components(statement, &mut components) {
                                self.report(error);
                            }
                        }
                        _ => {}
                    }
                }
                StructureChild::Structure(inner) if inner.kind() == node.kind() => {
                    let (name, _, ty) = self.structure_from_block(inner)?;
                    components.push(Component::new(name.to_ascii_uppercase(), ty));
                }
                StructureChild::Structure(_) => {}
            }
        }

        let mut ty = AbapType::structure(components);
        if has_word(opener, "OCCURS") {
            ty = header_line_table(ty, node.kind() != BlockKind::TypesBegin);
        }
        Ok((plain_name(name_node), name_node.span(), ty))
    }

    /// `INCLUDE TYPE ty [AS name] [RENAMING WITH SUFFIX sfx]`
    fn include_components(
        &mut self,
        statement: NodeRef<'a>,
        components: &mut Vec<Component>,
    ) -> Result<()> {
        let Some(type_name) = statement.find_direct_expression(ExprKind::TypeName) else {
            return Ok(());
        };
        let included = if has_word(statement, "STRUCTURE") {
            match self.scope.find_variable(self.current, &type_name.concat_upper()) {
                Some(identifier) => identifier.ty.clone(),
                None => self.resolve_type_name(type_name)?,
            }
        } else {
            self.resolve_type_name(type_name)?
        };
        let suffix = expression_after(statement, "SUFFIX", ExprKind::SimpleName)
            .map(|n| n.concat_upper())
            .unwrap_or_default();
        if let Some(group) = expression_after(statement, "AS", ExprKind::SimpleName) {
            components.push(Component::new(group.concat_upper(), included.clone()));
        }
        for component in included.components() {
            components.push(Component::new(
                format!("{}{}", component.name.to_ascii_uppercase(), suffix),
                component.ty.clone(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 类与接口定义中的语句
    // ------------------------------------------------------------------

    pub(crate) fn set_visibility(
        &mut self,
        visibility: Visibility,
    ) {
        if let Some(collector) = self.collecting.as_mut() {
            collector.visibility = visibility;
        }
    }

    /// `INTERFACES zif_foo.`
    pub(crate) fn define_interfaces(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(name_node) = node.find_direct_expression(ExprKind::ClassName) else {
            return Ok(());
        };
        let name = name_node.concat_upper();
        self.resolve_class_name(name_node)?;
        if let Some(collector) = self.collecting.as_mut() {
            if !collector.interfaces.contains(&name) {
                collector.interfaces.push(name);
            }
        }
        Ok(())
    }

    /// `METHODS` / `CLASS-METHODS`
    pub(crate) fn define_method(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(name_node) = node.find_direct_expression(ExprKind::MethodName) else {
            return Ok(());
        };
        let mut method = MethodDefinition::new(name_node.concat_tokens());
        method.span = name_node.span();
        method.visibility = self
            .collecting
            .as_ref()
            .map(|c| c.visibility)
            .unwrap_or_default();
        method.is_static = node.first_token().is_some_and(|t| t.is("CLASS"));
        method.is_abstract = has_word(node, "ABSTRACT");
        method.is_redefinition = has_word(node, "REDEFINITION");

        if has_word(node, "EVENT") {
            for parameter in node.find_direct_expressions(ExprKind::DefinitionName) {
                method.parameters.push(MethodParameter {
                    name: plain_name(parameter),
                    kind: ParameterKind::Importing,
                    ty: AbapType::void(parameter.concat_upper()),
                    optional: true,
                    span: parameter.span(),
                });
            }
            if let Some(sender) = node.find_direct_expression(ExprKind::ClassName) {
                self.resolve_class_name(sender)?;
            }
        }

        for section in node.expressions() {
            let kind = match section.expr_kind() {
                Some(ExprKind::MethodDefImporting) => ParameterKind::Importing,
                Some(ExprKind::MethodDefExporting) => ParameterKind::Exporting,
                Some(ExprKind::MethodDefChanging) => ParameterKind::Changing,
                Some(ExprKind::MethodDefReturning) => ParameterKind::Returning,
                Some(ExprKind::MethodDefRaising) => {
                    for class in section.find_direct_expressions(ExprKind::ClassName) {
                        if let Err(error) = self.resolve_class_name(class) {
                            self.report(error);
                        }
                        method.raising.push(class.concat_upper());
                    }
                    continue;
                }
                _ => continue,
            };
            for parameter in section.find_direct_expressions(ExprKind::MethodParam) {
                let parameter = self.method_parameter(parameter, kind)?;
                if method.parameter(&parameter.name).is_some() {
                    return Err(SyntaxError::AlreadyDefined {
                        name: parameter.name,
                        span: parameter.span,
                    });
                }
                method.parameters.push(parameter);
            }
            if kind == ParameterKind::Importing {
                method.preferred = section
                    .find_direct_expression(ExprKind::SimpleName)
                    .map(|n| n.concat_upper());
            }
        }

        let Some(collector) = self.collecting.as_mut() else {
            return Ok(());
        };
        if collector.methods.iter().any(|m| m.is(&method.name)) {
            return Err(SyntaxError::AlreadyDefined {
                name: method.name,
                span: method.span,
            });
        }
        collector.methods.push(method);
        Ok(())
    }

    fn method_parameter(
        &mut self,
        node: NodeRef<'a>,
        kind: ParameterKind,
    ) -> Result<MethodParameter> {
        let Some(name_node) = node.find_first_expression(ExprKind::DefinitionName) else {
            return Err(SyntaxError::WrongContext {
                message: "Parameter without a name".to_string(),
                span: node.span(),
            });
        };
        let ty = if let Some(table) = node.find_direct_expression(ExprKind::TableType) {
            let result = self.resolve_table_type(table, Typing::Parameter);
            self.or_unknown(result)
        } else if let Some(clause) = node.find_direct_expression(ExprKind::TypeClause) {
            let result = self.resolve_type_clause(clause, Typing::Parameter);
            self.or_unknown(result)
        } else {
            AbapType::Generic(GenericKind::Any)
        };
        if let Some(default) = node.find_direct_expression(ExprKind::FieldChain) {
            if let Err(error) = self.resolve_field_chain(default, Access::Read) {
                self.report(error);
            }
        }
        Ok(MethodParameter {
            name: plain_name(name_node),
            kind,
            ty,
            optional: has_word(node, "OPTIONAL") || has_word(node, "DEFAULT"),
            span: name_node.span(),
        })
    }

    // ------------------------------------------------------------------
    // FORM
    // ------------------------------------------------------------------

    /// `FORM name TABLES ... USING ... CHANGING ...`
    pub(crate) fn declare_form_parameters(
        &mut self,
        opener: NodeRef<'a>,
    ) -> Result<()> {
        for (keyword, param) in sections(opener) {
            if !param.is(ExprKind::FormParam) {
                if param.is(ExprKind::ClassName) {
                    self.resolve_class_name(param)?;
                }
                continue;
            }
            let Some(name_node) = param.find_first_expression(ExprKind::DefinitionName) else {
                continue;
            };
            let ty = if let Some(table) = param.find_direct_expression(ExprKind::TableType) {
                let result = self.resolve_table_type(table, Typing::Parameter);
                self.or_unknown(result)
            } else if let Some(clause) = param.find_direct_expression(ExprKind::TypeClause) {
                let result = self.resolve_type_clause(clause, Typing::Parameter);
                self.or_unknown(result)
            } else if let Some(type_name) = param.find_direct_expression(ExprKind::TypeName) {
                let result = self.resolve_type_name(type_name);
                self.or_unknown(result)
            } else if let Some(field) = param.find_direct_expression(ExprKind::FieldChain) {
                let result = self.resolve_field_chain(field, Access::Read);
                self.or_unknown(result)
            } else {
                AbapType::Generic(GenericKind::Any)
            };
            let ty = match ty {
                table @ AbapType::Table(_) => table,
                generic @ AbapType::Generic(GenericKind::AnyTable | GenericKind::IndexTable) => {
                    generic
                }
                row if keyword == "TABLES" => header_line_table(row, true),
                other => other,
            };
            let identifier = TypedIdentifier::new(
                plain_name(name_node),
                self.file.filename.clone(),
                name_node.span(),
                ty,
            )
            .with_meta(IdentifierMeta::FormParameter);
            self.declare_variable(identifier)?;
        }
        Ok(())
    }
}

/// 主键：不带 `SORTED`/`HASHED` 且未命名（或名为 `primary_key`）
fn is_primary_key(key: NodeRef<'_>) -> bool {
    let words = words(key);
    if contains(&words, "SORTED") || contains(&words, "HASHED") {
        return false;
    }
    match key.find_direct_expression(ExprKind::SimpleName) {
        Some(name) => name.concat_upper() == "PRIMARY_KEY",
        None => true,
    }
}

fn apply_primary_key(
    node: NodeRef<'_>,
    key: &mut TableKey,
) {
    let words = words(node);
    key.unique = contains(&words, "UNIQUE") && !contains(&words, "NON");
    if contains(&words, "EMPTY") {
        key.is_default = false;
        key.fields.clear();
        return;
    }
    key.is_default = contains(&words, "DEFAULT");
    key.fields = node
        .find_direct_expressions(ExprKind::ComponentChain)
        .iter()
        .map(|c| c.concat_upper())
        .collect();
}
