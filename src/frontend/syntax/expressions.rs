//! 表达式
//!
//! 源操作数、目标、字段链、条件与构造表达式。每个求值过的项都把类型记入
//! [`ResolvedTypes`](super::references::ResolvedTypes)。

use super::errors::{Result, SyntaxError};
use super::references::{ReferenceKind, ReferenceTarget};
use super::resolver::{has_word, plain_name, MemberKind, Resolver};
use super::scope::{IdentifierMeta, TypedIdentifier};
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::{ChildRef, ExprKind, NodeRef};
use crate::frontend::core::type_system::{AbapType, ElementaryKind, GenericKind};

/// 数据对象的访问方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// 算术运算的计算类型顺序
fn numeric_rank(kind: ElementaryKind) -> u8 {
    match kind {
        ElementaryKind::I => 1,
        ElementaryKind::Int8 => 2,
        ElementaryKind::P => 3,
        ElementaryKind::F => 4,
        ElementaryKind::DecFloat16 => 5,
        ElementaryKind::DecFloat34 => 6,
        _ => 0,
    }
}

/// 字面量的类型
pub(crate) fn constant_type(node: NodeRef<'_>) -> AbapType {
    let tokens = node.tokens();
    let Some(first) = tokens.first() else {
        return AbapType::unknown("empty constant");
    };
    if first.kind != TokenKind::StringLiteral {
        return AbapType::integer();
    }
    if first.text.starts_with('`') {
        return AbapType::string();
    }
    let length: usize = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::StringLiteral)
        .map(|t| literal_length(&t.text))
        .sum();
    AbapType::character(length.max(1) as u32)
}

/// `'it''s'` → 4
fn literal_length(text: &str) -> usize {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'").chars().count()
}

impl<'a> Resolver<'a> {
    pub(crate) fn resolve_source(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<AbapType> {
        self.resolve_source_expecting(node, None)
    }

    /// 解析源操作数；`expected` 是赋值目标的类型，供 `#` 推断使用
    pub(crate) fn resolve_source_expecting(
        &mut self,
        node: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<AbapType> {
        let bit_not = node.find_direct_token_by_text("BIT").is_some();
        let mut terms = Vec::new();
        let mut operators = Vec::new();
        for child in node.expressions() {
            if child.is(ExprKind::ArithOperator) {
                operators.push(child.concat_upper());
            } else {
                terms.push(child);
            }
        }

        let term_expected = if operators.is_empty() { expected } else { None };
        let mut types = Vec::with_capacity(terms.len());
        for term in terms {
            types.push(self.resolve_term(term, term_expected)?);
        }

        let ty = if bit_not || operators.iter().any(|o| o.starts_with("BIT")) {
            AbapType::elementary(ElementaryKind::XString)
        } else if operators.iter().any(|o| o == "&&") {
            AbapType::string()
        } else if operators.is_empty() {
            types
                .into_iter()
                .next()
                .unwrap_or_else(|| AbapType::unknown("empty source"))
        } else if let Some(permissive) = types.iter().find(|t| t.is_permissive()) {
            permissive.clone()
        } else {
            let kind = types
                .iter()
                .filter_map(AbapType::elementary_kind)
                .max_by_key(|k| numeric_rank(*k))
                .filter(|k| numeric_rank(*k) > 0)
                .unwrap_or(ElementaryKind::I);
            AbapType::elementary(kind)
        };
        self.record_type(node.span(), &ty);
        Ok(ty)
    }

    fn resolve_term(
        &mut self,
        node: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<AbapType> {
        let ty = match node.expr_kind() {
            Some(ExprKind::Source) => self.resolve_source_expecting(node, expected)?,
            Some(ExprKind::ConstructorExpression) => self.resolve_constructor(node, expected)?,
            Some(ExprKind::MethodCallChain) => self.resolve_method_call_chain(node)?,
            Some(ExprKind::NewObject) => self.resolve_new_object(node, expected)?,
            Some(ExprKind::StringTemplate) => {
                for source in node.find_direct_expressions(ExprKind::Source) {
                    self.resolve_source(source)?;
                }
                AbapType::string()
            }
            Some(ExprKind::Constant) => constant_type(node),
            Some(ExprKind::FieldChain) => self.resolve_field_chain(node, Access::Read)?,
            _ => AbapType::unknown(node.concat_tokens()),
        };
        self.record_type(node.span(), &ty);
        Ok(ty)
    }

    // ------------------------------------------------------------------
    // 字段链
    // ------------------------------------------------------------------

    /// 查找数据对象并记录读写引用
    pub(crate) fn lookup_data(
        &mut self,
        node: NodeRef<'a>,
        access: Access,
    ) -> Result<AbapType> {
        let name = plain_name(node);
        let span = node.span();
        let Some(identifier) = self.scope.find_variable(self.current, &name).cloned() else {
            return Err(SyntaxError::NotFound { name, span });
        };
        if access == Access::Write && identifier.has_meta(IdentifierMeta::Constant) {
            return Err(SyntaxError::ConstantChanged {
                name: identifier.name,
                span,
            });
        }
        let ty = identifier.ty.clone();
        let kind = match access {
            Access::Read => ReferenceKind::DataRead,
            Access::Write => ReferenceKind::DataWrite,
        };
        self.reference(kind, span, ReferenceTarget::Identifier(identifier));
        Ok(ty)
    }

    /// `zcl_foo=>attr`
    fn static_attribute(
        &mut self,
        class: NodeRef<'a>,
        attribute: NodeRef<'a>,
        access: Access,
    ) -> Result<AbapType> {
        let owner = class.concat_upper();
        let name = attribute.concat_upper();
        let span = attribute.span();
        if let Some(identifier) = self.class_member(&owner, &name, MemberKind::Attribute) {
            if access == Access::Write && identifier.has_meta(IdentifierMeta::Constant) {
                return Err(SyntaxError::ConstantChanged {
                    name: format!("{}=>{}", owner, name),
                    span,
                });
            }
            self.reference(
                ReferenceKind::ObjectOriented,
                class.span(),
                ReferenceTarget::Class(owner),
            );
            let ty = identifier.ty.clone();
            let kind = match access {
                Access::Read => ReferenceKind::DataRead,
                Access::Write => ReferenceKind::DataWrite,
            };
            self.reference(kind, span, ReferenceTarget::Identifier(identifier));
            return Ok(ty);
        }
        if self.is_known_class_or_interface(&owner) || self.class_context.as_deref() == Some(owner.as_str()) {
            return Err(SyntaxError::NotFound {
                name: format!("{}=>{}", owner, name),
                span,
            });
        }
        let class_span = class.span();
        self.void_or(
            &owner,
            class_span,
            SyntaxError::ClassNotFound {
                name: owner.clone(),
                span: class_span,
            },
        )
    }

    /// `ref->attr`
    fn instance_attribute(
        &mut self,
        ty: &AbapType,
        attribute: NodeRef<'a>,
        chain: &str,
    ) -> Result<AbapType> {
        let name = attribute.concat_upper();
        let span = attribute.span();
        match ty {
            AbapType::ObjectReference(class) => {
                if let Some(identifier) = self.class_member(class, &name, MemberKind::Attribute) {
                    let found = identifier.ty.clone();
                    self.reference(
                        ReferenceKind::DataRead,
                        span,
                        ReferenceTarget::Identifier(identifier),
                    );
                    return Ok(found);
                }
                if self.is_known_class_or_interface(class) {
                    return Err(SyntaxError::NotFound {
                        name: format!("{}->{}", class, name),
                        span,
                    });
                }
                Ok(AbapType::void(class.clone()))
            }
            AbapType::DataReference { target, .. } => match target.component(&name) {
                Some(found) => Ok(found.clone()),
                None if target.is_permissive() || target.is_generic() => Ok((**target).clone()),
                None => Err(SyntaxError::ComponentNotFound { name, span }),
            },
            AbapType::Generic(_) => Ok(AbapType::Generic(GenericKind::Any)),
            other if other.is_permissive() => Ok(other.clone()),
            _ => Err(SyntaxError::NotAnObjectReference {
                name: chain.to_string(),
                span,
            }),
        }
    }

    /// 解析字段链，返回最终的类型
    ///
    /// 写访问只作用于链头；经过 `->` 之后的写入不影响链头。
    pub(crate) fn resolve_field_chain(
        &mut self,
        node: NodeRef<'a>,
        access: Access,
    ) -> Result<AbapType> {
        let children: Vec<ChildRef<'a>> = node.children().collect();
        let dereferences = children.iter().any(|child| match child {
            ChildRef::Token(_, token) => token.kind == TokenKind::InstanceArrow,
            ChildRef::Node(inner) => inner.is(ExprKind::Dereference),
        });
        let head_access = if dereferences { Access::Read } else { access };

        let (mut ty, mut index) = match (children.first(), children.get(2)) {
            (Some(ChildRef::Node(class)), Some(ChildRef::Node(attribute)))
                if class.is(ExprKind::ClassName) =>
            {
                (self.static_attribute(*class, *attribute, head_access)?, 3)
            }
            (Some(ChildRef::Node(head)), _) => (self.lookup_data(*head, head_access)?, 1),
            _ => return Ok(AbapType::unknown(node.concat_tokens())),
        };

        let mut chain = match children.first() {
            Some(ChildRef::Node(head)) => head.concat_tokens(),
            _ => String::new(),
        };
        while index < children.len() {
            match children[index] {
                ChildRef::Token(_, token) => {
                    let Some(ChildRef::Node(name)) = children.get(index + 1).copied() else {
                        break;
                    };
                    ty = match token.kind {
                        TokenKind::InstanceArrow => self.instance_attribute(&ty, name, &chain)?,
                        _ => self.component_of(&ty, name)?,
                    };
                    chain.push_str(&token.text);
                    chain.push_str(&name.concat_tokens());
                    index += 2;
                    continue;
                }
                ChildRef::Node(item) => {
                    ty = match item.expr_kind() {
                        Some(ExprKind::Dereference) => match &ty {
                            AbapType::DataReference { target, .. } => (**target).clone(),
                            AbapType::Generic(_) => AbapType::Generic(GenericKind::Any),
                            other if other.is_permissive() => other.clone(),
                            _ => {
                                return Err(SyntaxError::WrongContext {
                                    message: format!("\"{}\" is not a data reference", chain),
                                    span: item.span(),
                                })
                            }
                        },
                        Some(ExprKind::TableExpression) => {
                            let row = self.row_of(&ty, &chain, item.span())?;
                            self.resolve_table_expression(item, &row)?;
                            row
                        }
                        Some(ExprKind::TableBody) => match ty {
                            AbapType::Table(mut table) => {
                                table.header_line = false;
                                AbapType::Table(table)
                            }
                            other if other.is_table() || other.is_permissive() => other,
                            AbapType::Generic(_) => AbapType::Generic(GenericKind::AnyTable),
                            _ => {
                                return Err(SyntaxError::NotATable {
                                    name: chain.clone(),
                                    span: item.span(),
                                })
                            }
                        },
                        Some(ExprKind::FieldOffset) | Some(ExprKind::FieldLength) => {
                            if let Some(field) = item.find_direct_expression(ExprKind::Field) {
                                self.lookup_data(field, Access::Read)?;
                            }
                            ty
                        }
                        _ => ty,
                    };
                    chain.push_str(&item.concat_tokens());
                }
            }
            index += 1;
        }
        Ok(ty)
    }

    /// 结构组件；`table_line` 指整行
    fn component_of(
        &self,
        ty: &AbapType,
        name_node: NodeRef<'a>,
    ) -> Result<AbapType> {
        let name = name_node.concat_upper();
        if name == "TABLE_LINE" {
            return Ok(ty.clone());
        }
        match ty.component(&name) {
            Some(found) => Ok(found.clone()),
            None if ty.is_permissive() => Ok(ty.clone()),
            None if ty.is_generic() => Ok(AbapType::Generic(GenericKind::Any)),
            None => Err(SyntaxError::ComponentNotFound {
                name,
                span: name_node.span(),
            }),
        }
    }

    /// 行内组件链 `a-b-c`
    pub(crate) fn resolve_component_chain(
        &self,
        chain: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<AbapType> {
        let mut ty = row.clone();
        for name in chain.find_direct_expressions(ExprKind::ComponentName) {
            ty = self.component_of(&ty, name)?;
        }
        Ok(ty)
    }

    /// `tab[ 1 ]`、`tab[ comp = x ]`
    fn resolve_table_expression(
        &mut self,
        node: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        for compare in node.find_direct_expressions(ExprKind::ComponentCompare) {
            self.resolve_component_compare(compare, row)?;
        }
        if let Some(index) = node.find_direct_expression(ExprKind::Source) {
            self.resolve_source_expecting(index, Some(&AbapType::integer()))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 目标
    // ------------------------------------------------------------------

    /// 解析写入目标；内联声明用 `inferred` 作为类型
    pub(crate) fn resolve_target(
        &mut self,
        node: NodeRef<'a>,
        inferred: Option<&AbapType>,
    ) -> Result<AbapType> {
        let Some(inner) = node.expressions().next() else {
            return Ok(AbapType::unknown(node.concat_tokens()));
        };
        match inner.expr_kind() {
            Some(ExprKind::InlineData) => {
                let Some(name) = inner.find_direct_expression(ExprKind::DefinitionName) else {
                    return Ok(AbapType::unknown(inner.concat_tokens()));
                };
                let final_ = inner.first_token().is_some_and(|t| t.is("FINAL"));
                self.declare_inline(inner, name, inferred, IdentifierMeta::InlineDefinition, final_)
            }
            Some(ExprKind::InlineFieldSymbol) => {
                let Some(name) = inner.find_direct_expression(ExprKind::FieldSymbol) else {
                    return Ok(AbapType::unknown(inner.concat_tokens()));
                };
                self.declare_inline(inner, name, inferred, IdentifierMeta::FieldSymbol, false)
            }
            Some(ExprKind::FieldChain) => self.resolve_field_chain(inner, Access::Write),
            _ => Ok(AbapType::unknown(inner.concat_tokens())),
        }
    }

    /// 目标是否为内联声明
    pub(crate) fn is_inline(node: NodeRef<'_>) -> bool {
        node.expressions()
            .next()
            .is_some_and(|e| e.is(ExprKind::InlineData) || e.is(ExprKind::InlineFieldSymbol))
    }

    fn declare_inline(
        &mut self,
        declaration: NodeRef<'a>,
        name: NodeRef<'a>,
        inferred: Option<&AbapType>,
        meta: IdentifierMeta,
        read_only: bool,
    ) -> Result<AbapType> {
        let Some(ty) = inferred.cloned() else {
            return Err(SyntaxError::CannotInfer {
                construct: declaration.concat_tokens(),
                span: declaration.span(),
            });
        };
        let mut identifier = TypedIdentifier::new(
            plain_name(name),
            self.file.filename.clone(),
            name.span(),
            ty.clone(),
        )
        .with_meta(IdentifierMeta::InlineDefinition)
        .with_meta(meta);
        if read_only {
            identifier = identifier.with_meta(IdentifierMeta::ReadOnly);
        }
        self.declare_variable(identifier.clone())?;
        self.reference(
            ReferenceKind::InferredType,
            name.span(),
            ReferenceTarget::Identifier(identifier),
        );
        self.record_type(name.span(), &ty);
        Ok(ty)
    }

    /// 语句出错时仍声明其中尚未声明的内联目标，类型为 Unknown
    pub(crate) fn recover_inline_declarations(
        &mut self,
        statement: NodeRef<'a>,
        error: &SyntaxError,
    ) {
        let data = statement
            .find_all_expressions(ExprKind::InlineData)
            .into_iter()
            .filter_map(|d| {
                let name = d.find_direct_expression(ExprKind::DefinitionName)?;
                Some((d, name, IdentifierMeta::InlineDefinition))
            });
        let field_symbols = statement
            .find_all_expressions(ExprKind::InlineFieldSymbol)
            .into_iter()
            .filter_map(|d| {
                let name = d.find_direct_expression(ExprKind::FieldSymbol)?;
                Some((d, name, IdentifierMeta::FieldSymbol))
            });
        let pending: Vec<_> = data.chain(field_symbols).collect();
        for (declaration, name, meta) in pending {
            if self.scope.get(self.current).variable(&plain_name(name)).is_some() {
                continue;
            }
            tracing::trace!("recovering inline {} as unknown", name.concat_tokens());
            let unknown = AbapType::unknown(error.to_string());
            if let Err(declare_error) =
                self.declare_inline(declaration, name, Some(&unknown), meta, false)
            {
                self.report(declare_error);
            }
        }
    }

    // ------------------------------------------------------------------
    // 条件
    // ------------------------------------------------------------------

    pub(crate) fn resolve_cond(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::Compare) => self.resolve_compare(child)?,
                Some(ExprKind::Cond) => self.resolve_cond(child)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn resolve_compare(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::Source) => {
                    self.resolve_source(child)?;
                }
                Some(ExprKind::ClassName) => self.resolve_class_name(child)?,
                Some(ExprKind::MethodCallChain) => {
                    self.resolve_method_call_chain(child)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `WHERE` 条件：左侧是行组件
    pub(crate) fn resolve_component_cond(
        &mut self,
        node: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::ComponentCompare) => self.resolve_component_compare(child, row)?,
                Some(ExprKind::ComponentCond) => self.resolve_component_cond(child, row)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn resolve_component_compare(
        &mut self,
        node: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        let mut component = None;
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::ComponentChain) => {
                    component = Some(self.resolve_component_chain(child, row)?);
                }
                Some(ExprKind::Source) => {
                    self.resolve_source_expecting(child, component.as_ref())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 构造表达式
    // ------------------------------------------------------------------

    /// `TypeNameOrInfer`：`#` 时返回 `None`
    fn constructor_type(
        &mut self,
        node: Option<NodeRef<'a>>,
    ) -> Result<Option<AbapType>> {
        let Some(node) = node else {
            return Ok(None);
        };
        match node.find_direct_expression(ExprKind::TypeName) {
            Some(type_name) => Ok(Some(self.resolve_type_name(type_name)?)),
            None => Ok(None),
        }
    }

    /// `VALUE`、`CONV`、`REF`、`CAST`、`EXACT`、`CORRESPONDING`、`COND`、`SWITCH`
    pub(crate) fn resolve_constructor(
        &mut self,
        node: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<AbapType> {
        let keyword = node.first_token().map(|t| t.upper()).unwrap_or_default();
        let type_node = node.find_direct_expression(ExprKind::TypeNameOrInfer);
        let explicit = if keyword == "CAST" {
            self.cast_type(type_node)?
        } else {
            self.constructor_type(type_node)?
        };
        let context = explicit.clone().or_else(|| expected.cloned());

        let body_type = match keyword.as_str() {
            "VALUE" => {
                if let Some(body) = node.find_direct_expression(ExprKind::ValueBody) {
                    self.resolve_value_body(body, context.as_ref())?;
                }
                None
            }
            "COND" => match node.find_direct_expression(ExprKind::CondBody) {
                Some(body) => self.resolve_cond_body(body, context.as_ref())?,
                None => None,
            },
            "SWITCH" => match node.find_direct_expression(ExprKind::SwitchBody) {
                Some(body) => self.resolve_switch_body(body, context.as_ref())?,
                None => None,
            },
            _ => match node.find_direct_expression(ExprKind::Source) {
                Some(source) => Some(self.resolve_source(source)?),
                None => None,
            },
        };

        if let Some(ty) = explicit {
            return Ok(ty);
        }
        if keyword == "REF" {
            if let Some(source) = body_type {
                return Ok(AbapType::data_reference(source));
            }
        }
        if let Some(ty) = expected {
            return Ok(ty.clone());
        }
        match (keyword.as_str(), body_type) {
            ("COND" | "SWITCH", Some(ty)) => Ok(ty),
            _ => Err(SyntaxError::CannotInfer {
                construct: format!("{} #", keyword),
                span: node.span(),
            }),
        }
    }

    /// `CAST` 的目标：类或接口得到对象引用，否则是数据类型
    fn cast_type(
        &mut self,
        node: Option<NodeRef<'a>>,
    ) -> Result<Option<AbapType>> {
        let Some(type_name) = node.and_then(|n| n.find_direct_expression(ExprKind::TypeName)) else {
            return Ok(None);
        };
        let name = type_name.concat_upper();
        if self.is_known_class_or_interface(&name) || self.class_context.as_deref() == Some(name.as_str()) {
            self.reference(
                ReferenceKind::ObjectOriented,
                type_name.span(),
                ReferenceTarget::Class(name.clone()),
            );
            return Ok(Some(AbapType::object_reference(name)));
        }
        Ok(Some(self.resolve_type_name(type_name)?))
    }

    /// `VALUE ty( comp = x ( ... ) )`：组件名按行或结构检查
    fn resolve_value_body(
        &mut self,
        body: NodeRef<'a>,
        target: Option<&AbapType>,
    ) -> Result<()> {
        let row = target.map(|t| match t {
            AbapType::Table(table) => (*table.row).clone(),
            other => other.clone(),
        });
        let mut base_seen = false;
        for child in body.children() {
            match child {
                ChildRef::Token(_, token) if token.is("BASE") => base_seen = true,
                ChildRef::Node(inner) => match inner.expr_kind() {
                    Some(ExprKind::Source) if base_seen => {
                        base_seen = false;
                        self.resolve_source_expecting(inner, target)?;
                    }
                    Some(ExprKind::Source) => {
                        self.resolve_source_expecting(inner, row.as_ref())?;
                    }
                    Some(ExprKind::ParameterListS) => {
                        self.resolve_component_assignments(inner, row.as_ref())?;
                    }
                    _ => {}
                },
                ChildRef::Token(..) => {}
            }
        }
        Ok(())
    }

    /// `comp = source`，组件必须存在于 `row`
    fn resolve_component_assignments(
        &mut self,
        list: NodeRef<'a>,
        row: Option<&AbapType>,
    ) -> Result<()> {
        for parameter in list.find_direct_expressions(ExprKind::ParameterS) {
            let Some(source) = parameter.find_direct_expression(ExprKind::Source) else {
                continue;
            };
            let component = match (row, parameter.find_direct_expression(ExprKind::ParameterName)) {
                (Some(row), Some(name)) if row.is_structure() => {
                    Some(self.component_of(row, name)?)
                }
                _ => None,
            };
            self.resolve_source_expecting(source, component.as_ref())?;
        }
        Ok(())
    }

    /// 返回第一个 `THEN` 分支的类型
    fn resolve_cond_body(
        &mut self,
        body: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<Option<AbapType>> {
        let mut first = None;
        for child in body.expressions() {
            match child.expr_kind() {
                Some(ExprKind::Cond) => self.resolve_cond(child)?,
                Some(ExprKind::Source) => {
                    let ty = self.resolve_source_expecting(child, expected)?;
                    first.get_or_insert(ty);
                }
                _ => {}
            }
        }
        Ok(first)
    }

    fn resolve_switch_body(
        &mut self,
        body: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<Option<AbapType>> {
        let mut first = None;
        let mut after_then = false;
        for child in body.children() {
            match child {
                ChildRef::Token(_, token) => after_then = token.is("THEN") || token.is("ELSE"),
                ChildRef::Node(source) if source.is(ExprKind::Source) => {
                    if after_then {
                        let ty = self.resolve_source_expecting(source, expected)?;
                        first.get_or_insert(ty);
                    } else {
                        self.resolve_source(source)?;
                    }
                }
                ChildRef::Node(_) => {}
            }
        }
        Ok(first)
    }

    /// `NEW zcl_foo( ... )` / `NEW #( ... )`
    pub(crate) fn resolve_new_object(
        &mut self,
        node: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<AbapType> {
        let type_node = node.find_direct_expression(ExprKind::TypeNameOrInfer);
        let type_name = type_node.and_then(|t| t.find_direct_expression(ExprKind::TypeName));
        let ty = match type_name {
            Some(type_name) => {
                let name = type_name.concat_upper();
                if self.is_known_class_or_interface(&name) || self.class_context.as_deref() == Some(name.as_str()) {
                    self.resolve_class_name(type_name)?;
                    AbapType::object_reference(name)
                } else if self.scope.find_type(self.current, &name).is_some() {
                    AbapType::data_reference(self.resolve_type_name(type_name)?)
                } else {
                    let span = type_name.span();
                    self.void_or(
                        &name,
                        span,
                        SyntaxError::ClassNotFound {
                            name: name.clone(),
                            span,
                        },
                    )?
                }
            }
            None => match expected {
                Some(ty) => ty.clone(),
                None => {
                    return Err(SyntaxError::CannotInfer {
                        construct: "NEW #".to_string(),
                        span: node.span(),
                    })
                }
            },
        };

        let param = node.find_direct_expression(ExprKind::MethodCallParam);
        match (&ty, param) {
            (AbapType::ObjectReference(class), Some(param)) => {
                self.check_constructor_call(class, param, node.span())?
            }
            (AbapType::DataReference { target, .. }, Some(param)) => {
                if let Some(source) = param.find_direct_expression(ExprKind::Source) {
                    self.resolve_source_expecting(source, Some(target))?;
                } else if let Some(list) = param.find_direct_expression(ExprKind::ParameterListS) {
                    self.resolve_component_assignments(list, Some(target))?;
                }
            }
            (_, Some(param)) => self.resolve_parameters_loosely(param)?,
            _ => {}
        }
        Ok(ty)
    }

    /// `IS SUPPLIED` 等以外的简单取值：`CASE` 的 `WHEN a OR b`
    pub(crate) fn resolve_sources(
        &mut self,
        node: NodeRef<'a>,
        expected: Option<&AbapType>,
    ) -> Result<()> {
        for source in node.find_direct_expressions(ExprKind::Source) {
            self.resolve_source_expecting(source, expected)?;
        }
        Ok(())
    }

    /// `CASTING TYPE ...` 等附加的类型
    pub(crate) fn casting_type(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<Option<AbapType>> {
        if !has_word(node, "CASTING") {
            return Ok(None);
        }
        match node.find_direct_expression(ExprKind::TypeName) {
            Some(type_name) => Ok(Some(self.resolve_type_name(type_name)?)),
            None => Ok(None),
        }
    }
}
