//! 语句分派
//!
//! 每种语句一个处理函数；声明交给 `declarations`，调用交给 `calls`，
//! 其余在这里把源、目标与条件交给表达式解析。

use super::definitions::Visibility;
use super::errors::{Result, SyntaxError};
use super::expressions::Access;
use super::references::{ReferenceKind, ReferenceTarget};
use super::resolver::{has_word, sections, Pass, Resolver};
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::{ExprKind, NodeRef, StatementKind};
use crate::frontend::core::type_system::{assignable, AbapType, GenericKind};
use crate::util::span::Span;

fn incompatible(
    from: &AbapType,
    to: &AbapType,
    span: Span,
) -> SyntaxError {
    SyntaxError::IncompatibleTypes {
        from: from.type_name(),
        to: to.type_name(),
        span,
    }
}

impl<'a> Resolver<'a> {
    pub(crate) fn statement(
        &mut self,
        index: usize,
    ) -> Result<()> {
        use StatementKind as S;
        let kind = self.file.statements[index].kind;
        let node = self.statement_node(index);
        tracing::trace!("statement {} {:?}", index, kind);

        match kind {
            S::Data | S::ClassData | S::Statics | S::Constants | S::Types => {
                self.declare_data(node, kind)
            }
            S::FieldSymbol => self.declare_field_symbol(node),
            S::Tables => self.declare_tables(node),
            S::Parameter => self.declare_parameter(node),

            // 类定义部分只在第一遍收集
            S::MethodDef if self.collecting.is_some() => self.define_method(node),
            S::InterfaceDef if self.collecting.is_some() => self.define_interfaces(node),
            S::Public | S::Protected | S::Private => {
                self.set_visibility(match kind {
                    S::Public => Visibility::Public,
                    S::Protected => Visibility::Protected,
                    _ => Visibility::Private,
                });
                Ok(())
            }

            _ if self.pass == Pass::Definitions => Ok(()),

            S::Move => self.resolve_move(node),
            S::Call => self.resolve_call(node),
            S::CallFunction => self.resolve_call_function(node),
            S::CreateObject => self.resolve_create_object(node),
            S::Perform => self.resolve_perform(node),

            S::If | S::ElseIf | S::While | S::Check => self.resolve_conditions(node),
            S::Assert => {
                self.resolve_sources(node, None)?;
                self.resolve_conditions(node)
            }
            S::Case => self.resolve_sources(node, None),
            S::When => self.resolve_when(node),
            S::Do => {
                let times = AbapType::integer();
                self.resolve_sources(node, Some(&times))
            }
            S::Loop => self.resolve_loop(node),
            S::Continue if self.loop_depth == 0 => Err(SyntaxError::WrongContext {
                message: "CONTINUE is only allowed inside a loop".to_string(),
                span: node.span(),
            }),
            S::Catch => self.resolve_catch(node),
            S::Cleanup => {
                let root = AbapType::object_reference("CX_ROOT");
                for target in node.find_direct_expressions(ExprKind::Target) {
                    self.resolve_target(target, Some(&root))?;
                }
                Ok(())
            }
            S::Raise => self.resolve_raise(node),

            S::Clear | S::Free => {
                for target in node.find_direct_expressions(ExprKind::Target) {
                    self.resolve_target(target, None)?;
                }
                self.resolve_sources(node, None)
            }
            S::Append => self.resolve_append(node),
            S::Insert => self.resolve_insert(node),
            S::ModifyInternal => self.resolve_modify(node),
            S::ReadTable => self.resolve_read_table(node),
            S::InsertDatabase | S::ModifyDatabase => self.resolve_database_change(node),
            S::Assign => self.resolve_assign(node),

            S::Concatenate | S::Message => {
                self.resolve_sources(node, None)?;
                let text = AbapType::string();
                for target in node.find_direct_expressions(ExprKind::Target) {
                    self.resolve_target(target, Some(&text))?;
                }
                Ok(())
            }
            S::Write | S::Uline => self.resolve_write(node),

            _ => Ok(()),
        }
    }

    fn resolve_conditions(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        for cond in node.find_direct_expressions(ExprKind::Cond) {
            self.resolve_cond(cond)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 赋值
    // ------------------------------------------------------------------

    /// `a = b = src`、`a ?= src`、`a += src`、`MOVE src TO a`
    ///
    /// 先解析非内联目标，第一个目标的类型用于 `#` 推断；内联目标取源类型。
    /// 只有普通 `=` 与 `MOVE` 检查兼容性。
    fn resolve_move(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(source) = node.find_direct_expression(ExprKind::Source) else {
            return Ok(());
        };
        let targets = node.find_direct_expressions(ExprKind::Target);
        let checked = node
            .direct_tokens()
            .all(|t| t.kind != TokenKind::CastEquals && t.kind != TokenKind::CompoundAssign);

        let mut declared = Vec::new();
        for target in &targets {
            if !Self::is_inline(*target) {
                let ty = self.resolve_target(*target, None)?;
                declared.push(ty);
            }
        }

        let source_type = self.resolve_source_expecting(source, declared.first())?;
        for target in &targets {
            if Self::is_inline(*target) {
                self.resolve_target(*target, Some(&source_type))?;
            }
        }

        if checked {
            if let Some(target) = declared.iter().find(|t| !assignable(&source_type, t)) {
                return Err(incompatible(&source_type, target, source.span()));
            }
        }
        Ok(())
    }

    /// `ASSIGN src TO <fs> [CASTING TYPE ty]`
    ///
    /// 动态或 `COMPONENT` 形式赋予泛型 `data`。
    fn resolve_assign(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let casting = self.casting_type(node)?;
        let generic = has_word(node, "COMPONENT");
        let mut assigned: Option<AbapType> = None;
        let mut dynamic = false;
        let mut seen_target = false;

        for (keyword, child) in sections(node) {
            match child.expr_kind() {
                Some(ExprKind::Target) => {
                    seen_target = true;
                    let ty = match (&casting, &assigned) {
                        (Some(casting), _) => casting.clone(),
                        _ if generic || dynamic => AbapType::Generic(GenericKind::Data),
                        (None, Some(ty)) => ty.clone(),
                        (None, None) => AbapType::Generic(GenericKind::Data),
                    };
                    self.resolve_target(child, Some(&ty))?;
                }
                Some(ExprKind::Source) => {
                    let ty = self.resolve_source(child)?;
                    if !seen_target && assigned.is_none() && keyword != "FIELD" {
                        assigned = Some(ty);
                    }
                }
                Some(ExprKind::Dynamic) => {
                    self.resolve_parameters_loosely(child)?;
                    dynamic |= !seen_target;
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 控制流
    // ------------------------------------------------------------------

    /// `WHEN a OR b`、`WHEN TYPE cls INTO ref`
    fn resolve_when(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        match node.find_direct_expression(ExprKind::ClassName) {
            Some(class) => {
                self.resolve_class_name(class)?;
                let ty = AbapType::object_reference(class.concat_upper());
                for target in node.find_direct_expressions(ExprKind::Target) {
                    self.resolve_target(target, Some(&ty))?;
                }
                Ok(())
            }
            None => self.resolve_sources(node, None),
        }
    }

    /// `LOOP AT itab INTO wa FROM a TO b WHERE cond`
    fn resolve_loop(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(source) = node.find_direct_expression(ExprKind::Source) else {
            return Ok(());
        };
        let table = self.resolve_source(source)?;
        let row = self.row_of(&table, &source.concat_tokens(), source.span())?;

        let index = AbapType::integer();
        for (_, child) in sections(node).into_iter().skip(1) {
            match child.expr_kind() {
                Some(ExprKind::LoopTarget) => self.resolve_loop_target(child, &row)?,
                Some(ExprKind::Source) => {
                    self.resolve_source_expecting(child, Some(&index))?;
                }
                Some(ExprKind::ComponentCond) => self.resolve_component_cond(child, &row)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// `INTO wa` | `ASSIGNING <fs>` | `REFERENCE INTO ref`
    fn resolve_loop_target(
        &mut self,
        node: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        let Some(target) = node.find_direct_expression(ExprKind::Target) else {
            return Ok(());
        };
        if has_word(node, "REFERENCE") {
            let reference = AbapType::data_reference(row.clone());
            self.resolve_target(target, Some(&reference))?;
        } else if has_word(node, "ASSIGNING") || Self::is_inline(target) {
            self.resolve_target(target, Some(row))?;
        } else {
            let ty = self.resolve_target(target, None)?;
            if !assignable(row, &ty) {
                return Err(incompatible(row, &ty, target.span()));
            }
        }
        Ok(())
    }

    /// `CATCH cx_a cx_b INTO ref`：引用取第一个异常类
    fn resolve_catch(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let classes = node.find_direct_expressions(ExprKind::ClassName);
        for class in &classes {
            self.resolve_class_name(*class)?;
        }
        let Some(target) = node.find_direct_expression(ExprKind::Target) else {
            return Ok(());
        };
        let name = classes
            .first()
            .map(|c| c.concat_upper())
            .unwrap_or_else(|| "CX_ROOT".to_string());
        let ty = AbapType::object_reference(name);
        self.resolve_target(target, Some(&ty))?;
        Ok(())
    }

    /// `RAISE EXCEPTION TYPE cx EXPORTING ...` | `RAISE EXCEPTION ref` | `RAISE name`
    fn resolve_raise(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        if let Some(class) = node.find_direct_expression(ExprKind::ClassName) {
            self.resolve_class_name(class)?;
            let exporting = node.find_direct_expression(ExprKind::ParameterListS);
            return self.check_constructor(&class.concat_upper(), exporting, class.span());
        }
        if let Some(source) = node.find_direct_expression(ExprKind::Source) {
            let ty = self.resolve_source(source)?;
            if !ty.is_permissive() && !ty.is_object_reference() {
                return Err(SyntaxError::NotAnObjectReference {
                    name: source.concat_tokens(),
                    span: source.span(),
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 内表
    // ------------------------------------------------------------------

    /// 内表目标的行类型
    fn table_target(
        &mut self,
        target: NodeRef<'a>,
    ) -> Result<AbapType> {
        let table = self.resolve_target(target, None)?;
        self.row_of(&table, &target.concat_tokens(), target.span())
    }

    /// 行源：必须可赋给行类型
    fn resolve_row_source(
        &mut self,
        source: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        let ty = self.resolve_source_expecting(source, Some(row))?;
        if !assignable(&ty, row) {
            return Err(incompatible(&ty, row, source.span()));
        }
        Ok(())
    }

    /// `LINES OF itab`：源必须是内表
    fn resolve_lines_of(
        &mut self,
        source: NodeRef<'a>,
    ) -> Result<()> {
        let ty = self.resolve_source(source)?;
        self.row_of(&ty, &source.concat_tokens(), source.span())?;
        Ok(())
    }

    /// 表之后的 `ASSIGNING <fs>` 或 `REFERENCE INTO ref`
    fn resolve_line_target(
        &mut self,
        keyword: &str,
        target: NodeRef<'a>,
        row: &AbapType,
    ) -> Result<()> {
        let ty = match keyword {
            "INTO" => AbapType::data_reference(row.clone()),
            _ => row.clone(),
        };
        self.resolve_target(target, Some(&ty))?;
        Ok(())
    }

    /// `APPEND [INITIAL LINE|LINES OF src|src] TO itab [ASSIGNING ...]`，
    /// 或带表头行的 `APPEND itab`
    fn resolve_append(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let items = sections(node);
        let table = items
            .iter()
            .find(|(keyword, child)| keyword == "TO" && child.is(ExprKind::Target))
            .map(|(_, child)| *child);
        let Some(table) = table else {
            if let Some(target) = node.find_direct_expression(ExprKind::Target) {
                self.table_target(target)?;
            }
            return Ok(());
        };
        let row = self.table_target(table)?;
        let lines_of = has_word(node, "LINES");
        let index = AbapType::integer();

        let mut past_table = false;
        for (keyword, child) in items {
            if child.id() == table.id() {
                past_table = true;
                continue;
            }
            match child.expr_kind() {
                Some(ExprKind::Source) if lines_of && keyword == "OF" => {
                    self.resolve_lines_of(child)?;
                }
                Some(ExprKind::Source) if lines_of => {
                    self.resolve_source_expecting(child, Some(&index))?;
                }
                Some(ExprKind::Source) => self.resolve_row_source(child, &row)?,
                Some(ExprKind::Target) if past_table => {
                    self.resolve_line_target(&keyword, child, &row)?;
                }
                Some(ExprKind::ComponentChain) => {
                    self.resolve_component_chain(child, &row)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `INSERT [INITIAL LINE|LINES OF src|src] INTO [TABLE] itab [INDEX i]`
    fn resolve_insert(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(table) = node.find_direct_expression(ExprKind::Target) else {
            return Ok(());
        };
        let row = self.table_target(table)?;
        let index = AbapType::integer();

        let mut past_table = false;
        for (keyword, child) in sections(node) {
            if child.id() == table.id() {
                past_table = true;
                continue;
            }
            match child.expr_kind() {
                Some(ExprKind::Source) if past_table => {
                    self.resolve_source_expecting(child, Some(&index))?;
                }
                Some(ExprKind::Source) if keyword == "OF" => self.resolve_lines_of(child)?,
                Some(ExprKind::Source) => self.resolve_row_source(child, &row)?,
                Some(ExprKind::Target) => self.resolve_line_target(&keyword, child, &row)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// `MODIFY [TABLE] itab [INDEX i] FROM wa [TRANSPORTING c] [WHERE cond]`
    fn resolve_modify(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(table) = node.find_direct_expression(ExprKind::Target) else {
            return Ok(());
        };
        let row = self.table_target(table)?;
        let index = AbapType::integer();

        for (keyword, child) in sections(node) {
            match child.expr_kind() {
                Some(ExprKind::Source) if keyword == "INDEX" => {
                    self.resolve_source_expecting(child, Some(&index))?;
                }
                Some(ExprKind::Source) => self.resolve_row_source(child, &row)?,
                Some(ExprKind::ComponentChain) => {
                    self.resolve_component_chain(child, &row)?;
                }
                Some(ExprKind::ComponentCond) => self.resolve_component_cond(child, &row)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// `READ TABLE itab [INDEX i] [WITH KEY ...] [INTO wa] [TRANSPORTING ...]`
    fn resolve_read_table(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(source) = node.find_direct_expression(ExprKind::Source) else {
            return Ok(());
        };
        let table = self.resolve_source(source)?;
        let row = self.row_of(&table, &source.concat_tokens(), source.span())?;
        let index = AbapType::integer();

        for (keyword, child) in sections(node).into_iter().skip(1) {
            match child.expr_kind() {
                Some(ExprKind::Source) if keyword == "INDEX" => {
                    self.resolve_source_expecting(child, Some(&index))?;
                }
                Some(ExprKind::Source) => {
                    self.resolve_source(child)?;
                }
                Some(ExprKind::ComponentCompare) => self.resolve_component_compare(child, &row)?,
                Some(ExprKind::ComponentChain) => {
                    self.resolve_component_chain(child, &row)?;
                }
                Some(ExprKind::LoopTarget) => self.resolve_loop_target(child, &row)?,
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 数据库与输出
    // ------------------------------------------------------------------

    /// `INSERT dbtab FROM wa`、`MODIFY dbtab FROM TABLE itab`
    fn resolve_database_change(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        if let Some(table) = node.find_direct_expression(ExprKind::DatabaseTable) {
            if let Some(dynamic) = table.find_direct_expression(ExprKind::Dynamic) {
                self.resolve_parameters_loosely(dynamic)?;
            } else {
                let name = table.concat_upper();
                let span = table.span();
                match self.dictionary.lookup_table_or_view(&name) {
                    Some(_) => self.reference(ReferenceKind::Type, span, ReferenceTarget::Void(name)),
                    None => {
                        self.void_or(
                            &name,
                            span,
                            SyntaxError::TableNotFound {
                                name: name.clone(),
                                span,
                            },
                        )?;
                    }
                }
            }
        }
        self.resolve_sources(node, None)
    }

    /// `WRITE src [TO target]`、`WRITE AT pos(len) src`、`ULINE AT pos(len)`
    fn resolve_write(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        if let Some(position) = node.find_direct_expression(ExprKind::WriteOffsetLength) {
            for field in position.find_direct_expressions(ExprKind::FieldChain) {
                self.resolve_field_chain(field, Access::Read)?;
            }
        }
        self.resolve_sources(node, None)?;
        let text = AbapType::string();
        for target in node.find_direct_expressions(ExprKind::Target) {
            self.resolve_target(target, Some(&text))?;
        }
        Ok(())
    }
}
