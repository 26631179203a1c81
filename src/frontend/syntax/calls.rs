//! 调用
//!
//! 方法调用链、`CALL METHOD`、`CALL FUNCTION`、`CREATE OBJECT`、`NEW` 与
//! `PERFORM`。找到签名时检查参数名、必需参数和可赋值性；调用目标位于已
//! 分析源码之外时只解析实参。

use std::collections::HashSet;

use super::builtin::{self, BuiltinFunction};
use super::definitions::{MethodDefinition, MethodParameter, ParameterKind};
use super::errors::{Result, SyntaxError};
use super::expressions::Access;
use super::references::{ReferenceKind, ReferenceTarget};
use super::resolver::{has_word, Resolver, MAX_HIERARCHY_DEPTH};
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::{ChildRef, ExprKind, NodeRef};
use crate::frontend::core::type_system::{assignable, AbapType, GenericKind};
use crate::util::span::Span;

/// 调用的接收者
#[derive(Debug, Clone)]
enum CallContext {
    /// `meth( )`
    Unqualified,
    /// `zcl_foo=>meth( )`
    Static(String, Span),
    /// `ref->meth( )`
    Instance(AbapType),
}

/// 被调用者
#[derive(Debug, Clone)]
enum Callable {
    Builtin(&'static BuiltinFunction),
    Method {
        owner: String,
        method: MethodDefinition,
    },
    /// 签名未知
    Void,
}

/// 方法或函数模块的签名视图
struct Signature<'s> {
    name: &'s str,
    parameters: &'s [MethodParameter],
}

impl<'s> Signature<'s> {
    fn of_method(method: &'s MethodDefinition) -> Self {
        Self {
            name: &method.name,
            parameters: &method.parameters,
        }
    }

    fn parameter(
        &self,
        name: &str,
        kinds: &[ParameterKind],
    ) -> Option<&'s MethodParameter> {
        self.parameters
            .iter()
            .find(|p| p.is(name) && kinds.contains(&p.kind))
    }

    /// 必须提供但未提供的第一个参数
    fn first_missing(
        &self,
        kinds: &[ParameterKind],
        supplied: &HashSet<String>,
    ) -> Option<&'s MethodParameter> {
        self.parameters.iter().find(|p| {
            !p.optional && kinds.contains(&p.kind) && !supplied.contains(&p.name.to_ascii_uppercase())
        })
    }
}

const METHOD_REQUIRED: &[ParameterKind] = &[ParameterKind::Importing, ParameterKind::Changing];
const FUNCTION_REQUIRED: &[ParameterKind] = &[
    ParameterKind::Importing,
    ParameterKind::Changing,
    ParameterKind::Tables,
];

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
    // ------------------------------------------------------------------
    // 方法调用链
    // ------------------------------------------------------------------

    /// `a->b( )->c( )`，返回最后一个调用的返回类型
    pub(crate) fn resolve_method_call_chain(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<AbapType> {
        let mut context = CallContext::Unqualified;
        let mut ty = AbapType::unknown(node.concat_tokens());
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::ClassName) => {
                    context = CallContext::Static(child.concat_upper(), child.span());
                }
                Some(ExprKind::FieldChain) => {
                    context = CallContext::Instance(self.resolve_field_chain(child, Access::Read)?);
                }
                Some(ExprKind::NewObject) => {
                    context = CallContext::Instance(self.resolve_new_object(child, None)?);
                }
                Some(ExprKind::MethodCall) => {
                    ty = self.resolve_method_call(child, &context)?;
                    context = CallContext::Instance(ty.clone());
                }
                _ => {}
            }
        }
        self.record_type(node.span(), &ty);
        Ok(ty)
    }

    fn resolve_method_call(
        &mut self,
        call: NodeRef<'a>,
        context: &CallContext,
    ) -> Result<AbapType> {
        let Some(name_node) = call.find_direct_expression(ExprKind::MethodName) else {
            return Ok(AbapType::unknown(call.concat_tokens()));
        };
        let param = call.find_direct_expression(ExprKind::MethodCallParam);
        match self.find_callable(name_node, context)? {
            Callable::Builtin(function) => {
                self.reference(
                    ReferenceKind::BuiltinMethod,
                    name_node.span(),
                    ReferenceTarget::Builtin(function.name.to_string()),
                );
                if let Some(param) = param {
                    self.resolve_parameters_loosely(param)?;
                }
                Ok(function.returns.clone())
            }
            Callable::Method { owner, method } => {
                self.reference(
                    ReferenceKind::MethodReference,
                    name_node.span(),
                    ReferenceTarget::Method {
                        owner,
                        name: method.name.clone(),
                    },
                );
                self.check_call(&method, param, name_node.span())?;
                Ok(match method.returning() {
                    Some(returning) => returning.ty.clone(),
                    None => AbapType::unknown(format!("{} has no RETURNING parameter", method.name)),
                })
            }
            Callable::Void => {
                if let Some(param) = param {
                    self.resolve_parameters_loosely(param)?;
                }
                Ok(AbapType::void(name_node.concat_upper()))
            }
        }
    }

    /// 类层次中有缺失的父类或接口时，未知成员按 void 处理
    fn has_void_ancestor(
        &self,
        name: &str,
    ) -> bool {
        let mut current = name.to_string();
        for _ in 0..=MAX_HIERARCHY_DEPTH {
            if let Some(class) = self.find_class(&current) {
                if class
                    .interfaces
                    .iter()
                    .any(|i| !self.is_known_class_or_interface(i))
                {
                    return true;
                }
                match &class.superclass {
                    Some(parent) => current = parent.clone(),
                    None => return false,
                }
            } else if let Some(interface) = self.find_interface(&current) {
                return interface
                    .interfaces
                    .iter()
                    .any(|i| !self.is_known_class_or_interface(i));
            } else {
                return true;
            }
        }
        false
    }

    fn find_callable(
        &mut self,
        name_node: NodeRef<'a>,
        context: &CallContext,
    ) -> Result<Callable> {
        let name = name_node.concat_upper();
        let span = name_node.span();
        match context {
            CallContext::Unqualified => {
                if let Some(class) = self.class_context.clone() {
                    if let Some((owner, method)) = self.find_method(&class, &name) {
                        return Ok(Callable::Method { owner, method });
                    }
                }
                if let Some(function) = builtin::function(&name) {
                    return Ok(Callable::Builtin(function));
                }
                match self.class_context.clone() {
                    Some(class) if self.has_void_ancestor(&class) => Ok(Callable::Void),
                    _ => Err(SyntaxError::MethodNotFound { name, span }),
                }
            }
            CallContext::Static(owner, owner_span) => {
                if self.is_known_class_or_interface(owner) {
                    self.reference(
                        ReferenceKind::ObjectOriented,
                        *owner_span,
                        ReferenceTarget::Class(owner.clone()),
                    );
                    if let Some((owner, method)) = self.find_method(owner, &name) {
                        return Ok(Callable::Method { owner, method });
                    }
                    if self.has_void_ancestor(owner) {
                        return Ok(Callable::Void);
                    }
                    return Err(SyntaxError::MethodNotFound {
                        name: format!("{}=>{}", owner, name),
                        span,
                    });
                }
                self.void_or(
                    owner,
                    *owner_span,
                    SyntaxError::ClassNotFound {
                        name: owner.clone(),
                        span: *owner_span,
                    },
                )?;
                Ok(Callable::Void)
            }
            CallContext::Instance(ty) => match ty {
                AbapType::ObjectReference(class) => {
                    if let Some((owner, method)) = self.find_method(class, &name) {
                        return Ok(Callable::Method { owner, method });
                    }
                    if self.is_known_class_or_interface(class) && !self.has_void_ancestor(class) {
                        return Err(SyntaxError::MethodNotFound {
                            name: format!("{}->{}", class, name),
                            span,
                        });
                    }
                    Ok(Callable::Void)
                }
                AbapType::Generic(GenericKind::Object | GenericKind::Any) => Ok(Callable::Void),
                other if other.is_permissive() => Ok(Callable::Void),
                other => Err(SyntaxError::NotAnObjectReference {
                    name: other.type_name(),
                    span,
                }),
            },
        }
    }

    // ------------------------------------------------------------------
    // 实参检查
    // ------------------------------------------------------------------

    /// 检查 `MethodCallParam` 或 `MethodParameters`；`None` 表示没有任何实参
    fn check_call(
        &mut self,
        method: &MethodDefinition,
        param: Option<NodeRef<'a>>,
        span: Span,
    ) -> Result<()> {
        let signature = Signature::of_method(method);
        let inner = match param {
            Some(param) if param.is(ExprKind::MethodCallParam) => param.expressions().next(),
            other => other,
        };
        let Some(inner) = inner else {
            return match signature.first_missing(METHOD_REQUIRED, &HashSet::new()) {
                Some(missing) => Err(SyntaxError::ParameterMissing {
                    name: missing.name.clone(),
                    span,
                }),
                None => Ok(()),
            };
        };

        match inner.expr_kind() {
            Some(ExprKind::Source) => {
                let Some(parameter) = method.default_importing() else {
                    self.resolve_source(inner)?;
                    return Err(SyntaxError::NoImportingParameter {
                        method: method.name.clone(),
                        span,
                    });
                };
                let ty = self.resolve_source_expecting(inner, Some(&parameter.ty))?;
                if !assignable(&ty, &parameter.ty) {
                    return Err(incompatible(&ty, &parameter.ty, inner.span()));
                }
                let supplied = HashSet::from([parameter.name.to_ascii_uppercase()]);
                if let Some(missing) = signature.first_missing(METHOD_REQUIRED, &supplied) {
                    return Err(SyntaxError::ParameterMissing {
                        name: missing.name.clone(),
                        span,
                    });
                }
                Ok(())
            }
            Some(ExprKind::ParameterListS) => {
                let supplied = self.check_sources(&signature, inner, &[ParameterKind::Importing])?;
                if let Some(missing) = signature.first_missing(METHOD_REQUIRED, &supplied) {
                    return Err(SyntaxError::ParameterMissing {
                        name: missing.name.clone(),
                        span,
                    });
                }
                Ok(())
            }
            Some(ExprKind::MethodParameters) => {
                let supplied = self.check_sections(&signature, inner, false)?;
                if let Some(missing) = signature.first_missing(METHOD_REQUIRED, &supplied) {
                    return Err(SyntaxError::ParameterMissing {
                        name: missing.name.clone(),
                        span,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// `EXPORTING`/`IMPORTING`/`TABLES`/`CHANGING`/`RECEIVING`/`EXCEPTIONS` 各段
    ///
    /// 调用方的 `EXPORTING` 对应形参的 importing，反之亦然。
    fn check_sections(
        &mut self,
        signature: &Signature<'_>,
        node: NodeRef<'a>,
        function: bool,
    ) -> Result<HashSet<String>> {
        let mut supplied = HashSet::new();
        let mut keyword = String::new();
        for child in node.children() {
            let inner = match child {
                ChildRef::Token(_, token) => {
                    if token.is_word() {
                        keyword = token.upper();
                    }
                    continue;
                }
                ChildRef::Node(inner) => inner,
            };
            match keyword.as_str() {
                "EXPORTING" => {
                    supplied.extend(self.check_sources(signature, inner, &[ParameterKind::Importing])?)
                }
                "IMPORTING" => {
                    self.check_targets(signature, inner, &[ParameterKind::Exporting])?;
                }
                "CHANGING" => {
                    supplied.extend(self.check_targets(signature, inner, &[ParameterKind::Changing])?)
                }
                "TABLES" if function => {
                    supplied.extend(self.check_targets(signature, inner, &[ParameterKind::Tables])?)
                }
                "RECEIVING" => {
                    self.check_targets(signature, inner, &[ParameterKind::Returning])?;
                }
                _ => self.resolve_parameters_loosely(inner)?,
            }
        }
        Ok(supplied)
    }

    /// `name = source` 列表
    fn check_sources(
        &mut self,
        signature: &Signature<'_>,
        list: NodeRef<'a>,
        kinds: &[ParameterKind],
    ) -> Result<HashSet<String>> {
        let mut supplied = HashSet::new();
        for parameter in list.find_direct_expressions(ExprKind::ParameterS) {
            let (Some(name), Some(source)) = (
                parameter.find_direct_expression(ExprKind::ParameterName),
                parameter.find_direct_expression(ExprKind::Source),
            ) else {
                continue;
            };
            let name = name.concat_upper();
            let Some(formal) = signature.parameter(&name, kinds) else {
                return Err(SyntaxError::UnknownParameter {
                    method: signature.name.to_string(),
                    name,
                    span: parameter.span(),
                });
            };
            let ty = self.resolve_source_expecting(source, Some(&formal.ty))?;
            if !assignable(&ty, &formal.ty) {
                return Err(incompatible(&ty, &formal.ty, source.span()));
            }
            supplied.insert(name);
        }
        Ok(supplied)
    }

    /// `name = target` 列表；内联声明取形参类型
    fn check_targets(
        &mut self,
        signature: &Signature<'_>,
        list: NodeRef<'a>,
        kinds: &[ParameterKind],
    ) -> Result<HashSet<String>> {
        let parameters = if list.is(ExprKind::ParameterT) {
            vec![list]
        } else {
            list.find_direct_expressions(ExprKind::ParameterT)
        };
        let mut supplied = HashSet::new();
        for parameter in parameters {
            let (Some(name), Some(target)) = (
                parameter.find_direct_expression(ExprKind::ParameterName),
                parameter.find_direct_expression(ExprKind::Target),
            ) else {
                continue;
            };
            let name = name.concat_upper();
            let Some(formal) = signature.parameter(&name, kinds) else {
                return Err(SyntaxError::UnknownParameter {
                    method: signature.name.to_string(),
                    name,
                    span: parameter.span(),
                });
            };
            let inline = Self::is_inline(target);
            let ty = self.resolve_target(target, Some(&formal.ty))?;
            if !inline && !assignable(&formal.ty, &ty) {
                return Err(incompatible(&formal.ty, &ty, target.span()));
            }
            supplied.insert(name);
        }
        Ok(supplied)
    }

    /// 签名未知时只解析实参；内联声明的类型为 void，动态名称中的字段按读处理
    pub(crate) fn resolve_parameters_loosely(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        for child in node.expressions() {
            match child.expr_kind() {
                Some(ExprKind::Source) => {
                    self.resolve_source(child)?;
                }
                Some(ExprKind::Target) => {
                    let inferred = AbapType::void(child.concat_upper());
                    self.resolve_target(child, Some(&inferred))?;
                }
                Some(ExprKind::ParameterT) => {
                    if let Some(target) = child.find_direct_expression(ExprKind::Target) {
                        let name = child
                            .find_direct_expression(ExprKind::ParameterName)
                            .map(|n| n.concat_upper())
                            .unwrap_or_default();
                        self.resolve_target(target, Some(&AbapType::void(name)))?;
                    }
                }
                Some(ExprKind::FieldChain) => {
                    self.resolve_field_chain(child, Access::Read)?;
                }
                Some(ExprKind::ParameterS)
                | Some(ExprKind::ParameterException)
                | Some(ExprKind::Dynamic)
                | Some(ExprKind::ParameterListS)
                | Some(ExprKind::ParameterListT)
                | Some(ExprKind::ParameterListExceptions)
                | Some(ExprKind::MethodParameters)
                | Some(ExprKind::FunctionParameters)
                | Some(ExprKind::MethodCallParam) => self.resolve_parameters_loosely(child)?,
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 语句
    // ------------------------------------------------------------------

    /// `CALL METHOD ...` 或方法调用语句
    pub(crate) fn resolve_call(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        if let Some(chain) = node.find_direct_expression(ExprKind::MethodCallChain) {
            self.resolve_method_call_chain(chain)?;
            return Ok(());
        }
        let Some(source) = node.find_direct_expression(ExprKind::MethodSource) else {
            return Ok(());
        };
        let params = node
            .find_direct_expression(ExprKind::MethodCallParam)
            .or_else(|| node.find_direct_expression(ExprKind::MethodParameters));

        let mut context = CallContext::Unqualified;
        for child in source.expressions() {
            match child.expr_kind() {
                Some(ExprKind::ClassName) => {
                    context = CallContext::Static(child.concat_upper(), child.span());
                }
                Some(ExprKind::FieldChain) => {
                    context = CallContext::Instance(self.resolve_field_chain(child, Access::Read)?);
                }
                Some(ExprKind::Dynamic) => {
                    self.resolve_parameters_loosely(child)?;
                    if let Some(params) = params {
                        self.resolve_parameters_loosely(params)?;
                    }
                    return Ok(());
                }
                Some(ExprKind::MethodName) => {
                    match self.find_callable(child, &context)? {
                        Callable::Method { owner, method } => {
                            self.reference(
                                ReferenceKind::MethodReference,
                                child.span(),
                                ReferenceTarget::Method {
                                    owner,
                                    name: method.name.clone(),
                                },
                            );
                            self.check_call(&method, params, child.span())?;
                        }
                        Callable::Builtin(_) | Callable::Void => {
                            if let Some(params) = params {
                                self.resolve_parameters_loosely(params)?;
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `CALL FUNCTION 'NAME' EXPORTING ...`
    pub(crate) fn resolve_call_function(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        if let Some(destination) = node.find_direct_expression(ExprKind::Source) {
            self.resolve_source(destination)?;
        }
        let params = node.find_direct_expression(ExprKind::FunctionParameters);
        let Some(function_name) = node.find_direct_expression(ExprKind::FunctionName) else {
            return Ok(());
        };
        let literal = function_name
            .first_token()
            .filter(|t| t.kind == TokenKind::StringLiteral);
        let Some(literal) = literal else {
            if let Some(field) = function_name.find_direct_expression(ExprKind::FieldChain) {
                self.resolve_field_chain(field, Access::Read)?;
            }
            if let Some(params) = params {
                self.resolve_parameters_loosely(params)?;
            }
            return Ok(());
        };

        let name = literal
            .text
            .trim_matches(|c| c == '\'' || c == '`')
            .to_ascii_uppercase();
        let span = function_name.span();
        let Some(function) = self.dictionary.lookup_function_module(&name) else {
            self.void_or(
                &name,
                span,
                SyntaxError::FunctionNotFound {
                    name: name.clone(),
                    span,
                },
            )?;
            if let Some(params) = params {
                self.resolve_parameters_loosely(params)?;
            }
            return Ok(());
        };

        self.reference(
            ReferenceKind::MethodReference,
            span,
            ReferenceTarget::Method {
                owner: String::new(),
                name: function.name.clone(),
            },
        );
        let signature = Signature {
            name: &function.name,
            parameters: &function.parameters,
        };
        let supplied = match params {
            Some(params) => self.check_sections(&signature, params, true)?,
            None => HashSet::new(),
        };
        if let Some(missing) = signature.first_missing(FUNCTION_REQUIRED, &supplied) {
            return Err(SyntaxError::ParameterMissing {
                name: missing.name.clone(),
                span,
            });
        }
        Ok(())
    }

    /// `CREATE OBJECT ref [TYPE cls] [EXPORTING ...]`
    pub(crate) fn resolve_create_object(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        let Some(target) = node.find_direct_expression(ExprKind::Target) else {
            return Ok(());
        };
        let explicit = node.find_direct_expression(ExprKind::ClassName);
        if let Some(class) = explicit {
            self.resolve_class_name(class)?;
        }
        let inferred = explicit.map(|c| AbapType::object_reference(c.concat_upper()));
        let ty = self.resolve_target(target, inferred.as_ref())?;

        let class = match (&ty, explicit) {
            (_, Some(class)) if ty.is_object_reference() || ty.is_permissive() => {
                Some(class.concat_upper())
            }
            (AbapType::ObjectReference(class), None) => Some(class.clone()),
            (other, _) if other.is_object_reference() || other.is_permissive() => None,
            _ => {
                return Err(SyntaxError::NotAnObjectReference {
                    name: target.concat_tokens(),
                    span: target.span(),
                })
            }
        };

        if let Some(dynamic) = node.find_direct_expression(ExprKind::Dynamic) {
            self.resolve_parameters_loosely(dynamic)?;
        }
        if let Some(exceptions) = node.find_direct_expression(ExprKind::ParameterListExceptions) {
            self.resolve_parameters_loosely(exceptions)?;
        }
        let exporting = node.find_direct_expression(ExprKind::ParameterListS);
        match class {
            Some(class) => self.check_constructor(&class, exporting, target.span()),
            None => match exporting {
                Some(list) => self.resolve_parameters_loosely(list),
                None => Ok(()),
            },
        }
    }

    /// 构造函数实参（`CREATE OBJECT` 的 `EXPORTING` 列表）
    pub(crate) fn check_constructor(
        &mut self,
        class: &str,
        exporting: Option<NodeRef<'a>>,
        span: Span,
    ) -> Result<()> {
        if let Some((_, constructor)) = self.find_method(class, "CONSTRUCTOR") {
            return self.check_call(&constructor, exporting, span);
        }
        let Some(list) = exporting else {
            return Ok(());
        };
        if self.is_known_class_or_interface(class) && !self.has_void_ancestor(class) {
            if let Some(first) = list
                .find_direct_expressions(ExprKind::ParameterS)
                .first()
                .and_then(|p| p.find_direct_expression(ExprKind::ParameterName))
            {
                return Err(SyntaxError::UnknownParameter {
                    method: "CONSTRUCTOR".to_string(),
                    name: first.concat_upper(),
                    span: first.span(),
                });
            }
        }
        self.resolve_parameters_loosely(list)
    }

    /// `NEW zcl_foo( ... )` 的实参
    pub(crate) fn check_constructor_call(
        &mut self,
        class: &str,
        param: NodeRef<'a>,
        span: Span,
    ) -> Result<()> {
        if let Some((_, constructor)) = self.find_method(class, "CONSTRUCTOR") {
            return self.check_call(&constructor, Some(param), span);
        }
        match param.expressions().next() {
            Some(list) if list.is(ExprKind::ParameterListS) => {
                self.check_constructor(class, Some(list), span)
            }
            Some(_) if self.is_known_class_or_interface(class) && !self.has_void_ancestor(class) => {
                Err(SyntaxError::NoImportingParameter {
                    method: "CONSTRUCTOR".to_string(),
                    span,
                })
            }
            _ => self.resolve_parameters_loosely(param),
        }
    }

    /// `PERFORM form [IN PROGRAM prog] [IF FOUND] USING ...`
    pub(crate) fn resolve_perform(
        &mut self,
        node: NodeRef<'a>,
    ) -> Result<()> {
        for source in node.find_direct_expressions(ExprKind::Source) {
            self.resolve_source(source)?;
        }
        if let Some(dynamic) = node.find_direct_expression(ExprKind::Dynamic) {
            return self.resolve_parameters_loosely(dynamic);
        }
        let Some(form) = node.find_direct_expression(ExprKind::FormName) else {
            return Ok(());
        };
        let name = form.concat_upper();
        let span = form.span();
        if let Some(definition) = self.forms.get(&name) {
            let target = ReferenceTarget::Form {
                name: definition.name.clone(),
                span: definition.span,
            };
            self.reference(ReferenceKind::FormReference, span, target);
            return Ok(());
        }
        if has_word(node, "PROGRAM") || has_word(node, "FOUND") {
            self.reference(ReferenceKind::Void, span, ReferenceTarget::Void(name));
            return Ok(());
        }
        Err(SyntaxError::FormNotFound { name, span })
    }
}
