//! 语义错误
//!
//! 每个语句处理函数返回 `Result<_, SyntaxError>`，由语句驱动层转换为
//! `Semantic` 诊断后继续处理下一条语句。

use thiserror::Error;

use crate::util::diagnostic::{Diagnostic, DiagnosticCode};
use crate::util::span::Span;

/// 语义错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// 数据对象未找到
    #[error("\"{name}\" not found")]
    NotFound { name: String, span: Span },

    /// 类型未找到
    #[error("Type \"{name}\" not found")]
    TypeNotFound { name: String, span: Span },

    /// 类型不兼容
    #[error("Incompatible types, \"{from}\" cannot be assigned to \"{to}\"")]
    IncompatibleTypes { from: String, to: String, span: Span },

    /// 缺少必需参数
    #[error("Parameter \"{name}\" must be supplied")]
    ParameterMissing { name: String, span: Span },

    /// 参数不存在
    #[error("Method \"{method}\" does not have a parameter named \"{name}\"")]
    UnknownParameter {
        method: String,
        name: String,
        span: Span,
    },

    /// 按位置传参但方法没有 importing 参数
    #[error("Method \"{method}\" has no importing parameter")]
    NoImportingParameter { method: String, span: Span },

    /// 方法未找到
    #[error("Method \"{name}\" not found")]
    MethodNotFound { name: String, span: Span },

    /// 函数模块未找到
    #[error("Function module \"{name}\" not found")]
    FunctionNotFound { name: String, span: Span },

    /// 数据库表或视图未找到
    #[error("Database table or view \"{name}\" not found")]
    TableNotFound { name: String, span: Span },

    /// 类或接口未找到
    #[error("Class or interface \"{name}\" not found")]
    ClassNotFound { name: String, span: Span },

    /// 组件未找到
    #[error("Component \"{name}\" not found")]
    ComponentNotFound { name: String, span: Span },

    /// 期望内表
    #[error("\"{name}\" is not an internal table")]
    NotATable { name: String, span: Span },

    /// 同一作用域中重复定义
    #[error("\"{name}\" is already defined")]
    AlreadyDefined { name: String, span: Span },

    /// FORM 未找到
    #[error("FORM \"{name}\" not found")]
    FormNotFound { name: String, span: Span },

    /// `#` 无法推断类型
    #[error("Type cannot be inferred for \"{construct}\"")]
    CannotInfer { construct: String, span: Span },

    /// 期望对象引用
    #[error("\"{name}\" is not an object reference")]
    NotAnObjectReference { name: String, span: Span },

    /// 常量不可修改
    #[error("\"{name}\" is a constant and cannot be changed")]
    ConstantChanged { name: String, span: Span },

    /// 语句出现在错误的上下文
    #[error("{message}")]
    WrongContext { message: String, span: Span },
}

impl SyntaxError {
    /// 获取错误的位置
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::NotFound { span, .. }
            | SyntaxError::TypeNotFound { span, .. }
            | SyntaxError::IncompatibleTypes { span, .. }
            | SyntaxError::ParameterMissing { span, .. }
            | SyntaxError::UnknownParameter { span, .. }
            | SyntaxError::NoImportingParameter { span, .. }
            | SyntaxError::MethodNotFound { span, .. }
            | SyntaxError::FunctionNotFound { span, .. }
            | SyntaxError::TableNotFound { span, .. }
            | SyntaxError::ClassNotFound { span, .. }
            | SyntaxError::ComponentNotFound { span, .. }
            | SyntaxError::NotATable { span, .. }
            | SyntaxError::AlreadyDefined { span, .. }
            | SyntaxError::FormNotFound { span, .. }
            | SyntaxError::CannotInfer { span, .. }
            | SyntaxError::NotAnObjectReference { span, .. }
            | SyntaxError::ConstantChanged { span, .. }
            | SyntaxError::WrongContext { span, .. } => *span,
        }
    }

    /// 对应的诊断码
    pub fn code(&self) -> DiagnosticCode {
        match self {
            SyntaxError::NotFound { .. } => DiagnosticCode::NotFound,
            SyntaxError::TypeNotFound { .. } => DiagnosticCode::TypeNotFound,
            SyntaxError::IncompatibleTypes { .. } => DiagnosticCode::IncompatibleTypes,
            SyntaxError::ParameterMissing { .. } => DiagnosticCode::ParameterMissing,
            SyntaxError::UnknownParameter { .. } | SyntaxError::NoImportingParameter { .. } => {
                DiagnosticCode::UnknownParameter
            }
            SyntaxError::MethodNotFound { .. } | SyntaxError::FunctionNotFound { .. } => {
                DiagnosticCode::MethodNotFound
            }
            SyntaxError::TableNotFound { .. } => DiagnosticCode::TypeNotFound,
            SyntaxError::ClassNotFound { .. } => DiagnosticCode::ClassNotFound,
            SyntaxError::ComponentNotFound { .. } => DiagnosticCode::ComponentNotFound,
            SyntaxError::NotATable { .. } => DiagnosticCode::NotATable,
            SyntaxError::AlreadyDefined { .. } => DiagnosticCode::AlreadyDefined,
            SyntaxError::FormNotFound { .. } => DiagnosticCode::FormNotFound,
            SyntaxError::CannotInfer { .. } => DiagnosticCode::CannotInfer,
            SyntaxError::NotAnObjectReference { .. }
            | SyntaxError::ConstantChanged { .. }
            | SyntaxError::WrongContext { .. } => DiagnosticCode::WrongContext,
        }
    }

    /// 转换为诊断
    pub fn to_diagnostic(
        &self,
        file: &str,
    ) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string(), file, self.span())
    }
}

/// 语句处理结果
pub type Result<T> = std::result::Result<T, SyntaxError>;
