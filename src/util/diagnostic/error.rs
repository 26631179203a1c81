//! 诊断数据结构
//!
//! 提供统一的错误报告机制
//!
//! # 设计原则
//!
//! - 核心流水线从不因输入错误而失败，所有问题都表示为 `Diagnostic`
//! - `DiagnosticKind` 标记问题出现的阶段（与严重级别无关）
//! - 错误码集中定义在 `DiagnosticCode` 中

use serde::{Deserialize, Serialize};

use crate::util::span::Span;

/// 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// 获取严重级别对应的数字值
    pub fn as_u8(&self) -> u8 {
        match self {
            Severity::Error => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Hint => 1,
        }
    }

    /// 检查是否为错误级别
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// 诊断类别：问题在哪个阶段被发现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// 词法错误（未闭合字面量、版本不支持的词法特性）
    Lexical,
    /// 没有语句语法匹配
    Syntactic,
    /// 块结构不匹配
    Structural,
    /// 名称解析、类型、参数错误
    Semantic,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DiagnosticKind::Lexical => write!(f, "lexical"),
            DiagnosticKind::Syntactic => write!(f, "syntactic"),
            DiagnosticKind::Structural => write!(f, "structural"),
            DiagnosticKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// 错误码注册表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// L0001: unterminated literal
    UnterminatedLiteral,
    /// L0002: lexical feature not available in the target version
    VersionFeature,
    /// L0003: character that starts no token
    UnexpectedCharacter,
    /// P0001: no statement grammar matched
    ParserError,
    /// P0002: last statement lacks a terminating period
    MissingPeriod,
    /// B0001: block opened but never closed
    UnterminatedBlock,
    /// B0002: closing statement does not match the innermost open block
    MismatchedCloser,
    /// B0003: ELSE/WHEN/CATCH outside of its block
    MisplacedIntermediate,
    /// T0001: name not found
    NotFound,
    /// T0002: type not found
    TypeNotFound,
    /// T0003: incompatible types
    IncompatibleTypes,
    /// T0004: required parameter missing
    ParameterMissing,
    /// T0005: parameter does not exist
    UnknownParameter,
    /// T0006: method not found
    MethodNotFound,
    /// T0007: class or interface not found
    ClassNotFound,
    /// T0008: component not found
    ComponentNotFound,
    /// T0009: table expected
    NotATable,
    /// T0010: name already defined in scope
    AlreadyDefined,
    /// T0011: FORM not found
    FormNotFound,
    /// T0012: type cannot be inferred
    CannotInfer,
    /// T0013: statement used in the wrong context
    WrongContext,
}

impl DiagnosticCode {
    /// Stable textual code
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnterminatedLiteral => "L0001",
            DiagnosticCode::VersionFeature => "L0002",
            DiagnosticCode::UnexpectedCharacter => "L0003",
            DiagnosticCode::ParserError => "P0001",
            DiagnosticCode::MissingPeriod => "P0002",
            DiagnosticCode::UnterminatedBlock => "B0001",
            DiagnosticCode::MismatchedCloser => "B0002",
            DiagnosticCode::MisplacedIntermediate => "B0003",
            DiagnosticCode::NotFound => "T0001",
            DiagnosticCode::TypeNotFound => "T0002",
            DiagnosticCode::IncompatibleTypes => "T0003",
            DiagnosticCode::ParameterMissing => "T0004",
            DiagnosticCode::UnknownParameter => "T0005",
            DiagnosticCode::MethodNotFound => "T0006",
            DiagnosticCode::ClassNotFound => "T0007",
            DiagnosticCode::ComponentNotFound => "T0008",
            DiagnosticCode::NotATable => "T0009",
            DiagnosticCode::AlreadyDefined => "T0010",
            DiagnosticCode::FormNotFound => "T0011",
            DiagnosticCode::CannotInfer => "T0012",
            DiagnosticCode::WrongContext => "T0013",
        }
    }

    /// Pipeline stage that reports this code
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DiagnosticCode::UnterminatedLiteral
            | DiagnosticCode::VersionFeature
            | DiagnosticCode::UnexpectedCharacter => DiagnosticKind::Lexical,
            DiagnosticCode::ParserError | DiagnosticCode::MissingPeriod => {
                DiagnosticKind::Syntactic
            }
            DiagnosticCode::UnterminatedBlock
            | DiagnosticCode::MismatchedCloser
            | DiagnosticCode::MisplacedIntermediate => DiagnosticKind::Structural,
            _ => DiagnosticKind::Semantic,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 诊断信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 严重级别
    pub severity: Severity,
    /// 阶段标记
    pub kind: DiagnosticKind,
    /// 错误码
    pub code: DiagnosticCode,
    /// 完整消息
    pub message: String,
    /// 文件名
    pub file: String,
    /// 位置信息
    pub span: Span,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        file: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Error,
            kind: code.kind(),
            code,
            message: message.into(),
            file: file.into(),
            span,
        }
    }

    /// 创建警告诊断
    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        file: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, file, span)
        }
    }

    /// 是否为错误级别
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}[{}]: {}",
            self.file, self.span.start, self.severity, self.code, self.message
        )
    }
}
