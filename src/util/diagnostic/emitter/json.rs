//! JSON 诊断渲染器
//!
//! 输出 Language Server Protocol (LSP) 形状的 JSON，附带字节偏移
//! 以便重写工具直接计算替换范围

use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;

use crate::util::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::util::span::Span;

/// LSP 位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspPosition {
    pub line: u32,
    pub character: u32,
}

/// LSP 位置范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspRange {
    pub start: LspPosition,
    pub end: LspPosition,
}

/// LSP 诊断结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    /// 诊断范围（0-indexed）
    pub range: LspRange,
    /// 严重级别：1 error, 2 warning, 3 information, 4 hint
    pub severity: u8,
    /// 错误代码
    pub code: String,
    /// 错误代码来源
    pub source: String,
    /// 诊断消息
    pub message: String,
    /// 阶段标记
    pub kind: DiagnosticKind,
    /// 文件名
    pub file: String,
    /// 起始字节偏移
    pub offset: usize,
    /// 字节长度
    pub length: usize,
}

/// JSON 诊断渲染器
#[derive(Debug, Clone)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// 渲染诊断为 JSON 字符串
    pub fn render(diagnostic: &Diagnostic) -> String {
        let lsp_diagnostic = Self::to_lsp_diagnostic(diagnostic);
        to_string_pretty(&lsp_diagnostic).unwrap_or_else(|_| "{}".to_string())
    }

    /// 渲染多个诊断
    pub fn render_all(diagnostics: &[Diagnostic]) -> String {
        let lsp_diagnostics: Vec<LspDiagnostic> =
            diagnostics.iter().map(Self::to_lsp_diagnostic).collect();
        to_string_pretty(&lsp_diagnostics).unwrap_or_else(|_| "[]".to_string())
    }

    /// 转换为 LSP 诊断结构
    pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> LspDiagnostic {
        LspDiagnostic {
            range: Self::span_to_range(&diagnostic.span),
            severity: match diagnostic.severity {
                Severity::Error => 1,
                Severity::Warning => 2,
                Severity::Info => 3,
                Severity::Hint => 4,
            },
            code: diagnostic.code.as_str().to_string(),
            source: "abaplens".to_string(),
            message: diagnostic.message.clone(),
            kind: diagnostic.kind,
            file: diagnostic.file.clone(),
            offset: diagnostic.span.start.offset,
            length: diagnostic.span.len(),
        }
    }

    /// 转换 Span 到 LSP Range
    fn span_to_range(span: &Span) -> LspRange {
        if span.is_dummy() {
            let zero = LspPosition {
                line: 0,
                character: 0,
            };
            return LspRange {
                start: zero,
                end: zero,
            };
        }
        LspRange {
            start: LspPosition {
                line: span.start.line.saturating_sub(1) as u32,
                character: span.start.column.saturating_sub(1) as u32,
            },
            end: LspPosition {
                line: span.end.line.saturating_sub(1) as u32,
                character: span.end.column.saturating_sub(1) as u32,
            },
        }
    }
}
