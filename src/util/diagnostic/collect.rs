//! 诊断收集器
//!
//! 各阶段把发现的问题追加到收集器中，而不是中断分析

use super::error::{Diagnostic, DiagnosticCode, DiagnosticKind};
use crate::util::span::Span;

/// 单个文件的诊断收集器
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// 创建属于某个文件的收集器
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
        }
    }

    /// 文件名
    pub fn file(&self) -> &str {
        &self.file
    }

    /// 追加错误
    pub fn error(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) {
        let diagnostic = Diagnostic::error(code, message, self.file.clone(), span);
        self.push(diagnostic);
    }

    /// 追加警告
    pub fn warning(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) {
        let diagnostic = Diagnostic::warning(code, message, self.file.clone(), span);
        self.push(diagnostic);
    }

    /// 追加已构造的诊断
    pub fn push(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        tracing::trace!("diagnostic {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(
        &mut self,
        diagnostics: impl IntoIterator<Item = Diagnostic>,
    ) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// 按类别计数
    pub fn count_kind(
        &self,
        kind: DiagnosticKind,
    ) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
