//! 统一诊断系统
//!
//! 提供错误处理、诊断渲染和源码位置跟踪
//!
//! # 模块结构
//!
//! - [`error`] - 诊断数据结构 (Diagnostic, Severity, DiagnosticKind)
//! - [`collect`] - 诊断收集器
//! - [`emitter`] - JSON 输出
//! - [`check`] - `abaplens check` 命令实现
//!
//! # 示例
//!
//! ```ignore
//! use abaplens::util::diagnostic::DiagnosticRenderer;
//!
//! let renderer = DiagnosticRenderer::new();
//! let output = renderer.render(&diagnostic, Some(&source_file));
//! println!("{}", output);
//! ```

pub mod check;
pub mod collect;
pub mod emitter;
pub mod error;

// 重新导出
pub use collect::DiagnosticCollector;
pub use emitter::JsonEmitter;
pub use error::{Diagnostic, DiagnosticCode, DiagnosticKind, Severity};

use owo_colors::OwoColorize;

use crate::util::span::SourceFile;

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否显示源码片段
    pub show_source: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_source: true,
        }
    }
}

/// 诊断渲染器
#[derive(Debug, Clone, Default)]
pub struct DiagnosticRenderer {
    /// 渲染配置
    config: EmitterConfig,
}

impl DiagnosticRenderer {
    /// 创建新的渲染器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义配置创建渲染器
    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// 渲染单个诊断信息
    pub fn render(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> String {
        let mut output = self.render_header(diagnostic);

        if !diagnostic.span.is_dummy() {
            output.push_str(&format!(
                " --> {}:{}:{}\n",
                diagnostic.file, diagnostic.span.start.line, diagnostic.span.start.column
            ));
            if self.config.show_source {
                if let Some(snippet) = self.render_source_snippet(diagnostic, source_file) {
                    output.push_str(&snippet);
                }
            }
        }

        output
    }

    /// 渲染多个诊断信息
    pub fn render_all<'a>(
        &self,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
        source_file: Option<&SourceFile>,
    ) -> String {
        let mut output = String::new();
        for diagnostic in diagnostics {
            output.push_str(&self.render(diagnostic, source_file));
            output.push('\n');
        }
        output
    }

    /// 渲染错误头部
    fn render_header(
        &self,
        diagnostic: &Diagnostic,
    ) -> String {
        let severity = diagnostic.severity.to_string();
        let code = format!("[{}]", diagnostic.code);
        if !self.config.use_colors {
            return format!("{}{}: {}\n", severity, code, diagnostic.message);
        }

        let severity = match diagnostic.severity {
            Severity::Error => severity.red().bold().to_string(),
            Severity::Warning => severity.yellow().bold().to_string(),
            Severity::Info => severity.blue().to_string(),
            Severity::Hint => severity.cyan().to_string(),
        };
        format!("{}{}: {}\n", severity, code.bold(), diagnostic.message)
    }

    /// 渲染源码片段（只渲染起始行）
    fn render_source_snippet(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> Option<String> {
        let span = diagnostic.span;
        let line = source_file?.line(span.start.line)?;

        let mut output = format!("{:>4} | {}\n", span.start.line, line);
        let spaces = " ".repeat(span.start.column.saturating_sub(1));
        let width = if span.start.line == span.end.line {
            span.end.column.saturating_sub(span.start.column).max(1)
        } else {
            line.chars()
                .count()
                .saturating_sub(span.start.column - 1)
                .max(1)
        };
        let carets = "^".repeat(width);
        let carets = if self.config.use_colors {
            carets.red().to_string()
        } else {
            carets
        };
        output.push_str(&format!("     | {}{}\n", spaces, carets));
        Some(output)
    }
}
