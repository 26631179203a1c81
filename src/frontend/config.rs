//! 分析配置
//!
//! 管理分析选项：目标版本、错误命名空间、全局常量、并行度和诊断级别

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::frontend::version::Version;
use crate::util::diagnostic::{Diagnostic, Severity};

/// Default pattern for names that must resolve inside the analysed code base
pub const DEFAULT_ERROR_NAMESPACE: &str = "^(Z|Y|LCL_|TY_|LIF_)";

static DEFAULT_NAMESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", DEFAULT_ERROR_NAMESPACE)).expect("default namespace is valid")
});

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagLevel {
    /// 不显示诊断
    None,
    /// 只显示错误
    Errors,
    /// 显示错误和警告
    Warnings,
    /// 显示所有诊断信息
    #[default]
    All,
}

impl DiagLevel {
    /// 该级别下是否保留诊断
    pub fn admits(
        &self,
        diagnostic: &Diagnostic,
    ) -> bool {
        match self {
            DiagLevel::None => false,
            DiagLevel::Errors => diagnostic.severity == Severity::Error,
            DiagLevel::Warnings => diagnostic.severity >= Severity::Warning,
            DiagLevel::All => true,
        }
    }
}

impl std::fmt::Display for DiagLevel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DiagLevel::None => write!(f, "none"),
            DiagLevel::Errors => write!(f, "errors"),
            DiagLevel::Warnings => write!(f, "warnings"),
            DiagLevel::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for DiagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(DiagLevel::None),
            "errors" => Ok(DiagLevel::Errors),
            "warnings" => Ok(DiagLevel::Warnings),
            "all" => Ok(DiagLevel::All),
            other => Err(format!("unknown diagnostic level: {}", other)),
        }
    }
}

fn default_error_namespace() -> String {
    DEFAULT_ERROR_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

/// 分析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    /// 目标语言版本（文件可单独覆盖）
    #[serde(default)]
    pub version: Version,

    /// 必须能解析到的名称模式；匹配但找不到的名称报告错误，其余视为 void
    #[serde(default = "default_error_namespace")]
    pub error_namespace: String,

    /// 已知存在的全局常量（类型为 void）
    #[serde(default)]
    pub global_constants: Vec<String>,

    /// 是否跨文件并行
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// 诊断级别
    #[serde(default)]
    pub diagnostic_level: DiagLevel,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            version: Version::default(),
            error_namespace: default_error_namespace(),
            global_constants: Vec::new(),
            parallel: true,
            diagnostic_level: DiagLevel::default(),
        }
    }
}

impl AnalyzeConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置目标版本
    pub fn with_version(
        mut self,
        version: Version,
    ) -> Self {
        self.version = version;
        self
    }

    /// 设置错误命名空间
    pub fn with_error_namespace(
        mut self,
        pattern: impl Into<String>,
    ) -> Self {
        self.error_namespace = pattern.into();
        self
    }

    /// 添加全局常量
    pub fn with_global_constant(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.global_constants.push(name.into());
        self
    }

    /// 设置是否并行
    pub fn with_parallel(
        mut self,
        parallel: bool,
    ) -> Self {
        self.parallel = parallel;
        self
    }

    /// 设置诊断级别
    pub fn with_diagnostic_level(
        mut self,
        level: DiagLevel,
    ) -> Self {
        self.diagnostic_level = level;
        self
    }

    /// 编译错误命名空间；非法的模式退回默认值
    pub fn error_namespace_regex(&self) -> Regex {
        let pattern = format!("(?i){}", self.error_namespace);
        match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(
                    "invalid error namespace {:?}: {}, using default",
                    self.error_namespace,
                    e
                );
                DEFAULT_NAMESPACE_REGEX.clone()
            }
        }
    }
}
