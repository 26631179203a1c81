//! 前端：从源码到已解析的程序模型
//!
//! [`core`] 负责单文件的词法、语句识别与结构构建，[`syntax`] 负责作用域与
//! 类型解析，[`pipeline`] 把两者串成多文件分析。

pub mod config;
pub mod core;
pub mod pipeline;
pub mod syntax;
pub mod version;

pub use config::{AnalyzeConfig, DiagLevel};
pub use pipeline::{
    analyze, parse_file, AnalyzeError, Analysis, FileAnalysis, ParsedFile, Pipeline,
    PipelinePhase, SourceInput,
};
pub use version::Version;
