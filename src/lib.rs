//! abaplens
//!
//! ABAP 静态分析的解析与解析核心：把源码文本变成带类型、已解析的程序模型，
//! 供 lint 规则、自动重构与编辑器服务查询。
//!
//! # Example
//!
//! ```no_run
//! use abaplens::frontend::{analyze, AnalyzeConfig, SourceInput};
//! use abaplens::frontend::syntax::EmptyDictionary;
//!
//! let inputs = vec![SourceInput::new(
//!     "zdemo.prog.abap",
//!     "REPORT zdemo.\nDATA lv_count TYPE i.\nlv_count = 1.\n",
//! )];
//! let analysis = analyze(inputs, &AnalyzeConfig::default(), &EmptyDictionary);
//! assert_eq!(analysis.error_count(), 0);
//! ```

#![doc(html_root_url = "https://docs.rs/abaplens")]
#![warn(rust_2018_idioms)]

pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use frontend::{analyze, parse_file, Analysis, AnalyzeConfig, SourceInput, Version};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "abaplens";
