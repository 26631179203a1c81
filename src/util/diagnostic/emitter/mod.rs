//! 诊断输出模块

pub mod json;

pub use json::JsonEmitter;
