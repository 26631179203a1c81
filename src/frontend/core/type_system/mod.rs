//! 类型系统
//!
//! 纯值操作，无可变状态：
//! - [`AbapType`] 及其组成部分
//! - [`assignable`] 可赋值性检查
//! - `qualified_name()` 回写声明时使用的限定名

pub mod assign;
pub mod types;

#[cfg(test)]
mod tests;

pub use assign::assignable;
pub use types::{
    AbapType, Component, ElementaryKind, GenericKind, StructureType, TableAccess, TableKey,
    TableType,
};
