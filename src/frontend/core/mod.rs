//! 核心算法层
//!
//! 词法 → 语句识别（基于组合子）→ 结构构建，以及无状态的类型系统。
//! 每一层的输出构建后不再修改。

pub mod combi;
pub mod lexer;
pub mod parser;
pub mod structure;
pub mod type_system;

pub use lexer::tokenize;
pub use parser::parse_statements;
pub use structure::build_structure;
