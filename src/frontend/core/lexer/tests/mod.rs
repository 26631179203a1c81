//! Lexer tests module
//!
//! - basic: 基础测试（标识符、空白符、位置）
//! - literals: 字面量与字符串模板
//! - operators: 运算符与空白标记
//! - comments: 注释与 pragma
//! - errors: 错误恢复与版本特性


use crate::frontend::core::lexer::{tokenize, Token, TokenKind};
use crate::frontend::version::Version;

pub(crate) fn lex(source: &str) -> Vec<Token> {
    tokenize("test.abap", source, Version::V757).tokens
}

pub(crate) fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

pub(crate) fn texts(source: &str) -> Vec<String> {
    lex(source).into_iter().map(|t| t.text).collect()
}
