//! Statement grammars
//!
//! Grammars are registered in priority order: keyword statements first, the
//! generic assignment and method call statements last. When two grammars
//! accept the same statement, the earlier registration wins.

pub mod control_flow;
pub mod declarations;
pub mod oo;
pub mod operations;

use crate::frontend::core::combi::Combinator;
use crate::frontend::core::parser::kinds::StatementKind;

/// Every statement grammar, in priority order
pub fn all() -> Vec<(StatementKind, Combinator)> {
    let mut list = Vec::new();
    list.extend(declarations::statements());
    list.extend(oo::statements());
    list.extend(control_flow::statements());
    list.extend(operations::statements());
    list
}
